use super::test_helpers::*;
use super::*;
use crate::config::ScreenVariant;
use crate::error::DownloadError;
use crate::render::DownloadControl;
use crate::types::{PermissionStatus, StateKind, UserSummary};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
