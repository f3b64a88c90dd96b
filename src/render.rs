//! List renderer: a pure function from view state to a host-agnostic view tree.

use crate::config::ScreenVariant;
use crate::types::{UserId, UserSummary, ViewState};
use std::collections::HashSet;
use std::fmt;

/// Label of the per-row download control
pub const DOWNLOAD_LABEL: &str = "Download Avatar";

/// Rendered screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    /// Activity indicator only
    Spinner,
    /// Error text replacing the whole screen
    Error {
        /// Text shown, already prefixed with `Error: `
        text: String,
    },
    /// Header plus rows
    List {
        /// Header title
        title: String,
        /// One row per user, in upstream order
        rows: Vec<Row>,
    },
}

impl View {
    /// Rows of a list view, empty for spinner/error
    pub fn rows(&self) -> &[Row] {
        match self {
            View::List { rows, .. } => rows,
            View::Spinner | View::Error { .. } => &[],
        }
    }
}

/// One list row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    /// Stable row key (the user's id)
    pub key: UserId,
    /// Login text
    pub login: String,
    /// Image source, loaded lazily by the host
    pub avatar_url: String,
    /// Download control; `None` in the browse-only variant
    pub control: Option<DownloadControl>,
}

/// State of a row's download control
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadControl {
    /// Ready to start a download
    Idle,
    /// A download for this row is running; presses are ignored
    InFlight,
}

/// Render `state`
///
/// `in_flight` holds rows with a running download task; it only affects the
/// control state, never row order or keys.
pub fn render(
    state: &ViewState,
    variant: ScreenVariant,
    in_flight: &HashSet<UserId>,
    title: &str,
) -> View {
    match state {
        ViewState::Loading => View::Spinner,
        ViewState::Failed { message } => View::Error {
            text: format!("Error: {}", message),
        },
        ViewState::Populated(users) => View::List {
            title: title.to_string(),
            rows: users
                .iter()
                .map(|user| render_row(user, variant, in_flight))
                .collect(),
        },
    }
}

fn render_row(user: &UserSummary, variant: ScreenVariant, in_flight: &HashSet<UserId>) -> Row {
    let control = variant.downloads_enabled().then(|| {
        if in_flight.contains(&user.id) {
            DownloadControl::InFlight
        } else {
            DownloadControl::Idle
        }
    });

    Row {
        key: user.id,
        login: user.login.clone(),
        avatar_url: user.avatar_url.clone(),
        control,
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Spinner => writeln!(f, "Loading..."),
            View::Error { text } => writeln!(f, "{}", text),
            View::List { title, rows } => {
                writeln!(f, "== {} ==", title)?;
                if rows.is_empty() {
                    writeln!(f, "(no users)")?;
                }
                for (index, row) in rows.iter().enumerate() {
                    write!(f, "{:>3}. {:<24} {}", index + 1, row.login, row.avatar_url)?;
                    match row.control {
                        Some(DownloadControl::Idle) => write!(f, "  [{}]", DOWNLOAD_LABEL)?,
                        Some(DownloadControl::InFlight) => write!(f, "  [downloading...]")?,
                        None => {}
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}
