//! Terminal host for the user browser screen.
//!
//! Usage: `gh-avatar-browser [config.json]`
//!
//! Environment: `GITHUB_TOKEN`, `GITHUB_API_URL`, `AVATAR_DIR` (a `.env` file is
//! honoured), `RUST_LOG` for log filtering.

use gh_avatar_browser::{Config, Event, UserBrowserScreen, run_until_signal};
use std::io::BufRead;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

const HELP: &str = "commands: d <row> = download avatar, r = refresh, v = show list, q = quit";

/// How long the event printer may keep draining after unmount
const PRINTER_GRACE: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?.with_env_overrides();
    let screen = UserBrowserScreen::new(config)?;

    let events = screen.subscribe();
    let printer = tokio::spawn(print_events(screen.clone(), events));

    screen.mount().await?;
    println!("{}", HELP);

    let mut lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
    tokio::select! {
        result = run_until_signal(screen.clone()) => result?,
        () = command_loop(&screen, &mut lines) => screen.unmount().await?,
    }

    stop_printer(printer, PRINTER_GRACE).await;
    Ok(())
}

fn load_config() -> gh_avatar_browser::Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

/// Forward lines from `reader` on a dedicated OS thread
///
/// The thread is never joined: a read blocked on an idle terminal must not
/// keep the runtime alive once the screen has unmounted.
fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    let spawned = std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read command input");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        tracing::error!(error = %e, "Could not start input thread, commands disabled");
    }
    rx
}

async fn print_events(screen: UserBrowserScreen, mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(Event::Unmounted) => break,
            Ok(Event::StateChanged { .. }) => print!("{}", screen.view().await),
            Ok(Event::DownloadStarted { login, .. }) => {
                println!("Downloading avatar for {}...", login)
            }
            Ok(event) => {
                if let Some(notice) = event.notice() {
                    println!("{}", notice);
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                if screen.is_unmounted() {
                    break;
                }
                tracing::warn!(skipped, "Event printer lagged, re-rendering");
                print!("{}", screen.view().await);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Give the printer `grace` to finish, then abort it
async fn stop_printer(mut printer: JoinHandle<()>, grace: Duration) {
    if tokio::time::timeout(grace, &mut printer).await.is_err() {
        tracing::debug!("Event printer still running after unmount, aborting");
        printer.abort();
    }
}

async fn command_loop(screen: &UserBrowserScreen, lines: &mut mpsc::Receiver<String>) {
    while let Some(line) = lines.recv().await {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("q" | "quit"), _) => break,
            (Some("r" | "refresh"), _) => {
                if let Err(e) = screen.refresh().await {
                    println!("cannot refresh: {}", e);
                }
            }
            (Some("v" | "view"), _) | (None, _) => print!("{}", screen.view().await),
            (Some("d" | "download"), Some(row)) => download_row(screen, row).await,
            _ => println!("{}", HELP),
        }
    }
}

async fn download_row(screen: &UserBrowserScreen, row: &str) {
    let Ok(index) = row.parse::<usize>() else {
        println!("not a row number: {}", row);
        return;
    };

    let id = {
        let state = screen.state().await;
        match index.checked_sub(1).and_then(|i| state.users().get(i)) {
            Some(user) => user.id,
            None => {
                println!("no row {}", index);
                return;
            }
        }
    };

    if let Err(e) = screen.download_avatar(id).await {
        println!("{}", e);
    }
}
