use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use veil_core::lifecycle::{AppLifecycle, AppState};
use veil_core::screen::PrivacySecurityScreen;
use veil_core::signal::Subscription;

use crate::commands::common::{format_screen_lines, Session};
use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchInput {
    App(AppState),
    Confirm,
    Print,
    Quit,
}

pub fn parse_watch_input(line: &str) -> Option<WatchInput> {
    match line.trim().to_ascii_lowercase().as_str() {
        "fg" | "foreground" => Some(WatchInput::App(AppState::Foregrounded)),
        "bg" | "background" => Some(WatchInput::App(AppState::Backgrounded)),
        "confirm" => Some(WatchInput::Confirm),
        "" | "print" | "p" => Some(WatchInput::Print),
        "q" | "quit" | "exit" => Some(WatchInput::Quit),
        _ => None,
    }
}

fn print_changes<T>(name: &'static str, mut updates: Subscription<T>) -> JoinHandle<()>
where
    T: std::fmt::Debug + Send + 'static,
{
    tokio::spawn(async move {
        // First value is the replay of the current one.
        updates.next().await;
        while let Some(value) = updates.next().await {
            println!("~ {name}: {value:?}");
        }
    })
}

pub async fn run_watch(session: &Session) -> Result<(), CliError> {
    let lifecycle = AppLifecycle::default();
    let screen = PrivacySecurityScreen::mount(
        &session.context,
        session.passcode.clone(),
        lifecycle.subscribe(),
    );
    let views = screen.views();

    let mut printers = vec![
        print_changes("cloud_password", views.cloud_password().subscribe()),
        print_changes("passcode", views.passcode().subscribe()),
        print_changes("separators", views.separators().subscribe()),
    ];
    for key in views.privacy_keys() {
        if let Some(row) = views.privacy_row(key) {
            printers.push(print_changes("privacy", row.subscribe()));
        }
    }

    let demo_commands = if session.backend.demo().is_some() {
        ", confirm"
    } else {
        ""
    };
    println!("Commands: fg, bg, print, quit{demo_commands}");
    let result = drive(session, &screen, &lifecycle, BufReader::new(tokio::io::stdin())).await;

    for printer in printers {
        printer.abort();
    }
    result
}

pub(crate) async fn drive<R>(
    session: &Session,
    screen: &PrivacySecurityScreen,
    lifecycle: &AppLifecycle,
    input: R,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_watch_input(&line) {
            Some(WatchInput::App(state)) => {
                tracing::debug!(?state, "App state from stdin");
                lifecycle.emit(state);
            }
            Some(WatchInput::Confirm) => match session.backend.demo() {
                Some(demo) if demo.confirm_recovery_email() => {
                    println!("Recovery email confirmed; send `fg` to pick it up.");
                }
                Some(_) => println!("Nothing to confirm."),
                None => println!("`confirm` is only available with --demo."),
            },
            Some(WatchInput::Print) => {
                for line in format_screen_lines(screen.views()) {
                    println!("{line}");
                }
            }
            Some(WatchInput::Quit) => break,
            None => eprintln!("Unknown command: {}", line.trim()),
        }
    }
    Ok(())
}
