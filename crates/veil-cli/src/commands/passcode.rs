use veil_core::passcode::LocalPasscodeStore;
use veil_core::views::passcode_label;

use crate::cli::PasscodeCommands;
use crate::commands::common::Session;
use crate::error::CliError;

pub fn auto_lock_seconds(minutes: u32) -> Result<u32, CliError> {
    match minutes.checked_mul(60) {
        Some(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(CliError::InvalidAutoLock),
    }
}

pub fn run_passcode(session: &Session, command: &PasscodeCommands) -> Result<(), CliError> {
    let store = &session.passcode;
    match command {
        PasscodeCommands::Enable => store.enable()?,
        PasscodeCommands::Disable => store.disable()?,
        PasscodeCommands::AutoLock { minutes } => {
            store.set_auto_lock(auto_lock_seconds(*minutes)?)?;
        }
    }

    let state = store.state();
    let labels = &session.context.config().labels;
    if state.enabled {
        println!(
            "Local passcode on, auto-lock after {}",
            passcode_label(labels, state.auto_lock_seconds)
        );
    } else {
        println!("Local passcode off");
    }
    Ok(())
}
