use std::sync::Arc;

use tokio::io::{AsyncBufRead, BufReader};
use veil_core::gate::CapabilityGate;
use veil_core::mutation::{FlowOutcome, MutationCoordinator};
use veil_core::service::MutationOutcome;

use crate::cli::PasswordCommands;
use crate::commands::common::Session;
use crate::error::CliError;
use crate::prompts::{ReleaseNotice, TerminalPrompt};

pub fn outcome_message(outcome: FlowOutcome) -> &'static str {
    match outcome {
        FlowOutcome::Completed(MutationOutcome::Success) => "Cloud password updated.",
        FlowOutcome::Completed(MutationOutcome::ReloadNeeded) => {
            "Saved. Check your recovery email to confirm the new password."
        }
        FlowOutcome::ClearedUnconfirmed => "Unconfirmed cloud password discarded.",
        FlowOutcome::Cancelled => "Cancelled.",
        FlowOutcome::Blocked => "This version cannot change the cloud password.",
        FlowOutcome::Attached => "A password dialog is already open.",
        FlowOutcome::Superseded => "Password state changed, nothing was submitted.",
    }
}

pub async fn run_password(session: &Session, command: &PasswordCommands) -> Result<(), CliError> {
    let prompt = Arc::new(TerminalPrompt::interactive(BufReader::new(
        tokio::io::stdin(),
    )));
    let outcome = run_password_flow(session, command, prompt).await?;
    println!("{}", outcome_message(outcome));
    Ok(())
}

/// Run one password flow and wait for the reload it triggered.
pub async fn run_password_flow<R>(
    session: &Session,
    command: &PasswordCommands,
    prompt: Arc<TerminalPrompt<R>>,
) -> Result<FlowOutcome, CliError>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let gate = CapabilityGate::new(
        session.context.clone(),
        Arc::new(ReleaseNotice),
        prompt.clone(),
    );
    let coordinator = MutationCoordinator::new(session.context.clone(), gate, prompt);

    let outcome = match command {
        PasswordCommands::Edit => coordinator.edit_password().await?,
        PasswordCommands::Remove => coordinator.remove_password().await?,
    };

    if let FlowOutcome::Completed(_) = outcome {
        let state = session.context.password_store().settled().await?;
        tracing::debug!(status = ?state.status(), "Password state after mutation");
    }
    Ok(outcome)
}
