//! Line-based terminal dialogs for the password and update prompts.

use std::io::{IsTerminal, Write};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Mutex;
use veil_core::gate::{UpdateChecker, UpdateChoice, UpdateNotice, UpdatePrompt};
use veil_core::mutation::{EntryMode, PasswordForm, PasswordInput, PasswordPrompt};
use veil_core::service::Secret;

/// A question asked by the password dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CurrentPassword,
    NewPassword,
    Hint,
    RecoveryEmail,
}

impl Field {
    const fn label(self) -> &'static str {
        match self {
            Self::CurrentPassword => "Current password",
            Self::NewPassword => "New password",
            Self::Hint => "Hint (optional)",
            Self::RecoveryEmail => "Recovery email (optional)",
        }
    }
}

/// Questions for `form`, in the order they are asked.
pub fn fields_for(form: &PasswordForm) -> Vec<Field> {
    let mut fields = Vec::with_capacity(4);
    if form.request.is_some() {
        fields.push(Field::CurrentPassword);
    }
    if form.mode != EntryMode::Remove {
        fields.push(Field::NewPassword);
        fields.push(Field::Hint);
        if !form.has_recovery {
            fields.push(Field::RecoveryEmail);
        }
    }
    fields
}

pub const ECHO_WARNING: &str =
    "Warning: input is echoed. Pipe passwords through stdin to keep them off the screen.";

/// Warning shown before a dialog that asks for a password on a terminal.
pub fn echo_warning(fields: &[Field], interactive: bool) -> Option<&'static str> {
    let asks_password = fields
        .iter()
        .any(|field| matches!(field, Field::CurrentPassword | Field::NewPassword));
    (interactive && asks_password).then_some(ECHO_WARNING)
}

/// Reads answers line by line from `R` (stdin in the binary).
///
/// Answers are not masked.
pub struct TerminalPrompt<R> {
    input: Mutex<R>,
    interactive: bool,
}

impl<R> TerminalPrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
            interactive: false,
        }
    }

    /// Prompt over process stdin; warns about echo when stdin is a terminal.
    pub fn interactive(input: R) -> Self {
        Self {
            input: Mutex::new(input),
            interactive: std::io::stdin().is_terminal(),
        }
    }

    /// `None` on end of input.
    async fn ask(&self, question: &str) -> Option<String> {
        print!("{question}: ");
        std::io::stdout().flush().ok();
        let mut line = String::new();
        let read = self.input.lock().await.read_line(&mut line).await.ok()?;
        if read == 0 {
            return None;
        }
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[async_trait]
impl<R> PasswordPrompt for TerminalPrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn request_input(&self, form: &PasswordForm) -> Option<PasswordInput> {
        if !form.hint.is_empty() {
            println!("Hint: {}", form.hint);
        }
        let fields = fields_for(form);
        if let Some(warning) = echo_warning(&fields, self.interactive) {
            eprintln!("{warning}");
        }
        let mut input = PasswordInput::default();
        for field in fields {
            let answer = self.ask(field.label()).await?;
            match field {
                Field::CurrentPassword => input.current_password = Secret::new(answer),
                Field::NewPassword => {
                    if answer.is_empty() {
                        return None;
                    }
                    input.new_password = Secret::new(answer);
                }
                Field::Hint => input.hint = answer.trim().to_string(),
                Field::RecoveryEmail => {
                    input.recovery_email = Some(answer.trim().to_string())
                        .filter(|email| !email.is_empty());
                }
            }
        }
        Some(input)
    }

    fn show_failure(&self, _form: &PasswordForm, reason: &str) {
        eprintln!("Rejected: {reason}");
    }
}

#[async_trait]
impl<R> UpdatePrompt for TerminalPrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn offer_update(&self, notice: &UpdateNotice) -> UpdateChoice {
        println!("{}", notice.message);
        match self.ask(&format!("{} now? [y/N]", notice.action)).await {
            Some(answer) if matches!(answer.trim(), "y" | "Y" | "yes") => UpdateChoice::Update,
            _ => UpdateChoice::Dismiss,
        }
    }

    fn close(&self) {}
}

/// The CLI cannot restart itself; it points at the upgrade command instead.
pub struct ReleaseNotice;

impl UpdateChecker for ReleaseNotice {
    fn trigger_update_and_restart(&self) {
        tracing::info!("Update requested");
        println!(
            "Install the latest release with `cargo install veil-cli` and run the command again."
        );
    }
}
