use veil_core::passcode::LocalPasscodeStore;
use veil_core::views::{DerivedViewBuilder, ScreenViews};

use crate::commands::common::{format_screen_lines, snapshot, Session};
use crate::error::CliError;

/// Fetch everything the screen shows and build its views once.
pub async fn load_views(session: &Session) -> Result<ScreenViews, CliError> {
    let context = &session.context;
    let config = context.config();
    let views = ScreenViews::new(
        DerivedViewBuilder::from_config(config),
        &config.privacy_keys,
        &session.passcode.state(),
    );

    let password = context.password_store().refresh().await?;
    views.apply_password_state(Some(&password));
    for key in &config.privacy_keys {
        match context.privacy_store(*key).refresh().await {
            Ok(rule) => views.apply_privacy_rule(*key, &rule),
            Err(error) => tracing::warn!(%key, "Privacy rule unavailable: {error}"),
        }
    }
    Ok(views)
}

pub async fn run_status(session: &Session, as_json: bool) -> Result<(), CliError> {
    let views = load_views(session).await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&snapshot(&views))?);
    } else {
        for line in format_screen_lines(&views) {
            println!("{line}");
        }
    }
    Ok(())
}
