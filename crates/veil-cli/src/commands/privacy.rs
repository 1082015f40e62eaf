use crate::commands::common::{format_privacy_lines, privacy_items, Session};
use crate::commands::status::load_views;
use crate::error::CliError;

pub async fn run_privacy(session: &Session, as_json: bool) -> Result<(), CliError> {
    let views = load_views(session).await?;
    let items = privacy_items(&views);
    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        let loading = &session.context.config().labels.loading;
        for line in format_privacy_lines(&items, loading) {
            println!("{line}");
        }
    }
    Ok(())
}
