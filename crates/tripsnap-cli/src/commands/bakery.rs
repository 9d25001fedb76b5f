use super::print_json;
use anyhow::Result;
use tripsnap_application::{AppContext, OpenOptions};

pub async fn show(context: &AppContext, id: i64, comments: bool, refresh: bool) -> Result<()> {
    let options = OpenOptions {
        load_comments: comments,
        force_refresh: refresh,
    };
    context.bakery.open_modal_by_id(id, options).await?;
    let modal = context.bakery.modal().await;
    if let Some(bakery) = &modal.bakery {
        tracing::info!(
            "[Cli] {} at {}",
            bakery.name.as_deref().unwrap_or("(unnamed)"),
            bakery.display_address().unwrap_or("(no address)")
        );
    }
    print_json(&modal)
}
