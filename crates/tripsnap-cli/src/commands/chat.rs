use super::print_json;
use anyhow::Result;
use tripsnap_application::AppContext;
use tripsnap_core::model::ChatFilters;

/// Starts a conversation and sends one message. The transcript is printed
/// even when the message failed (it then ends with the apology turn).
pub async fn run(context: &AppContext, filters: ChatFilters, message: &str) -> Result<()> {
    context.chat.start_conversation(filters).await?;
    let sent = context.chat.send_message(message).await;
    print_json(&context.chat.snapshot().await)?;
    sent?;
    Ok(())
}
