use serde::Serialize;
use tracing::{error, info};

use crate::telegram::MessageSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Ok,
    Error,
}

/// Outcome of one delivery attempt, embedded in the HTTP response body.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    #[serde(rename = "chatId")]
    pub chat_id: String,
    pub status: SendStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Deliver `text` to every chat in configured order, one attempt each.
///
/// A failed chat is recorded and skipped over; it never aborts delivery to
/// the remaining chats.
pub async fn broadcast(
    sender: &dyn MessageSender,
    chat_ids: &[String],
    text: &str,
) -> Vec<SendOutcome> {
    let mut outcomes = Vec::with_capacity(chat_ids.len());

    for chat_id in chat_ids {
        match sender.send(chat_id, text).await {
            Ok(()) => {
                info!("Sent to chat {}", chat_id);
                outcomes.push(SendOutcome {
                    chat_id: chat_id.clone(),
                    status: SendStatus::Ok,
                    error: None,
                });
            }
            Err(e) => {
                error!("Delivery to chat {} failed: {:#}", chat_id, e);
                outcomes.push(SendOutcome {
                    chat_id: chat_id.clone(),
                    status: SendStatus::Error,
                    error: Some(format!("{e:#}")),
                });
            }
        }
    }

    outcomes
}
