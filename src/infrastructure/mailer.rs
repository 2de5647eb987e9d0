use crate::domain::payment::EmailMessage;
use crate::domain::ports::Notifier;
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use std::time::Duration;

/// Notifier that posts each message as JSON (`from`, `to`, `subject`, `text`)
/// to an HTTP mail relay.
#[derive(Clone)]
pub struct MailRelayNotifier {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl MailRelayNotifier {
    pub fn new(url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkflowError::NotificationError(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }
}

#[async_trait]
impl Notifier for MailRelayNotifier {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let mut request = self.client.post(&self.url).json(&message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| WorkflowError::NotificationError(e.to_string()))?;

        tracing::info!(to = %message.to, subject = %message.subject, "email dispatched");
        Ok(())
    }
}

/// Notifier that only logs messages. Used when no mail relay is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        tracing::warn!(
            to = %message.to,
            subject = %message.subject,
            "no mail relay configured, email not delivered"
        );
        tracing::debug!(body = %message.text, "undelivered email body");
        Ok(())
    }
}
