use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::Config;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn sent() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Transactional email. Delivery problems come back in the outcome, never as errors.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> SendOutcome;
}

pub fn from_config(cfg: &Config) -> Arc<dyn Mailer> {
    match &cfg.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(key.clone(), cfg.mail_from.clone())),
        None => {
            warn!("RESEND_API_KEY is not set; outgoing mail is only logged");
            Arc::new(LogMailer)
        }
    }
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
            endpoint: RESEND_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &Email) -> SendOutcome {
        let payload = json!({
            "from": self.from,
            "to": [email.to],
            "subject": email.subject,
            "text": email.body,
        });

        let resp = match self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "mail request failed");
                return SendOutcome::failed("mail service unreachable");
            }
        };

        let status = resp.status();
        if status.is_success() {
            info!(to = %email.to, "mail sent");
            return SendOutcome::sent();
        }
        let detail = resp.text().await.unwrap_or_default();
        warn!(%status, %detail, "mail service rejected message");
        SendOutcome::failed(format!("mail service responded with {status}"))
    }
}

/// Stand-in used when no mail provider is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> SendOutcome {
        info!(to = %email.to, subject = %email.subject, "mail not sent (no provider configured)");
        SendOutcome::sent()
    }
}
