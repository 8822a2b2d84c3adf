//! [`Mailer`] implementation backed by the Resend REST API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use dunning_app::ports::{DispatchContext, Mailer, SentEmail};
use dunning_domain::error::DispatchError;
use dunning_domain::invoice::Invoice;

use crate::error::ResendError;
use crate::template;

pub const DEFAULT_ENDPOINT: &str = "https://api.resend.com/emails";
pub const DEFAULT_FROM: &str = "onboarding@resend.dev";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`ResendMailer`].
#[derive(Debug, Clone)]
pub struct ResendConfig {
    /// Bearer key; every send fails while this is unset.
    pub api_key: Option<String>,
    /// Sender address.
    pub from: String,
    /// Link target of the "view invoice" button.
    pub app_url: String,
    pub endpoint: String,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from: DEFAULT_FROM.to_string(),
            app_url: "http://localhost:5173".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// Sends invoice emails through Resend.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    config: ResendConfig,
}

impl ResendMailer {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ResendError::Http`] if the TLS backend cannot be initialised.
    pub fn new(config: ResendConfig) -> Result<Self, ResendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        if config.api_key.is_none() {
            tracing::warn!("RESEND_API_KEY not set, every email send will fail");
        }
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn deliver(
        &self,
        invoice: &Invoice,
        context: &DispatchContext,
    ) -> Result<SentEmail, ResendError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ResendError::MissingApiKey)?;
        let subject = context
            .subject
            .clone()
            .unwrap_or_else(|| template::default_subject(invoice));
        let request = SendEmailRequest {
            from: &self.config.from,
            to: [context.to.as_str()],
            subject: &subject,
            html: template::render_html(invoice, &self.config.app_url),
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|err| err.message)
                .unwrap_or_else(|| format!("Resend error (status={status})"));
            return Err(ResendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let id = response
            .json::<SendEmailResponse>()
            .await
            .ok()
            .and_then(|body| body.id);
        tracing::debug!(email_id = ?id, to = %context.to, "email accepted by resend");

        Ok(SentEmail {
            to: context.to.clone(),
            subject,
        })
    }
}

impl Mailer for ResendMailer {
    async fn send(
        &self,
        invoice: &Invoice,
        context: &DispatchContext,
    ) -> Result<SentEmail, DispatchError> {
        self.deliver(invoice, context).await.map_err(|err| {
            if let ResendError::Rejected { status, .. } = &err {
                tracing::warn!(status, invoice_id = %invoice.id, "resend rejected email");
            }
            DispatchError::from(err)
        })
    }
}
