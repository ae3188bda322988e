use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::domain::SubscriberEmail;

#[derive(Clone, Debug)]
pub struct EmailClient {
    http_client: Client,
    endpoint: Url,
    sender: String,
    auth_token: SecretString,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// What the provider said about one message. The body is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderReply {
    Accepted(String),
    Rejected { status: u16, body: String },
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: String,
        auth_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        let endpoint = Url::parse(&base_url)
            .context("Failed parsing base email api url.")?
            .join("emails")
            .context("The base email api url cannot take a path.")?;

        Ok(Self {
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build the email provider http client.")?,
            endpoint,
            sender,
            auth_token,
        })
    }

    /// Sends one message. `Err` only when the provider could not be reached;
    /// any HTTP answer, successful or not, comes back as a [`ProviderReply`].
    #[tracing::instrument(name = "Calling the email provider", skip_all)]
    pub async fn send_email(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<ProviderReply, reqwest::Error> {
        let body = SendEmailRequest {
            from: &self.sender,
            to: [recipient.as_ref()],
            subject,
            html: html_content,
            text: text_content,
        };

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(self.auth_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(ProviderReply::Accepted(body))
        } else {
            Ok(ProviderReply::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
