use serde::Deserialize;

use super::errors::DispatchError;
use crate::domain::SubscriberEmail;

#[derive(Deserialize, Default)]
struct RawPayload {
    record: Option<RawRecord>,
    email: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawRecord {
    email: Option<String>,
    source: Option<String>,
}

/// The two accepted invocation shapes.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Row-insert webhook from the signup store: `{ "record": { "email": .. } }`.
    Webhook {
        email: String,
        source: Option<String>,
    },
    /// Manual call: `{ "email": .. }`.
    Direct { email: String },
}

impl Invocation {
    /// A nested email takes precedence over a flat one. Empty strings count as
    /// missing.
    pub fn parse(body: &[u8]) -> Result<Self, DispatchError> {
        let payload: RawPayload =
            serde_json::from_slice(body).map_err(DispatchError::MalformedPayload)?;

        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        let record = payload.record.unwrap_or_default();

        if let Some(email) = non_empty(record.email) {
            return Ok(Invocation::Webhook {
                email,
                source: record.source,
            });
        }

        non_empty(payload.email)
            .map(|email| Invocation::Direct { email })
            .ok_or(DispatchError::MissingEmail)
    }
}

/// One welcome email to send. Lives for a single invocation.
#[derive(Debug)]
pub struct NotificationRequest {
    pub email: SubscriberEmail,
    pub source_hint: Option<String>,
}

impl TryFrom<Invocation> for NotificationRequest {
    type Error = DispatchError;

    fn try_from(value: Invocation) -> Result<Self, Self::Error> {
        let (email, source_hint) = match value {
            Invocation::Webhook { email, source } => (email, source),
            Invocation::Direct { email } => (email, None),
        };
        let email = SubscriberEmail::parse(email).map_err(DispatchError::InvalidEmail)?;
        Ok(Self { email, source_hint })
    }
}
