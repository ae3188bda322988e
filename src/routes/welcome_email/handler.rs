use actix_web::{HttpRequest, HttpResponse, http::Method, http::header::HeaderMap, web};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use super::{
    errors::DispatchError,
    helpers::{WELCOME_SUBJECT, get_email_html, get_email_text},
    payload::{Invocation, NotificationRequest},
};
use crate::{
    email_client::ProviderReply,
    startup::{EmailProvider, SiteUrl, WebhookSecret},
};

/// Turns one new signup into one welcome email.
///
/// Rejections happen in a fixed order: method, caller credentials, provider
/// credential, payload. The provider is called at most once and its answer is
/// relayed verbatim.
#[tracing::instrument(
    name = "Dispatching a welcome email",
    skip_all,
    fields(recipient = tracing::field::Empty, source = tracing::field::Empty)
)]
pub async fn send_welcome_email(
    request: HttpRequest,
    body: web::Bytes,
    email_provider: web::Data<EmailProvider>,
    webhook_secret: web::Data<WebhookSecret>,
    site_url: web::Data<SiteUrl>,
) -> Result<HttpResponse, DispatchError> {
    if request.method() != Method::POST {
        return Err(DispatchError::MethodNotAllowed);
    }

    if let Some(secret) = &webhook_secret.0 {
        authorize(request.headers(), secret)?;
    }

    let email_client = email_provider.0.as_ref().ok_or_else(|| {
        tracing::error!("No email provider credential is configured.");
        DispatchError::MisconfiguredService
    })?;

    let notification = NotificationRequest::try_from(Invocation::parse(&body)?)?;

    let span = tracing::Span::current();
    span.record("recipient", tracing::field::display(&notification.email));
    if let Some(source) = &notification.source_hint {
        span.record("source", tracing::field::display(source));
    }

    let html = get_email_html(notification.email.as_ref(), &site_url.0)
        .map_err(DispatchError::Render)?;
    let text = get_email_text(notification.email.as_ref(), &site_url.0);

    let reply = email_client
        .send_email(&notification.email, WELCOME_SUBJECT, &html, &text)
        .await
        .map_err(|e| {
            tracing::error!(error.cause_chain = ?e, "Failed to reach the email provider.");
            DispatchError::ProviderUnreachable(e)
        })?;

    match reply {
        ProviderReply::Accepted(body) => {
            tracing::info!("Welcome email accepted by the provider.");
            Ok(HttpResponse::Ok().body(body))
        }
        ProviderReply::Rejected { status, body } => {
            tracing::error!(
                provider.status = status,
                provider.body = %body,
                "The email provider rejected the welcome email."
            );
            Err(DispatchError::ProviderRejected { status, body })
        }
    }
}

fn authorize(headers: &HeaderMap, secret: &SecretString) -> Result<(), DispatchError> {
    let token = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let is_valid = token.is_some_and(|token| {
        token
            .as_bytes()
            .ct_eq(secret.expose_secret().as_bytes())
            .into()
    });

    if !is_valid {
        tracing::warn!("Rejected a welcome email call with bad credentials.");
        return Err(DispatchError::Unauthorized);
    }
    Ok(())
}
