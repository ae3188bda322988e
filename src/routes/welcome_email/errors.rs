use actix_web::{
    HttpResponse, ResponseError,
    http::{
        StatusCode,
        header::{self, HeaderValue},
    },
};

use crate::routes::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum DispatchError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Missing email provider credential")]
    MisconfiguredService,
    #[error("Invalid JSON payload")]
    MalformedPayload(#[source] serde_json::Error),
    #[error("Missing email")]
    MissingEmail,
    #[error("Invalid email")]
    InvalidEmail(String),
    #[error("Failed to render the welcome email")]
    Render(#[source] tera::Error),
    #[error("The email provider rejected the message with status {status}")]
    ProviderRejected { status: u16, body: String },
    #[error("The email provider could not be reached")]
    ProviderUnreachable(#[source] reqwest::Error),
}

impl std::fmt::Debug for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for DispatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::Unauthorized => StatusCode::UNAUTHORIZED,
            DispatchError::MalformedPayload(_)
            | DispatchError::MissingEmail
            | DispatchError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            DispatchError::MisconfiguredService
            | DispatchError::Render(_)
            | DispatchError::ProviderRejected { .. }
            | DispatchError::ProviderUnreachable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());

        match self {
            DispatchError::MethodNotAllowed => {
                response.insert_header((header::ALLOW, HeaderValue::from_static("POST")));
            }
            DispatchError::Unauthorized => {
                response.insert_header((
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(r#"Bearer realm="welcome-email""#),
                ));
            }
            _ => {}
        }

        match self {
            // passed through untouched so the provider's diagnostics survive
            DispatchError::ProviderRejected { body, .. } => response.body(body.clone()),
            other => response.body(other.to_string()),
        }
    }
}
