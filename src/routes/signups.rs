use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, http::header, web};
use sqlx::PgPool;

use super::helpers::error_chain_fmt;
use crate::{
    capture::{
        CONFLICT_MESSAGE, CaptureForm, FAILURE_MESSAGE, PgSignupStore, SUCCESS_MESSAGE,
        SubmitOutcome, TracingAnalytics,
    },
    domain::SourceTag,
};

#[derive(serde::Deserialize)]
pub struct FormData {
    pub email: String,
    pub section: String,
    pub plan: Option<String>,
}

#[derive(thiserror::Error)]
pub enum SignupError {
    #[error("{0}")]
    ValidationError(String),
}

impl std::fmt::Debug for SignupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SignupError {
    fn status_code(&self) -> StatusCode {
        match self {
            SignupError::ValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

/// Server-rendered capture point: one fresh capture form per request.
#[tracing::instrument(
    name = "Capturing a signup",
    skip(form, request, db_pool),
    fields(section = %form.section, plan = ?form.plan)
)]
pub async fn signup(
    form: web::Form<FormData>,
    request: HttpRequest,
    db_pool: web::Data<PgPool>,
) -> Result<HttpResponse, SignupError> {
    let FormData {
        email,
        section,
        plan,
    } = form.into_inner();

    let source = SourceTag::parse(section, plan).map_err(SignupError::ValidationError)?;
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let capture = CaptureForm::new(PgSignupStore::new(db_pool.get_ref().clone()), source, user_agent)
        .with_analytics(Arc::new(TracingAnalytics));
    capture.set_email(email);

    let response = match capture.submit().await {
        SubmitOutcome::Success => HttpResponse::Ok().body(SUCCESS_MESSAGE),
        SubmitOutcome::Conflict => HttpResponse::Conflict().body(CONFLICT_MESSAGE),
        SubmitOutcome::Invalid(e) => return Err(SignupError::ValidationError(e)),
        SubmitOutcome::Failed | SubmitOutcome::Ignored => {
            HttpResponse::InternalServerError().body(FAILURE_MESSAGE)
        }
    };

    Ok(response)
}
