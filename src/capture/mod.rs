//! Client-side signup capture.
//!
//! A [`CaptureForm`] is one capture point on the page (hero, footer, pricing
//! modal, ...). It owns its feedback state and an in-flight gate; the only
//! coordination between instances is the signup store's uniqueness constraint.

mod analytics;
mod form;
mod modal;
mod state;
mod store;

pub use analytics::{Analytics, AnalyticsEvent, EMAIL_SUBMIT_EVENT, TracingAnalytics};
pub use form::{CaptureForm, SubmitOutcome};
pub use modal::{AUTO_DISMISS_DELAY, CaptureModal, ClickTarget, DismissReason, Key, PageScroll, ScrollLock};
pub use state::{CONFLICT_MESSAGE, CaptureEvent, CaptureState, FAILURE_MESSAGE, SUCCESS_MESSAGE};
pub use store::{InsertError, PgSignupStore, SignupStore};

#[cfg(test)]
pub(crate) use store::fakes;
