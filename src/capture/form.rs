use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{
    Analytics, AnalyticsEvent, CaptureEvent, CaptureState, EMAIL_SUBMIT_EVENT, InsertError,
    SignupStore,
};
use crate::domain::{NewSignup, SourceTag, SubscriberEmail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Rejected before reaching the store.
    Invalid(String),
    /// Another submission from this form is still in flight.
    Ignored,
    Success,
    Conflict,
    Failed,
}

#[derive(Default)]
struct FormView {
    email: String,
    state: CaptureState,
}

pub struct CaptureForm<S> {
    store: S,
    source: SourceTag,
    user_agent: String,
    analytics: Option<Arc<dyn Analytics>>,
    in_flight: AtomicBool,
    view: Mutex<FormView>,
}

/// Held for the whole of a submission. Dropping it reopens the form on every
/// exit path, including a cancelled submit future.
struct InFlight<'a> {
    flag: &'a AtomicBool,
    view: &'a Mutex<FormView>,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, view: &'a Mutex<FormView>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, view })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        if view.state.is_submitting() {
            view.state = CaptureState::Idle;
        }
        drop(view);
        self.flag.store(false, Ordering::Release);
    }
}

impl<S: SignupStore> CaptureForm<S> {
    pub fn new(store: S, source: SourceTag, user_agent: impl Into<String>) -> Self {
        Self {
            store,
            source,
            user_agent: user_agent.into(),
            analytics: None,
            in_flight: AtomicBool::new(false),
            view: Mutex::new(FormView::default()),
        }
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn Analytics>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    pub fn source(&self) -> &SourceTag {
        &self.source
    }

    pub fn set_email(&self, value: impl Into<String>) {
        self.view().email = value.into();
    }

    pub fn email(&self) -> String {
        self.view().email.clone()
    }

    pub fn state(&self) -> CaptureState {
        self.view().state
    }

    pub fn message(&self) -> Option<&'static str> {
        self.state().message()
    }

    pub fn submit_enabled(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    pub fn reset_feedback(&self) {
        self.apply(CaptureEvent::Reset);
    }

    #[tracing::instrument(
        name = "Submitting a signup",
        skip(self),
        fields(source = %self.source)
    )]
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight, &self.view) else {
            return SubmitOutcome::Ignored;
        };

        let email = match SubscriberEmail::parse(self.email()) {
            Ok(email) => email,
            Err(e) => return SubmitOutcome::Invalid(e),
        };

        self.apply(CaptureEvent::Submit);

        let signup = NewSignup {
            email,
            source: self.source.clone(),
            user_agent: self.user_agent.clone(),
        };

        match self.store.insert(&signup).await {
            Ok(()) => {
                {
                    let mut view = self.view();
                    view.email.clear();
                    view.state = view.state.on(CaptureEvent::Inserted);
                }
                self.track_submit();
                SubmitOutcome::Success
            }
            Err(InsertError::Conflict) => {
                tracing::debug!("The email is already on the waitlist.");
                self.apply(CaptureEvent::AlreadyPresent);
                SubmitOutcome::Conflict
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to save the signup."
                );
                self.apply(CaptureEvent::Failed);
                SubmitOutcome::Failed
            }
        }
    }

    fn track_submit(&self) {
        let Some(analytics) = &self.analytics else {
            return;
        };

        let event = AnalyticsEvent {
            name: EMAIL_SUBMIT_EVENT,
            section: self.source.section().to_owned(),
            plan: self.source.plan().unwrap_or("unknown").to_owned(),
        };

        if let Err(e) = analytics.track(&event) {
            tracing::warn!(
                error.cause_chain = ?e,
                "Failed to emit the analytics event."
            );
        }
    }

    fn apply(&self, event: CaptureEvent) {
        let mut view = self.view();
        view.state = view.state.on(event);
    }

    fn view(&self) -> MutexGuard<'_, FormView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
