use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use super::{CaptureForm, SignupStore, SubmitOutcome};

/// How long the confirmation stays readable before the modal closes itself.
pub const AUTO_DISMISS_DELAY: Duration = Duration::from_millis(800);

/// Scroll state of the hosting page. Scrolling is suspended while at least
/// one [`ScrollLock`] is alive.
#[derive(Debug, Clone, Default)]
pub struct PageScroll {
    locks: Arc<AtomicUsize>,
}

impl PageScroll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locks.load(Ordering::Acquire) > 0
    }

    pub fn lock(&self) -> ScrollLock {
        self.locks.fetch_add(1, Ordering::AcqRel);
        ScrollLock {
            locks: self.locks.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ScrollLock {
    locks: Arc<AtomicUsize>,
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.locks.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    CloseButton,
    OutsideClick,
    Escape,
    AutoTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Character(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dimmed area around the dialog.
    Backdrop,
    Dialog,
}

/// Everything acquired on open. Escape and backdrop clicks only act while a
/// session exists, and dropping it releases the scroll lock.
struct ModalSession {
    generation: u64,
    _scroll: ScrollLock,
}

struct ModalState {
    session: Option<ModalSession>,
    last_dismissal: Option<DismissReason>,
}

/// The part of the modal an auto-dismiss timer outlives its caller with.
struct Sessions {
    page: PageScroll,
    generation: AtomicU64,
    state: Mutex<ModalState>,
}

impl Sessions {
    fn state(&self) -> MutexGuard<'_, ModalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dismiss(&self, reason: DismissReason, generation: Option<u64>) -> bool {
        let mut state = self.state();
        let is_target = state
            .session
            .as_ref()
            .is_some_and(|s| generation.is_none_or(|g| g == s.generation));
        if !is_target {
            return false;
        }
        state.session = None;
        state.last_dismissal = Some(reason);
        tracing::debug!(?reason, "Signup modal dismissed");
        true
    }
}

/// Capture form presented in a dialog, e.g. the one opened from a pricing plan.
pub struct CaptureModal<S> {
    form: CaptureForm<S>,
    sessions: Arc<Sessions>,
}

impl<S: SignupStore> CaptureModal<S> {
    pub fn new(form: CaptureForm<S>, page: PageScroll) -> Self {
        Self {
            form,
            sessions: Arc::new(Sessions {
                page,
                generation: AtomicU64::new(0),
                state: Mutex::new(ModalState {
                    session: None,
                    last_dismissal: None,
                }),
            }),
        }
    }

    pub fn form(&self) -> &CaptureForm<S> {
        &self.form
    }

    pub fn is_open(&self) -> bool {
        self.sessions.state().session.is_some()
    }

    pub fn last_dismissal(&self) -> Option<DismissReason> {
        self.sessions.state().last_dismissal
    }

    pub fn open(&self) {
        let mut state = self.sessions.state();
        if state.session.is_some() {
            return;
        }
        self.form.reset_feedback();
        state.session = Some(ModalSession {
            generation: self.sessions.generation.fetch_add(1, Ordering::AcqRel) + 1,
            _scroll: self.sessions.page.lock(),
        });
    }

    pub fn close(&self) -> bool {
        self.sessions.dismiss(DismissReason::CloseButton, None)
    }

    /// Returns whether the key closed the modal.
    pub fn handle_key(&self, key: Key) -> bool {
        match key {
            Key::Escape => self.sessions.dismiss(DismissReason::Escape, None),
            _ => false,
        }
    }

    /// Returns whether the click closed the modal.
    pub fn handle_click(&self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Backdrop => self.sessions.dismiss(DismissReason::OutsideClick, None),
            ClickTarget::Dialog => false,
        }
    }

    /// Submits the form. On success this opening of the modal is closed
    /// [`AUTO_DISMISS_DELAY`] later by a background timer, whether or not the
    /// caller is still around. A closed modal does not submit.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(generation) = self.sessions.state().session.as_ref().map(|s| s.generation)
        else {
            return SubmitOutcome::Ignored;
        };

        let outcome = self.form.submit().await;

        if outcome == SubmitOutcome::Success {
            schedule_auto_dismiss(Arc::downgrade(&self.sessions), generation);
        }

        outcome
    }
}

fn schedule_auto_dismiss(sessions: Weak<Sessions>, generation: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(AUTO_DISMISS_DELAY).await;
        if let Some(sessions) = sessions.upgrade() {
            sessions.dismiss(DismissReason::AutoTimeout, Some(generation));
        }
    });
}
