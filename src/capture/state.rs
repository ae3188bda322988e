pub const SUCCESS_MESSAGE: &str = "Thanks! We'll notify you when we launch.";
pub const CONFLICT_MESSAGE: &str = "You are already on the waitlist.";
pub const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Feedback state of a single capture point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Submitting,
    Success,
    Conflict,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    Submit,
    Inserted,
    AlreadyPresent,
    Failed,
    Reset,
}

impl CaptureState {
    pub fn on(self, event: CaptureEvent) -> CaptureState {
        use CaptureEvent as E;
        use CaptureState as S;

        match (self, event) {
            (_, E::Submit) => S::Submitting,
            (S::Submitting, E::Inserted) => S::Success,
            (S::Submitting, E::AlreadyPresent) => S::Conflict,
            (S::Submitting, E::Failed) => S::Error,
            // feedback cannot be cleared under a pending insert
            (S::Submitting, E::Reset) => S::Submitting,
            (_, E::Reset) => S::Idle,
            // a store answer outside of a submission is stale
            (state, _) => state,
        }
    }

    pub fn is_submitting(self) -> bool {
        self == CaptureState::Submitting
    }

    pub fn message(self) -> Option<&'static str> {
        match self {
            CaptureState::Idle | CaptureState::Submitting => None,
            CaptureState::Success => Some(SUCCESS_MESSAGE),
            CaptureState::Conflict => Some(CONFLICT_MESSAGE),
            CaptureState::Error => Some(FAILURE_MESSAGE),
        }
    }

    /// Only a genuine failure is rendered as an error; a duplicate is not.
    pub fn is_error(self) -> bool {
        self == CaptureState::Error
    }
}
