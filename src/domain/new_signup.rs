use super::{SourceTag, SubscriberEmail};

/// The record a capture point asks the signup store to insert.
#[derive(Debug, Clone)]
pub struct NewSignup {
    pub email: SubscriberEmail,
    pub source: SourceTag,
    pub user_agent: String,
}
