mod new_signup;
mod source_tag;
mod subscriber_email;

pub use new_signup::NewSignup;
pub use source_tag::SourceTag;
pub use subscriber_email::SubscriberEmail;
