mod health_check;
mod helpers;
mod signups;
mod welcome_email;

pub use health_check::health_check;
pub use helpers::error_chain_fmt;
pub use signups::{FormData, SignupError, signup};
pub use welcome_email::{DispatchError, Invocation, NotificationRequest, send_welcome_email};
