mod errors;
mod handler;
mod helpers;
mod payload;

pub use errors::DispatchError;
pub use handler::send_welcome_email;
pub use payload::{Invocation, NotificationRequest};
