pub mod command;
pub mod dispatcher;
pub mod notifier;
pub mod oneshot;

pub use command::{encode_payload, NotificationCommand};
pub use dispatcher::{DispatchOutcome, NotificationDispatcher, DEFAULT_CONFIDENCE_THRESHOLD};
pub use notifier::Notifier;
pub use oneshot::{send_once, NotifyArgs};
