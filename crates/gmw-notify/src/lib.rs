//! Notification report composition and SMTP submission.

mod mailer;
mod report;

pub const CRATE_NAME: &str = "gmw-notify";

pub use mailer::{EmailSettings, Mailer};
pub use report::{compose_report, Report};
