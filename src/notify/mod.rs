pub mod email;
pub mod mailer;
pub mod sweeps;

pub use mailer::{EmailSender, NoopMailer, SmtpMailer};
