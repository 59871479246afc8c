pub mod leave;
pub mod notifications;
pub mod scope;

pub use leave::{LeaveService, StatsRequest};
pub use notifications::{LogMailer, Mailer, NotificationService, SmtpMailer};
pub use scope::Visibility;
