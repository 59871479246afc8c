pub mod calendar;
pub mod leave;
pub mod notifications;
pub mod shared;
pub mod stats;
