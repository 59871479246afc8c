pub mod index;
pub mod working_days;

pub use index::CalendarIndex;
pub use working_days::{WorkingDaySummary, validate_period, working_days};

/// Message returned when a requested period has no working days at all.
pub const EMPTY_PERIOD_MESSAGE: &str = "period contains only holidays and weekends";
