pub mod calendar;
pub mod employee;
pub mod leave;
pub mod notification;

pub use calendar::CalendarRepository;
pub use employee::EmployeeRepository;
pub use leave::{LeaveQuery, LeaveRequestRepository};
pub use notification::NotificationRepository;
