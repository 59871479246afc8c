pub mod calendar;
pub mod employee;
pub mod leave;
pub mod notification;

pub use calendar::{ExceptionDay, ExceptionDayInput, ExceptionKind};
pub use employee::{Employee, EmployeeRole};
pub use leave::{
    DecisionAction, DecisionInput, LeaveRequest, LeaveRequestInput, LeaveRequestPatch, LeaveStatus,
    LeaveType,
};
pub use notification::Notification;
