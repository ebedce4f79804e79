pub mod activity;
pub mod appointment;
pub mod calendar_entry;
pub mod holiday;
pub mod leave_request;
pub mod role;
pub mod staff;
