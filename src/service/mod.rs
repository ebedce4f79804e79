pub mod activity_log;
pub mod branch_calendar;
pub mod calendar_approval;
pub mod conflicts;
pub mod day_grid;
pub mod leave_listing;
pub mod leave_workflow;
pub mod month_view;
