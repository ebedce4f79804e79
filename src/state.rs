use std::sync::Arc;

use crate::service::activity_log::ActivityLog;
use crate::store::{AppointmentStore, BranchDirectory, CalendarStore, LeaveStore, StaffDirectory};
use crate::utils::branch_name_cache::BranchNameCache;
use crate::utils::holiday_cache::HolidayCache;
use crate::utils::holiday_client::HolidayProvider;

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub leaves: Arc<dyn LeaveStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub calendar: Arc<dyn CalendarStore>,
    pub staff: Arc<dyn StaffDirectory>,
    pub activity: ActivityLog,
    pub holidays: HolidayCache,
    pub branch_names: BranchNameCache,
    pub default_country: String,
}

pub struct Stores {
    pub leaves: Arc<dyn LeaveStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub calendar: Arc<dyn CalendarStore>,
    pub staff: Arc<dyn StaffDirectory>,
    pub branches: Arc<dyn BranchDirectory>,
    pub activity: ActivityLog,
}

impl AppState {
    pub fn new(stores: Stores, holidays: Arc<dyn HolidayProvider>, default_country: &str) -> Self {
        Self {
            leaves: stores.leaves,
            appointments: stores.appointments,
            calendar: stores.calendar,
            staff: stores.staff,
            activity: stores.activity,
            holidays: HolidayCache::new(holidays),
            branch_names: BranchNameCache::new(stores.branches),
            default_country: default_country.to_uppercase(),
        }
    }
}
