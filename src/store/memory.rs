//! In-memory stores for handler and service tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::activity::{ActivityFilter, ActivityRecord};
use crate::model::appointment::Appointment;
use crate::model::calendar_entry::{CalendarEntry, EntryStatus, ReviewStamp};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveTransition};
use crate::model::staff::{Branch, StaffMember};
use crate::store::{
    ActivityStore, AppointmentStore, BranchDirectory, CalendarStore, LeaveStore, PendingFeed,
    PendingSubscription, ReviewOutcome, StaffDirectory, StoreError,
};

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[derive(Default)]
pub struct MemoryAppointments {
    rows: Mutex<Vec<Appointment>>,
    failing: AtomicBool,
}

impl MemoryAppointments {
    pub fn with(rows: Vec<Appointment>) -> Self {
        Self {
            rows: Mutex::new(rows),
            failing: AtomicBool::new(false),
        }
    }

    pub fn add(&self, appointment: Appointment) {
        self.rows.lock().unwrap().push(appointment);
    }

    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointments {
    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<Appointment>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|a| a.stylist_id == employee_id).cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryLeaves {
    rows: Mutex<HashMap<String, LeaveRequest>>,
}

impl MemoryLeaves {
    pub fn insert(&self, leave: LeaveRequest) {
        self.rows.lock().unwrap().insert(leave.id.clone(), leave);
    }

    pub fn all(&self) -> Vec<LeaveRequest> {
        self.rows.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl LeaveStore for MemoryLeaves {
    async fn create(&self, leave: &LeaveRequest) -> Result<(), StoreError> {
        self.insert(leave.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn transition(&self, id: &str, transition: &LeaveTransition) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(id) {
            Some(leave) if leave.status == LeaveStatus::Pending => {
                leave.apply(transition);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<LeaveRequest>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|l| l.branch_id == branch_id).cloned().collect())
    }

    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<LeaveRequest>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|l| l.employee_id == employee_id).cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryCalendar {
    rows: Mutex<HashMap<String, CalendarEntry>>,
    feed: PendingFeed,
    failing_reads: AtomicBool,
    delete_after_read: AtomicBool,
}

impl MemoryCalendar {
    /// Inserts without touching status, e.g. legacy rows.
    pub fn seed(&self, entry: CalendarEntry) {
        self.rows.lock().unwrap().insert(entry.id.clone(), entry);
        self.publish();
    }

    /// Makes `get` fail while writes keep working.
    pub fn fail_reads(&self, on: bool) {
        self.failing_reads.store(on, Ordering::SeqCst);
    }

    /// The next `get` returns the entry, then it is deleted as if by another request.
    pub fn delete_after_next_read(&self) {
        self.delete_after_read.store(true, Ordering::SeqCst);
    }

    fn publish(&self) {
        let pending = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.status == EntryStatus::Pending)
            .cloned()
            .collect();
        self.feed.publish(pending);
    }

    fn select(&self, keep: impl Fn(&CalendarEntry) -> bool) -> Vec<CalendarEntry> {
        let mut found: Vec<CalendarEntry> =
            self.rows.lock().unwrap().values().filter(|e| keep(e)).cloned().collect();
        found.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        found
    }
}

#[async_trait]
impl CalendarStore for MemoryCalendar {
    async fn insert(&self, entry: &CalendarEntry) -> Result<(), StoreError> {
        self.rows.lock().unwrap().insert(entry.id.clone(), entry.clone());
        self.publish();
        Ok(())
    }

    async fn update(&self, entry: &CalendarEntry) -> Result<bool, StoreError> {
        let updated = {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&entry.id) {
                Some(stored) if stored.branch_id == entry.branch_id => {
                    stored.date = entry.date;
                    stored.title = entry.title.clone();
                    stored.description = entry.description.clone();
                    stored.entry_type = entry.entry_type;
                    stored.all_day = entry.all_day;
                    stored.special_hours = entry.special_hours;
                    stored.updated_at = entry.updated_at;
                    true
                }
                _ => false,
            }
        };
        if updated {
            self.publish();
        }
        Ok(updated)
    }

    async fn get(&self, entry_id: &str) -> Result<Option<CalendarEntry>, StoreError> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let found = self.rows.lock().unwrap().get(entry_id).cloned();
        if self.delete_after_read.swap(false, Ordering::SeqCst) {
            self.rows.lock().unwrap().remove(entry_id);
            self.publish();
        }
        Ok(found)
    }

    async fn delete(&self, branch_id: &str, entry_id: &str) -> Result<bool, StoreError> {
        let removed = {
            let mut rows = self.rows.lock().unwrap();
            match rows.get(entry_id) {
                Some(e) if e.branch_id == branch_id => rows.remove(entry_id).is_some(),
                _ => false,
            }
        };
        self.publish();
        Ok(removed)
    }

    async fn review(&self, entry_id: &str, stamp: &ReviewStamp) -> Result<ReviewOutcome, StoreError> {
        let outcome = {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(entry_id) {
                None => ReviewOutcome::NotFound,
                Some(entry) if entry.status != EntryStatus::Pending => {
                    ReviewOutcome::AlreadyReviewed(entry.status)
                }
                Some(entry) => {
                    entry.apply_review(stamp);
                    ReviewOutcome::Applied(entry.clone())
                }
            }
        };
        if matches!(outcome, ReviewOutcome::Applied(_)) {
            self.publish();
        }
        Ok(outcome)
    }

    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<CalendarEntry>, StoreError> {
        Ok(self.select(|e| e.branch_id == branch_id))
    }

    async fn list_between(
        &self,
        branch_id: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEntry>, StoreError> {
        Ok(self.select(|e| {
            branch_id.is_none_or(|b| e.branch_id == b) && from <= e.date && e.date <= to
        }))
    }

    async fn list_pending(&self) -> Result<Vec<CalendarEntry>, StoreError> {
        Ok(self.select(|e| e.status == EntryStatus::Pending))
    }

    fn subscribe_pending(&self) -> PendingSubscription {
        self.feed.subscribe()
    }

    async fn refresh_pending(&self) -> Result<(), StoreError> {
        self.publish();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryDirectory {
    staff: Mutex<HashMap<String, StaffMember>>,
    branches: Mutex<HashMap<String, Branch>>,
    failing: AtomicBool,
}

impl MemoryDirectory {
    pub fn add_staff(&self, member: StaffMember) {
        self.staff.lock().unwrap().insert(member.id.clone(), member);
    }

    pub fn add_branch(&self, id: &str, name: &str) {
        self.branches.lock().unwrap().insert(
            id.to_string(),
            Branch {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
    }

    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl StaffDirectory for MemoryDirectory {
    async fn get(&self, staff_id: &str) -> Result<Option<StaffMember>, StoreError> {
        Ok(self.staff.lock().unwrap().get(staff_id).cloned())
    }

    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<StaffMember>, StoreError> {
        let staff = self.staff.lock().unwrap();
        Ok(staff.values().filter(|s| s.branch_id == branch_id).cloned().collect())
    }
}

#[async_trait]
impl BranchDirectory for MemoryDirectory {
    async fn branch_name(&self, branch_id: &str) -> Result<Option<String>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.branches.lock().unwrap().get(branch_id).map(|b| b.name.clone()))
    }
}

#[derive(Default)]
pub struct MemoryActivity {
    rows: Mutex<Vec<ActivityRecord>>,
    failing: AtomicBool,
}

impl MemoryActivity {
    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    pub fn actions(&self) -> Vec<String> {
        self.rows.lock().unwrap().iter().map(|r| r.action.clone()).collect()
    }
}

#[async_trait]
impl ActivityStore for MemoryActivity {
    async fn insert(&self, record: &ActivityRecord) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list(&self, filter: &ActivityFilter) -> Result<Vec<ActivityRecord>, StoreError> {
        let rows = self.rows.lock().unwrap();
        let mut found: Vec<ActivityRecord> = rows
            .iter()
            .filter(|r| filter.performed_by.as_ref().is_none_or(|p| &r.performed_by == p))
            .filter(|r| filter.action.as_ref().is_none_or(|a| &r.action == a))
            .filter(|r| {
                filter
                    .branch_id
                    .as_ref()
                    .is_none_or(|b| r.branch_id.as_ref() == Some(b))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        found.truncate(filter.limit as usize);
        Ok(found)
    }
}
