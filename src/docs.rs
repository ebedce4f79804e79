use crate::api::activity::ActivityQuery;
use crate::api::calendar_approval::{RejectEntry, VerifyQuery};
use crate::api::holidays::{CountryQuery, RangeQuery};
use crate::api::leave_request::{ConflictQuery, RejectLeave};
use crate::auth::auth::AuthUser;
use crate::model::activity::ActivityRecord;
use crate::model::appointment::Appointment;
use crate::model::calendar_entry::{
    CalendarEntry, EntryDraft, EntryStatus, EntryType, SpecialHours,
};
use crate::model::holiday::PublicHoliday;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::service::branch_calendar::{EntryTypeInfo, EntryView};
use crate::service::calendar_approval::{
    EntryVerification, HolidayMatch, PendingEntry, VerificationReport,
};
use crate::service::conflicts::ConflictPreview;
use crate::service::day_grid::{DayOverlay, MergedDay};
use crate::service::leave_listing::{LeaveListItem, LeavePage, LeaveQuery, LeaveSummary};
use crate::service::leave_workflow::CreateLeave;
use crate::service::month_view::{MonthQuery, MonthView};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Salon Operations API",
        version = "1.0.0",
        description = r#"
## Salon Operations

Back office for a multi-branch salon chain.

### 🔹 Key Features
- **Leave Management**
  - File leave, see clashing appointments before filing, approve/reject/cancel
  - Manager leave is routed to operational managers
- **Branch Calendar**
  - Branch managers submit holidays, closures and special hours
  - Month grid merging entries, public holidays and approved leave
- **Calendar Approval**
  - Live pending queue (Server-Sent Events)
  - Advisory public-holiday check before approving or rejecting
- **Activity Log**
  - Audit trail of every approval decision

### 🔐 Security
Every endpoint requires a **JWT Bearer** token.
Approval endpoints are limited to **operational managers** and **system admins**.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::me,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::leave_conflicts,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,

        crate::api::calendar::entry_types,
        crate::api::calendar::month,
        crate::api::calendar::list_entries,
        crate::api::calendar::approved_entries,
        crate::api::calendar::upcoming_entries,
        crate::api::calendar::create_entry,
        crate::api::calendar::update_entry,
        crate::api::calendar::delete_entry,

        crate::api::calendar_approval::pending_entries,
        crate::api::calendar_approval::pending_stream,
        crate::api::calendar_approval::verify_pending,
        crate::api::calendar_approval::approve_entry,
        crate::api::calendar_approval::reject_entry,

        crate::api::holidays::year_holidays,
        crate::api::holidays::range_holidays,

        crate::api::activity::list_activity
    ),
    components(
        schemas(
            AuthUser,
            Role,
            CreateLeave,
            RejectLeave,
            ConflictQuery,
            ConflictPreview,
            Appointment,
            LeaveRequest,
            LeaveStatus,
            LeaveType,
            LeaveQuery,
            LeaveListItem,
            LeaveSummary,
            LeavePage,
            CalendarEntry,
            EntryDraft,
            EntryStatus,
            EntryType,
            SpecialHours,
            EntryTypeInfo,
            EntryView,
            MonthQuery,
            MonthView,
            MergedDay,
            DayOverlay,
            PublicHoliday,
            CountryQuery,
            RangeQuery,
            PendingEntry,
            VerifyQuery,
            RejectEntry,
            HolidayMatch,
            EntryVerification,
            VerificationReport,
            ActivityQuery,
            ActivityRecord
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Caller identity"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Calendar", description = "Branch calendar APIs"),
        (name = "Calendar Approval", description = "Operational review of branch calendar entries"),
        (name = "Holidays", description = "Public holiday lookups"),
        (name = "Activity", description = "Audit trail"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/calendar/approvals/{entry_id}/approve"));
        assert!(doc.paths.paths.contains_key("/api/leave/conflicts"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
