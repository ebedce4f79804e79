use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::model::role::Role;
use crate::model::staff::{Branch, StaffMember};
use crate::store::StoreError;

#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn get(&self, staff_id: &str) -> Result<Option<StaffMember>, StoreError>;
    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<StaffMember>, StoreError>;
}

#[async_trait]
pub trait BranchDirectory: Send + Sync {
    async fn branch_name(&self, branch_id: &str) -> Result<Option<String>, StoreError>;
}

/// Reads staff and branch records owned by the wider back office.
pub struct MySqlDirectory {
    pool: MySqlPool,
}

impl MySqlDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StaffRow {
    id: String,
    branch_id: String,
    display_name: String,
    role: String,
}

impl TryFrom<StaffRow> for StaffMember {
    type Error = StoreError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| StoreError::corrupt(&row.id, format!("unknown role {}", row.role)))?;
        Ok(StaffMember {
            id: row.id,
            branch_id: row.branch_id,
            display_name: row.display_name,
            role,
        })
    }
}

#[async_trait]
impl StaffDirectory for MySqlDirectory {
    async fn get(&self, staff_id: &str) -> Result<Option<StaffMember>, StoreError> {
        let row = sqlx::query_as::<_, StaffRow>(
            "SELECT id, branch_id, display_name, role FROM staff WHERE id = ?",
        )
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StaffMember::try_from).transpose()
    }

    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<StaffMember>, StoreError> {
        let rows = sqlx::query_as::<_, StaffRow>(
            "SELECT id, branch_id, display_name, role FROM staff WHERE branch_id = ? ORDER BY display_name",
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StaffMember::try_from).collect()
    }
}

#[async_trait]
impl BranchDirectory for MySqlDirectory {
    async fn branch_name(&self, branch_id: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query_as::<_, Branch>("SELECT id, name FROM branches WHERE id = ?")
            .bind(branch_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|branch| branch.name))
    }
}
