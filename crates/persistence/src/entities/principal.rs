use chrono::{DateTime, Utc};
use domain::error::DomainError;
use domain::models::{Principal, PrincipalCredentials, RecordState, Role};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::parse_column;

pub const PRINCIPAL_COLUMNS: &str =
    "id, username, email, role, tenant_ids, protected, created_at, updated_at, deleted_at";

#[derive(Debug, Clone, FromRow)]
pub struct PrincipalRow {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
    pub tenant_ids: Vec<Uuid>,
    pub protected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = DomainError;

    fn try_from(row: PrincipalRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            username: row.username,
            email: row.email,
            role: parse_column::<Role>("role", &row.role)?,
            tenant_ids: row.tenant_ids,
            protected: row.protected,
            created_at: row.created_at,
            updated_at: row.updated_at,
            state: RecordState::from_deleted_at(row.deleted_at),
        })
    }
}

/// Principal row plus its password hash, read only for login.
#[derive(Debug, Clone, FromRow)]
pub struct PrincipalCredentialsRow {
    #[sqlx(flatten)]
    pub principal: PrincipalRow,
    pub password_hash: String,
}

impl TryFrom<PrincipalCredentialsRow> for PrincipalCredentials {
    type Error = DomainError;

    fn try_from(row: PrincipalCredentialsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            principal: row.principal.try_into()?,
            password_hash: row.password_hash,
        })
    }
}
