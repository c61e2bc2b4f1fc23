//! Translation of database errors into the domain taxonomy.

use domain::error::DomainError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

pub(crate) fn to_domain(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::RowNotFound => DomainError::not_found("Record"),
        sqlx::Error::Database(db) => {
            let constraint = db.constraint().unwrap_or("constraint").to_string();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    DomainError::Conflict(format!("duplicate value violates {}", constraint))
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    DomainError::DependencyInUse(format!("record is referenced ({})", constraint))
                }
                Some(CHECK_VIOLATION) => {
                    DomainError::business_rule(format!("value violates {}", constraint))
                }
                _ => internal(err),
            }
        }
        _ => internal(err),
    }
}

fn internal(err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, "Database error");
    DomainError::Internal(err.to_string())
}

/// `?`-friendly conversion for sqlx results.
pub(crate) trait IntoDomain<T> {
    fn into_domain(self) -> Result<T, DomainError>;
}

impl<T> IntoDomain<T> for Result<T, sqlx::Error> {
    fn into_domain(self) -> Result<T, DomainError> {
        self.map_err(to_domain)
    }
}

/// Parses an enum stored as text, treating unknown values as corrupt data.
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| DomainError::Internal(format!("invalid {} '{}': {}", column, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{MaintenanceStatus, Role};

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            to_domain(sqlx::Error::RowNotFound),
            DomainError::NotFound(_)
        ));
    }

    #[test]
    fn test_other_errors_are_internal() {
        assert!(matches!(
            to_domain(sqlx::Error::PoolTimedOut),
            DomainError::Internal(_)
        ));
    }

    #[test]
    fn test_parse_column() {
        let role: Role = parse_column("role", "tenant_admin").unwrap();
        assert_eq!(role, Role::TenantAdmin);
        let status: MaintenanceStatus = parse_column("status", "pending").unwrap();
        assert_eq!(status, MaintenanceStatus::Pending);
        assert!(matches!(
            parse_column::<Role>("role", "owner"),
            Err(DomainError::Internal(_))
        ));
    }
}
