//! Hotel staff that devices get assigned to. Staff users never log in.

use chrono::Utc;
use shared::pagination::PageRequest;
use uuid::Uuid;
use validator::Validate;

use super::access_policy::authorize;
use super::audit::{AuditEvent, AuditRecorder};
use super::found;
use super::scope::{self, TenantScope};
use crate::error::{DomainError, DomainResult};
use crate::models::{
    Action, CreateStaffUserRequest, Page, ResourceKind, Session, StaffUser, UpdateStaffUserRequest,
};
use crate::store::Stores;

#[derive(Clone)]
pub struct StaffUserService {
    stores: Stores,
    audit: AuditRecorder,
}

impl StaffUserService {
    pub fn new(stores: Stores, audit: AuditRecorder) -> Self {
        Self { stores, audit }
    }

    /// The department, when given, must be a live department of the same hotel.
    async fn check_department(
        &self,
        scope: &TenantScope,
        tenant_id: Uuid,
        department_id: Option<Uuid>,
    ) -> DomainResult<()> {
        let Some(department_id) = department_id else {
            return Ok(());
        };
        match self.stores.departments.find(scope, department_id).await? {
            Some(d) if d.tenant_id == tenant_id => Ok(()),
            _ => Err(DomainError::validation("department does not exist in this hotel")),
        }
    }

    pub async fn list(&self, session: &Session, page: PageRequest) -> DomainResult<Page<StaffUser>> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::StaffUser, None)?;
        if scope == TenantScope::NoAccess {
            return Ok(Page::empty(page));
        }
        self.stores.staff.list(&scope, page).await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> DomainResult<StaffUser> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::StaffUser, None)?;
        found(self.stores.staff.find(&scope, id).await?, "Staff user")
    }

    pub async fn create(
        &self,
        session: &Session,
        request: CreateStaffUserRequest,
    ) -> DomainResult<StaffUser> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Create, ResourceKind::StaffUser, None)?;
        let tenant_id = scope.target_tenant(request.tenant_id)?;
        if !self.stores.tenants.exists(tenant_id).await? {
            return Err(DomainError::validation("hotel does not exist"));
        }
        self.check_department(&scope, tenant_id, request.department_id).await?;

        let staff = StaffUser::new(tenant_id, request, Utc::now());
        self.stores.staff.insert(&staff).await?;

        self.audit
            .record(
                AuditEvent::created(ResourceKind::StaffUser, staff.id, &staff),
                Some(session),
            )
            .await;
        Ok(staff)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateStaffUserRequest,
    ) -> DomainResult<StaffUser> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Update, ResourceKind::StaffUser, None)?;

        let before = found(self.stores.staff.find(&scope, id).await?, "Staff user")?;
        if let Some(department_id) = request.department_id {
            self.check_department(&scope, before.tenant_id, department_id).await?;
        }

        let mut staff = before.clone();
        staff.apply(request, Utc::now());
        self.stores.staff.update(&scope, &staff).await?;

        self.audit
            .record(
                AuditEvent::updated(ResourceKind::StaffUser, id, &before, &staff),
                Some(session),
            )
            .await;
        Ok(staff)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> DomainResult<()> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Delete, ResourceKind::StaffUser, None)?;

        let before = found(self.stores.staff.find(&scope, id).await?, "Staff user")?;
        self.stores.staff.soft_delete(&scope, id, Utc::now()).await?;

        self.audit
            .record(AuditEvent::deleted(ResourceKind::StaffUser, id, &before), Some(session))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateDepartmentRequest, Role};
    use crate::services::testing::{session, session_in, World};

    fn request(name: &str, login: Option<&str>) -> CreateStaffUserRequest {
        CreateStaffUserRequest {
            tenant_id: None,
            full_name: name.into(),
            login: login.map(Into::into),
            email: None,
            position: None,
            department_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_uses_active_tenant() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let b = world.tenant("B01").await;
        let admin = session_in(Role::TenantAdmin, vec![a.id, b.id], b.id);

        let staff = world
            .services
            .staff
            .create(&admin, request("Ana Ruiz", Some("aruiz")))
            .await
            .unwrap();
        assert_eq!(staff.tenant_id, b.id);
    }

    #[tokio::test]
    async fn test_tenant_required_with_several_in_scope() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let b = world.tenant("B01").await;
        let admin = session(Role::TenantAdmin, vec![a.id, b.id]);

        let result = world
            .services
            .staff
            .create(&admin, request("Ana Ruiz", None))
            .await;
        assert!(matches!(result, Err(DomainError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_login_unique_per_tenant() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let b = world.tenant("B01").await;
        let root = session(Role::GlobalRoot, vec![]);
        let staff = &world.services.staff;

        let mut first = request("Ana Ruiz", Some("aruiz"));
        first.tenant_id = Some(a.id);
        staff.create(&root, first.clone()).await.unwrap();

        assert!(matches!(
            staff.create(&root, first).await,
            Err(DomainError::Conflict(_))
        ));

        let mut other_hotel = request("Ana Ruiz", Some("aruiz"));
        other_hotel.tenant_id = Some(b.id);
        assert!(staff.create(&root, other_hotel).await.is_ok());
    }

    #[tokio::test]
    async fn test_department_of_other_hotel_rejected() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let b = world.tenant("B01").await;
        let root = session(Role::GlobalRoot, vec![]);

        let department = world
            .services
            .departments
            .create(
                &root,
                CreateDepartmentRequest {
                    tenant_id: Some(b.id),
                    name: "Cocina".into(),
                },
            )
            .await
            .unwrap();

        let mut staff = request("Luis Pérez", None);
        staff.tenant_id = Some(a.id);
        staff.department_id = Some(department.id);
        assert!(matches!(
            world.services.staff.create(&root, staff).await,
            Err(DomainError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_assistant_cannot_delete() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let assistant = session_in(Role::TenantAssistant, vec![a.id], a.id);
        let staff = world
            .services
            .staff
            .create(&assistant, request("Ana Ruiz", None))
            .await
            .unwrap();

        assert!(matches!(
            world.services.staff.delete(&assistant, staff.id).await,
            Err(DomainError::Forbidden(_))
        ));
    }
}
