//! Departments and the areas inside them.

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
    Action, Area, CreateAreaRequest, CreateDepartmentRequest, Department, Page, ResourceKind,
    Session, UpdateAreaRequest, UpdateDepartmentRequest,
};
use crate::store::Stores;

#[derive(Clone)]
pub struct DepartmentService {
    stores: Stores,
    audit: AuditRecorder,
}

impl DepartmentService {
    pub fn new(stores: Stores, audit: AuditRecorder) -> Self {
        Self { stores, audit }
    }

    pub async fn list(&self, session: &Session, page: PageRequest) -> DomainResult<Page<Department>> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Department, None)?;
        if scope == TenantScope::NoAccess {
            return Ok(Page::empty(page));
        }
        self.stores.departments.list(&scope, page).await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> DomainResult<Department> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Department, None)?;
        found(self.stores.departments.find(&scope, id).await?, "Department")
    }

    pub async fn create(
        &self,
        session: &Session,
        request: CreateDepartmentRequest,
    ) -> DomainResult<Department> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Create, ResourceKind::Department, None)?;
        let tenant_id = scope.target_tenant(request.tenant_id)?;
        if !self.stores.tenants.exists(tenant_id).await? {
            return Err(DomainError::validation("hotel does not exist"));
        }

        let department = Department::new(tenant_id, &request.name, Utc::now());
        self.stores.departments.insert(&department).await?;

        self.audit
            .record(
                AuditEvent::created(ResourceKind::Department, department.id, &department),
                Some(session),
            )
            .await;
        Ok(department)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateDepartmentRequest,
    ) -> DomainResult<Department> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Update, ResourceKind::Department, None)?;

        let before = found(self.stores.departments.find(&scope, id).await?, "Department")?;
        let mut department = before.clone();
        department.name = request.name.trim().to_string();
        department.updated_at = Utc::now();
        self.stores.departments.update(&scope, &department).await?;

        self.audit
            .record(
                AuditEvent::updated(ResourceKind::Department, id, &before, &department),
                Some(session),
            )
            .await;
        Ok(department)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> DomainResult<()> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Delete, ResourceKind::Department, None)?;

        let before = found(self.stores.departments.find(&scope, id).await?, "Department")?;
        self.stores.departments.soft_delete(&scope, id, Utc::now()).await?;

        self.audit
            .record(AuditEvent::deleted(ResourceKind::Department, id, &before), Some(session))
            .await;
        Ok(())
    }
}

/// Areas always belong to the tenant of their department.
#[derive(Clone)]
pub struct AreaService {
    stores: Stores,
    audit: AuditRecorder,
}

impl AreaService {
    pub fn new(stores: Stores, audit: AuditRecorder) -> Self {
        Self { stores, audit }
    }

    pub async fn list(
        &self,
        session: &Session,
        department_id: Option<Uuid>,
        page: PageRequest,
    ) -> DomainResult<Page<Area>> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Area, None)?;
        if scope == TenantScope::NoAccess {
            return Ok(Page::empty(page));
        }
        self.stores.areas.list(&scope, department_id, page).await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> DomainResult<Area> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Area, None)?;
        found(self.stores.areas.find(&scope, id).await?, "Area")
    }

    pub async fn create(&self, session: &Session, request: CreateAreaRequest) -> DomainResult<Area> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Create, ResourceKind::Area, None)?;

        let department = found(
            self.stores.departments.find(&scope, request.department_id).await?,
            "Department",
        )?;
        let area = Area::new(&department, &request.name, Utc::now());
        self.stores.areas.insert(&area).await?;

        self.audit
            .record(AuditEvent::created(ResourceKind::Area, area.id, &area), Some(session))
            .await;
        Ok(area)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateAreaRequest,
    ) -> DomainResult<Area> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Update, ResourceKind::Area, None)?;

        let before = found(self.stores.areas.find(&scope, id).await?, "Area")?;
        let mut area = before.clone();

        if let Some(department_id) = request.department_id.filter(|d| *d != before.department_id) {
            let department = found(
                self.stores.departments.find(&scope, department_id).await?,
                "Department",
            )?;
            if department.tenant_id != area.tenant_id {
                return Err(DomainError::business_rule(
                    "an area cannot move to a department of another hotel",
                ));
            }
            area.department_id = department.id;
        }
        if let Some(name) = request.name {
            area.name = name.trim().to_string();
        }
        area.updated_at = Utc::now();
        self.stores.areas.update(&scope, &area).await?;

        self.audit
            .record(
                AuditEvent::updated(ResourceKind::Area, id, &before, &area),
                Some(session),
            )
            .await;
        Ok(area)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> DomainResult<()> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Delete, ResourceKind::Area, None)?;

        let before = found(self.stores.areas.find(&scope, id).await?, "Area")?;
        self.stores.areas.soft_delete(&scope, id, Utc::now()).await?;

        self.audit
            .record(AuditEvent::deleted(ResourceKind::Area, id, &before), Some(session))
            .await;
        Ok(())
    }
}
