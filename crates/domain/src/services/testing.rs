//! Fixtures shared by the service tests.

use chrono::Utc;
use fake::faker::internet::en::{SafeEmail, Username};
use fake::Fake;
use std::sync::Arc;
use uuid::Uuid;

use super::{ServiceSettings, Services};
use crate::models::{CreateTenantRequest, Principal, RecordState, Role, Session, Tenant};
use crate::services::notification::MockNotificationService;
use crate::store::memory::MemoryStore;
use crate::store::{Stores, TenantStore};

pub struct World {
    pub store: Arc<MemoryStore>,
    pub stores: Stores,
    pub services: Services,
}

impl World {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::from_memory(store.clone());
        let services = Services::new(
            stores.clone(),
            Arc::new(MockNotificationService::new()),
            ServiceSettings::default(),
        );
        Self {
            store,
            stores,
            services,
        }
    }

    pub async fn tenant(&self, code: &str) -> Tenant {
        let tenant = Tenant::new(
            CreateTenantRequest {
                name: format!("Hotel {}", code),
                code: code.into(),
                active: None,
            },
            Utc::now(),
        );
        TenantStore::insert(self.store.as_ref(), &tenant)
            .await
            .unwrap();
        tenant
    }
}

pub fn principal(role: Role, tenants: Vec<Uuid>) -> Principal {
    let now = Utc::now();
    Principal {
        id: Uuid::new_v4(),
        username: format!("{}-{}", Username().fake::<String>(), &Uuid::new_v4().to_string()[..8]),
        email: Some(SafeEmail().fake()),
        role,
        tenant_ids: tenants,
        protected: false,
        created_at: now,
        updated_at: now,
        state: RecordState::Active,
    }
}

pub fn session(role: Role, tenants: Vec<Uuid>) -> Session {
    Session::establish(principal(role, tenants), None, true).unwrap()
}

pub fn session_in(role: Role, tenants: Vec<Uuid>, active: Uuid) -> Session {
    Session::establish(principal(role, tenants), Some(active), true).unwrap()
}
