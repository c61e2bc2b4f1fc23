use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::services::{NotificationService, ServiceSettings, Services};
use domain::store::Stores;
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, request_id, LoginRateLimiter};
use crate::routes::{
    audit_logs, auth, catalogs, devices, disposals, health, import, maintenances, organization,
    principals, staff_users, tenants,
};

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub jwt: Arc<JwtConfig>,
    pub config: Arc<Config>,
    pub login_limiter: Arc<LoginRateLimiter>,
    /// Present when running against PostgreSQL; used by the health check.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        config: Config,
        stores: Stores,
        notifier: Arc<dyn NotificationService>,
        pool: Option<PgPool>,
    ) -> Result<Self, JwtError> {
        let jwt = JwtConfig::from_secret(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )?;
        let services = Services::new(
            stores,
            notifier,
            ServiceSettings {
                reminder_window_days: config.reminders.window_days,
                import_max_rows: config.import.max_rows,
            },
        );

        Ok(Self {
            services,
            jwt: Arc::new(jwt),
            login_limiter: Arc::new(LoginRateLimiter::new(
                config.security.login_rate_limit_per_minute,
            )),
            config: Arc::new(config),
            pool,
        })
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = &config.security.cors_origins;
    if origins.is_empty() {
        // Development: any origin
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route(
            "/tenants",
            get(tenants::list_tenants).post(tenants::create_tenant),
        )
        .route(
            "/tenants/:id",
            get(tenants::get_tenant)
                .put(tenants::update_tenant)
                .delete(tenants::delete_tenant),
        )
        .route(
            "/principals",
            get(principals::list_principals).post(principals::create_principal),
        )
        .route(
            "/principals/:id",
            get(principals::get_principal)
                .put(principals::update_principal)
                .delete(principals::delete_principal),
        )
        .route(
            "/departments",
            get(organization::list_departments).post(organization::create_department),
        )
        .route(
            "/departments/:id",
            get(organization::get_department)
                .put(organization::update_department)
                .delete(organization::delete_department),
        )
        .route(
            "/areas",
            get(organization::list_areas).post(organization::create_area),
        )
        .route(
            "/areas/:id",
            get(organization::get_area)
                .put(organization::update_area)
                .delete(organization::delete_area),
        )
        .route(
            "/staff-users",
            get(staff_users::list_staff_users).post(staff_users::create_staff_user),
        )
        .route(
            "/staff-users/:id",
            get(staff_users::get_staff_user)
                .put(staff_users::update_staff_user)
                .delete(staff_users::delete_staff_user),
        )
        .route(
            "/devices",
            get(devices::list_devices).post(devices::create_device),
        )
        .route("/devices/import", post(import::import_devices))
        .route(
            "/devices/:id",
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
        .route(
            "/maintenances",
            get(maintenances::list_maintenances).post(maintenances::create_maintenance),
        )
        .route(
            "/maintenances/:id",
            get(maintenances::get_maintenance)
                .put(maintenances::update_maintenance)
                .delete(maintenances::delete_maintenance),
        )
        .route(
            "/disposals",
            get(disposals::list_disposals).post(disposals::create_disposal),
        )
        .route(
            "/disposals/:id",
            get(disposals::get_disposal)
                .put(disposals::update_disposal)
                .delete(disposals::delete_disposal),
        )
        .route(
            "/catalogs/:kind",
            get(catalogs::list_entries).post(catalogs::create_entry),
        )
        .route(
            "/catalogs/:kind/:id",
            put(catalogs::rename_entry).delete(catalogs::delete_entry),
        )
        .route("/audit-logs", get(audit_logs::list_audit_logs))
        .route("/audit-logs/export", get(audit_logs::export_audit_logs))
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .nest("/api/v1", api_routes())
        .route("/api/health", get(health::health_check))
        .route("/metrics", get(metrics_handler))
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
