use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::services::{DeviceRegistry, HostReconciler, StatusSource, UserService};
use domain::store::{
    DeviceStore, HistoryStore, InMemoryDeviceStore, InMemoryHistoryStore, InMemoryUserStore,
    UserStore,
};
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_admin, trace_id};
use crate::routes::{
    alerts, auth, device_status, devices_config, health, hosts, proxy_history, users,
};
use crate::services::{AlertFeed, SnapshotHub};

/// Storage backends behind the domain traits.
#[derive(Clone)]
pub struct Stores {
    pub devices: Arc<dyn DeviceStore>,
    pub history: Arc<dyn HistoryStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            devices: Arc::new(InMemoryDeviceStore::new()),
            history: Arc::new(InMemoryHistoryStore::new()),
            users: Arc::new(InMemoryUserStore::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: DeviceRegistry,
    pub users: UserService,
    pub reconciler: HostReconciler,
    pub history: Arc<dyn HistoryStore>,
    pub status_source: Arc<dyn StatusSource>,
    pub jwt: JwtConfig,
    pub alerts: Arc<AlertFeed>,
    pub snapshots: Arc<SnapshotHub>,
}

impl AppState {
    pub fn new(
        config: Config,
        stores: Stores,
        status_source: Arc<dyn StatusSource>,
    ) -> Result<Self, JwtError> {
        let jwt = JwtConfig::new(&config.auth.jwt_secret, config.auth.token_expiry_secs)?;

        Ok(Self {
            registry: DeviceRegistry::new(stores.devices),
            users: UserService::new(stores.users),
            reconciler: HostReconciler::new(
                Arc::clone(&status_source),
                config.monitor.warning_threshold_ms,
            ),
            history: stores.history,
            status_source,
            jwt,
            alerts: Arc::new(AlertFeed::new(config.monitor.alert_feed_capacity)),
            snapshots: Arc::new(SnapshotHub::new()),
            config: Arc::new(config),
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    // Dashboard reads
    let public_routes = Router::new()
        .route("/api/hosts", get(hosts::get_hosts))
        .route("/api/devices-config", get(devices_config::list_devices))
        .route(
            "/api/device-status/:id",
            get(device_status::get_device_status),
        )
        .route(
            "/api/proxy-status-history",
            get(proxy_history::proxy_status_history),
        )
        .route("/api/alerts", get(alerts::list_alerts))
        .route("/api/auth/login", post(auth::login))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Registry and account mutations; reorder is registered before /:id
    let admin_routes = Router::new()
        .route("/api/devices-config", post(devices_config::create_device))
        .route(
            "/api/devices-config/reorder",
            put(devices_config::reorder_devices),
        )
        .route(
            "/api/devices-config/:id",
            put(devices_config::update_device).delete(devices_config::delete_device),
        )
        .route(
            "/api/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/api/users/:id",
            put(users::update_user).delete(users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
