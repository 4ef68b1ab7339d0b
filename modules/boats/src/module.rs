use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};
use url::Url;

use crate::api::rest::routes;
use crate::config::BoatsConfig;
use crate::contract::client::BoatsApi;
use crate::domain::ports::IdentityProvider;
use crate::domain::repo::TripsRepository;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::BoatsLocalClient;
use crate::infra::identity::HttpIdentityProvider;
use crate::infra::storage::{Migrator, SeaOrmTripsRepository};

/// Wired boats module: domain service plus its REST surface and local client.
#[derive(Clone)]
pub struct Boats {
    service: Arc<Service>,
}

impl Boats {
    pub const NAME: &'static str = "boats";

    /// Wire the SeaORM repository and HTTP identity provider from config.
    pub fn init(cfg: &BoatsConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        info!("Initializing boats module");
        debug!(
            "Loaded boats config: max_name_length={}, app_base_url={}, identity_base_url={}",
            cfg.max_name_length, cfg.app_base_url, cfg.identity_base_url
        );

        let identity_base = Url::parse(&cfg.identity_base_url)
            .with_context(|| format!("invalid identity_base_url '{}'", cfg.identity_base_url))?;
        let identity = HttpIdentityProvider::new(
            identity_base,
            cfg.identity_api_key.clone(),
            cfg.identity_timeout,
        )?;
        let repo = SeaOrmTripsRepository::new(db);

        Ok(Self::with_ports(Arc::new(repo), Arc::new(identity), cfg))
    }

    /// Wire the service over arbitrary port implementations.
    pub fn with_ports(
        repo: Arc<dyn TripsRepository>,
        identity: Arc<dyn IdentityProvider>,
        cfg: &BoatsConfig,
    ) -> Self {
        let service_config = ServiceConfig {
            max_name_length: cfg.max_name_length,
            max_description_length: cfg.max_description_length,
            app_base_url: cfg.app_base_url.clone(),
        };
        let service = Service::new(repo, identity, service_config);
        Self {
            service: Arc::new(service),
        }
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running boats database migrations");
        Migrator::up(db, None).await?;
        info!("Boats database migrations completed successfully");
        Ok(())
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering boats REST routes");
        routes::register_routes(router, self.service.clone())
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn BoatsApi> {
        Arc::new(BoatsLocalClient::new(self.service.clone()))
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }
}
