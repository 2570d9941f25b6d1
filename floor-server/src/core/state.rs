use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::core::{Config, Result};
use crate::orders::OrdersManager;
use crate::pricing::PriceEngine;

/// Server state - shared handles for every request
///
/// Cloning is cheap; all services sit behind `Arc`.
///
/// | Field | Type | Purpose |
/// |-------|------|---------|
/// | config | Config | Configuration (immutable) |
/// | catalog | Arc<CatalogService> | Catalog snapshots for pricing and validation |
/// | orders | Arc<OrdersManager> | Order lifecycle over redb |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub catalog: Arc<CatalogService>,
    pub orders: Arc<OrdersManager>,
}

impl ServerState {
    pub fn new(config: Config, catalog: Arc<CatalogService>, orders: Arc<OrdersManager>) -> Self {
        Self {
            config,
            catalog,
            orders,
        }
    }

    /// Open the catalog and the order store under the work directory
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let catalog = Arc::new(CatalogService::load_or_empty(config.catalog_path())?);
        let orders = Arc::new(OrdersManager::new(
            config.database_path(),
            catalog.clone(),
            config.event_channel_capacity,
        )?);

        tracing::info!(
            work_dir = %config.work_dir,
            database = %config.database_path().display(),
            "Server state initialized"
        );
        Ok(Self::new(config.clone(), catalog, orders))
    }

    /// Price engine over the current catalog snapshot
    pub fn price_engine(&self) -> PriceEngine {
        PriceEngine::new(self.catalog.snapshot())
    }
}
