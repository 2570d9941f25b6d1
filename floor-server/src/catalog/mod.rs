//! Catalog - stock models, features and discounts
//!
//! The catalog is read-only to the order core. It is loaded from a JSON
//! document and published as an immutable [`CatalogIndex`] snapshot; pricing
//! clones the `Arc` and never holds the lock while computing.

mod error;
mod index;

pub use error::CatalogError;
pub use index::{
    BOTTOM_METAL, CatalogIndex, OTHER_OPTIONS, PAINT_FIELDS, RAIL_ACCESSORY, is_special_feature,
    paint_value, selected_paint,
};

use parking_lot::RwLock;
use shared::models::Catalog;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Catalog holder with hot reload
#[derive(Debug)]
pub struct CatalogService {
    current: RwLock<Arc<CatalogIndex>>,
    source: Option<PathBuf>,
}

impl CatalogService {
    /// Build from an in-memory catalog (no reload source)
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(CatalogIndex::new(catalog))),
            source: None,
        }
    }

    /// Load the catalog document at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();
        let catalog = read_catalog(&path)?;
        tracing::info!(
            path = %path.display(),
            models = catalog.stock_models.len(),
            features = catalog.features.len(),
            "Catalog loaded"
        );
        Ok(Self {
            current: RwLock::new(Arc::new(CatalogIndex::new(catalog))),
            source: Some(path),
        })
    }

    /// Load `path` if it exists, otherwise start with an empty catalog
    pub fn load_or_empty(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "Catalog file not found, starting empty");
            let mut service = Self::from_catalog(Catalog::default());
            service.source = Some(path.to_path_buf());
            Ok(service)
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<CatalogIndex> {
        self.current.read().clone()
    }

    /// Replace the snapshot
    pub fn replace(&self, catalog: Catalog) {
        *self.current.write() = Arc::new(CatalogIndex::new(catalog));
    }

    /// Re-read the source document; the old snapshot stays on failure
    pub fn reload(&self) -> Result<(), CatalogError> {
        let Some(path) = &self.source else {
            return Ok(());
        };
        let catalog = read_catalog(path)?;
        self.replace(catalog);
        tracing::info!(path = %path.display(), "Catalog reloaded");
        Ok(())
    }
}

fn read_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
