use thiserror::Error;

use crate::catalog::CatalogError;
use crate::orders::ManagerError;

/// Startup and serving errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Order store error: {0}")]
    Orders(#[from] ManagerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
