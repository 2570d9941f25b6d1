//! Floor Server - order lifecycle core for custom stock production
//!
//! # Overview
//!
//! - **Order ids** (`shared::order_id`): month-scoped, collision-free ids
//!   allocated inside the transaction that first stores the order
//! - **Pricing** (`pricing`): base model + features + misc items, one scoped discount
//! - **Workflow** (`orders`): department pipeline, kickbacks, cancel/undo, shipping
//! - **HTTP API** (`api`): thin JSON surface over the above
//!
//! # Layout
//!
//! ```text
//! floor-server/src/
//! ├── core/          # config, state, server
//! ├── catalog/       # catalog loading and indexing
//! ├── pricing/       # price & discount engine
//! ├── orders/        # workflow, redb storage, manager
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, errors, validation
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod orders;
pub mod pricing;
pub mod utils;

// Public re-exports
pub use catalog::{CatalogIndex, CatalogService};
pub use core::{Config, Server, ServerState};
pub use orders::{OrderStorage, OrdersManager};
pub use pricing::PriceEngine;
pub use utils::{AppError, AppResult};

// Unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Load `.env`, create the work directory and start logging
///
/// Must run inside the tokio runtime (file logging spawns its cleanup task).
pub fn setup_environment() -> anyhow::Result<Config> {
    // A missing .env is normal outside development
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    let log_dir = config.log_dir();
    init_logger_with_file(
        &config.log_level,
        config.log_json,
        Some(&log_dir.to_string_lossy()),
    )?;

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ________
   / ____/ /___  ____  _____
  / /_  / / __ \/ __ \/ ___/
 / __/ / / /_/ / /_/ / /
/_/   /_/\____/\____/_/
    "#
    );
}
