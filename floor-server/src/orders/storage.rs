//! redb-based storage for orders and kickbacks
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` (JSON) | Order records |
//! | `kickbacks` | `kickback_id` | `Kickback` (JSON) | Kickback audit log (append-only) |
//! | `order_kickbacks` | `(order_id, kickback_id)` | `()` | Kickbacks per order |
//! | `order_id_sequence` | `"last_order_id"` | last issued id | Identifier allocation |
//!
//! # Identifier allocation
//!
//! redb admits one write transaction at a time. The last issued id is read,
//! advanced and written back inside the same transaction that inserts the
//! new order, so two first saves can never observe the same last id.

use chrono::Datelike;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{Kickback, Order};
use shared::order_id::next_order_id;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Kickbacks: key = kickback id, value = JSON-serialized Kickback
const KICKBACKS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("kickbacks");

/// Kickback index by order: key = (order_id, kickback id)
const ORDER_KICKBACKS_TABLE: TableDefinition<(&str, i64), ()> =
    TableDefinition::new("order_kickbacks");

/// Sequence state: key = "last_order_id", value = last issued order id
const SEQUENCE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("order_id_sequence");

const LAST_ORDER_ID_KEY: &str = "last_order_id";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Kickback not found: {0}")]
    KickbackNotFound(i64),

    #[error("Kickback id already taken: {0}")]
    DuplicateKickback(i64),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Open or create the database at the given path
    ///
    /// Commits are durable as soon as `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(KICKBACKS_TABLE)?;
            let _ = write_txn.open_table(ORDER_KICKBACKS_TABLE)?;
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Identifier Allocation ==========

    /// Allocate the next order id (within transaction)
    ///
    /// Skips ids already present in the orders table, which can only happen
    /// when the sequence state was lost or rewound.
    pub fn allocate_order_id(
        &self,
        txn: &WriteTransaction,
        now: &impl Datelike,
    ) -> StorageResult<String> {
        let mut seq_table = txn.open_table(SEQUENCE_TABLE)?;
        let orders = txn.open_table(ORDERS_TABLE)?;

        let last = seq_table
            .get(LAST_ORDER_ID_KEY)?
            .map(|guard| guard.value().to_string())
            .unwrap_or_default();

        let mut candidate = next_order_id(now, &last);
        while orders.get(candidate.as_str())?.is_some() {
            tracing::warn!(order_id = %candidate, "Allocated order id already exists, skipping");
            candidate = next_order_id(now, &candidate);
        }

        seq_table.insert(LAST_ORDER_ID_KEY, candidate.as_str())?;
        Ok(candidate)
    }

    /// Last issued order id (read-only)
    pub fn last_order_id(&self) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(LAST_ORDER_ID_KEY)?
            .map(|guard| guard.value().to_string()))
    }

    // ========== Order Operations ==========

    /// Store an order (within transaction)
    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Remove an order (within transaction); returns whether it existed
    ///
    /// The id sequence is untouched, so a removed id is never issued again.
    pub fn delete_order(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<bool> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let removed = table.remove(order_id)?.is_some();
        Ok(removed)
    }

    /// Get an order by id
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by id (within transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get all orders
    pub fn get_all_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    // ========== Kickback Operations ==========

    /// Whether a kickback id is taken (within transaction)
    pub fn kickback_exists(&self, txn: &WriteTransaction, kickback_id: i64) -> StorageResult<bool> {
        let table = txn.open_table(KICKBACKS_TABLE)?;
        Ok(table.get(kickback_id)?.is_some())
    }

    /// Append a new kickback and index it under its order (within transaction)
    ///
    /// The log is append-only: an id that is already taken is rejected and
    /// the stored record is left untouched.
    pub fn insert_kickback(
        &self,
        txn: &WriteTransaction,
        kickback: &Kickback,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(KICKBACKS_TABLE)?;
        if table.get(kickback.id)?.is_some() {
            return Err(StorageError::DuplicateKickback(kickback.id));
        }
        let value = serde_json::to_vec(kickback)?;
        table.insert(kickback.id, value.as_slice())?;

        let mut index = txn.open_table(ORDER_KICKBACKS_TABLE)?;
        index.insert((kickback.order_id.as_str(), kickback.id), ())?;
        Ok(())
    }

    /// Replace an existing kickback record (within transaction)
    pub fn update_kickback(&self, txn: &WriteTransaction, kickback: &Kickback) -> StorageResult<()> {
        let mut table = txn.open_table(KICKBACKS_TABLE)?;
        let value = serde_json::to_vec(kickback)?;
        if table.insert(kickback.id, value.as_slice())?.is_none() {
            return Err(StorageError::KickbackNotFound(kickback.id));
        }
        Ok(())
    }

    /// Get a kickback by id (within transaction)
    pub fn get_kickback_txn(
        &self,
        txn: &WriteTransaction,
        kickback_id: i64,
    ) -> StorageResult<Option<Kickback>> {
        let table = txn.open_table(KICKBACKS_TABLE)?;
        match table.get(kickback_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get all kickbacks for an order, oldest first
    pub fn get_kickbacks_for_order(&self, order_id: &str) -> StorageResult<Vec<Kickback>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ORDER_KICKBACKS_TABLE)?;
        let table = read_txn.open_table(KICKBACKS_TABLE)?;

        let mut kickbacks = Vec::new();
        for result in index.range((order_id, i64::MIN)..=(order_id, i64::MAX))? {
            let (key, _value) = result?;
            let (_, kickback_id) = key.value();
            if let Some(value) = table.get(kickback_id)? {
                kickbacks.push(serde_json::from_slice::<Kickback>(value.value())?);
            }
        }

        kickbacks.sort_by_key(|k| (k.created_at, k.id));
        Ok(kickbacks)
    }

    /// Get all kickbacks, oldest first
    pub fn get_all_kickbacks(&self) -> StorageResult<Vec<Kickback>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KICKBACKS_TABLE)?;

        let mut kickbacks = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            kickbacks.push(serde_json::from_slice::<Kickback>(value.value())?);
        }

        kickbacks.sort_by_key(|k| (k.created_at, k.id));
        Ok(kickbacks)
    }
}
