//! Storage implementations.

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::sync::Arc;

use tracing::info;

use crate::config::StorageConfig;
use crate::interfaces::{KitchenStore, LoyaltyStore, MenuStore, OrderStore, StockStore};

/// Storage initialization error.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("unknown storage type: {0}")]
    UnknownType(String),

    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[cfg(feature = "sqlite")]
async fn sqlite_pool(config: &StorageConfig) -> Result<sqlx::SqlitePool, InitError> {
    if let Some(parent) = std::path::Path::new(&config.path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.path)).await?;
    Ok(pool)
}

/// Initialize the stock store for the inventory service.
pub async fn init_stock_store(config: &StorageConfig) -> Result<Arc<dyn StockStore>, InitError> {
    info!(storage = %config.storage_type, "Initializing stock store");
    match config.storage_type.as_str() {
        "memory" => Ok(Arc::new(memory::MemoryStockStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let store = sqlite::SqliteStockStore::new(sqlite_pool(config).await?);
            store.init().await?;
            Ok(Arc::new(store))
        }
        other => Err(InitError::UnknownType(other.to_string())),
    }
}

/// Initialize the kitchen store for the kitchen service.
pub async fn init_kitchen_store(
    config: &StorageConfig,
) -> Result<Arc<dyn KitchenStore>, InitError> {
    info!(storage = %config.storage_type, "Initializing kitchen store");
    match config.storage_type.as_str() {
        "memory" => Ok(Arc::new(memory::MemoryKitchenStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let store = sqlite::SqliteKitchenStore::new(sqlite_pool(config).await?);
            store.init().await?;
            Ok(Arc::new(store))
        }
        other => Err(InitError::UnknownType(other.to_string())),
    }
}

/// Initialize the loyalty store for the loyalty service.
pub async fn init_loyalty_store(
    config: &StorageConfig,
) -> Result<Arc<dyn LoyaltyStore>, InitError> {
    info!(storage = %config.storage_type, "Initializing loyalty store");
    match config.storage_type.as_str() {
        "memory" => Ok(Arc::new(memory::MemoryLoyaltyStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let store = sqlite::SqliteLoyaltyStore::new(sqlite_pool(config).await?);
            store.init().await?;
            Ok(Arc::new(store))
        }
        other => Err(InitError::UnknownType(other.to_string())),
    }
}

/// Initialize order and menu stores for the order service. Both live in
/// the order service's database.
pub async fn init_order_stores(
    config: &StorageConfig,
) -> Result<(Arc<dyn OrderStore>, Arc<dyn MenuStore>), InitError> {
    info!(storage = %config.storage_type, "Initializing order stores");
    match config.storage_type.as_str() {
        "memory" => Ok((
            Arc::new(memory::MemoryOrderStore::new()),
            Arc::new(memory::MemoryMenuStore::new()),
        )),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let pool = sqlite_pool(config).await?;
            let orders = sqlite::SqliteOrderStore::new(pool.clone());
            orders.init().await?;
            let menus = sqlite::SqliteMenuStore::new(pool);
            menus.init().await?;
            Ok((Arc::new(orders), Arc::new(menus)))
        }
        other => Err(InitError::UnknownType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_storage_type_rejected() {
        let config = StorageConfig {
            storage_type: "etcd".to_string(),
            path: String::new(),
        };
        let err = init_stock_store(&config).await.unwrap_err();
        assert!(matches!(err, InitError::UnknownType(_)));
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_sqlite_store_initializes_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            storage_type: "sqlite".to_string(),
            path: dir
                .path()
                .join("inventory/warung.db")
                .to_string_lossy()
                .into_owned(),
        };
        let store = init_stock_store(&config).await.unwrap();
        assert!(store.ingredient("ING-MISSING").await.unwrap().is_none());
    }
}
