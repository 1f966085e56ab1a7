use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::snapshot::CartSnapshot;

#[derive(Error, Debug)]
pub enum CartRepositoryError {
    #[error("I/O error on {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Cart repository trait for snapshot persistence
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn load(&self) -> Result<Option<CartSnapshot>, CartRepositoryError>;
    async fn save(&self, snapshot: &CartSnapshot) -> Result<(), CartRepositoryError>;
    async fn delete(&self) -> Result<bool, CartRepositoryError>;
}

/// JSON file implementation of CartRepository
pub struct JsonFileCartRepository {
    path: PathBuf,
}

impl JsonFileCartRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CartRepositoryError {
        CartRepositoryError::IoError {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl CartRepository for JsonFileCartRepository {
    async fn load(&self) -> Result<Option<CartSnapshot>, CartRepositoryError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cart file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let snapshot: CartSnapshot = serde_json::from_str(&raw)?;
        debug!(
            "Loaded cart session {} with {} rows from {}",
            snapshot.session_id,
            snapshot.ledger.items().len(),
            self.path.display()
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &CartSnapshot) -> Result<(), CartRepositoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;

        // Write next to the target and rename so a crash never leaves half a file.
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        info!("Cart session {} saved to {}", snapshot.session_id, self.path.display());
        Ok(())
    }

    async fn delete(&self) -> Result<bool, CartRepositoryError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Keeps the snapshot in memory; used for ephemeral sessions and tests.
#[derive(Default)]
pub struct InMemoryCartRepository {
    snapshot: Mutex<Option<CartSnapshot>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn load(&self) -> Result<Option<CartSnapshot>, CartRepositoryError> {
        Ok(self.snapshot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn save(&self, snapshot: &CartSnapshot) -> Result<(), CartRepositoryError> {
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());
        Ok(())
    }

    async fn delete(&self) -> Result<bool, CartRepositoryError> {
        Ok(self
            .snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some())
    }
}
