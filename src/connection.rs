use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::db::{Connector, DocumentDb};
use crate::error::AppError;
use crate::secrets::SecretResolver;

/// Hands out the connection shared by every invocation of a warm process.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    type Handle: DocumentDb;

    async fn get_connection(&self) -> Result<Arc<Self::Handle>, AppError>;
}

/// Resolves credentials and connects on first use, then reuses the handle.
/// A failed attempt leaves the slot empty so the next call starts over.
pub struct CachedConnection<R, C: Connector> {
    secret_id: String,
    resolver: R,
    connector: C,
    slot: OnceCell<Arc<C::Handle>>,
}

impl<R, C> CachedConnection<R, C>
where
    R: SecretResolver,
    C: Connector,
{
    pub fn new(secret_id: impl Into<String>, resolver: R, connector: C) -> Self {
        Self {
            secret_id: secret_id.into(),
            resolver,
            connector,
            slot: OnceCell::new(),
        }
    }

    async fn open(&self) -> Result<Arc<C::Handle>, AppError> {
        info!("no cached connection, creating one");

        let credentials = self
            .resolver
            .resolve(&self.secret_id)
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;
        let handle = self.connector.connect(&credentials).await?;

        Ok(Arc::new(handle))
    }
}

#[async_trait]
impl<R, C> ConnectionProvider for CachedConnection<R, C>
where
    R: SecretResolver,
    C: Connector,
{
    type Handle = C::Handle;

    async fn get_connection(&self) -> Result<Arc<C::Handle>, AppError> {
        self.slot
            .get_or_try_init(|| self.open())
            .await
            .map(Arc::clone)
            .map_err(|e| {
                error!(error = %e, "could not establish database connection");
                e
            })
    }
}
