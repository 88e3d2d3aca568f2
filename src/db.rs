use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{ClientOptions, Credential},
    Client,
};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::secrets::Credentials;

/// The driver calls the handlers need from a connection handle.
#[async_trait]
pub trait DocumentDb: Send + Sync {
    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> Result<ObjectId, AppError>;

    async fn find_by_id(
        &self,
        database: &str,
        collection: &str,
        id: ObjectId,
    ) -> Result<Option<Document>, AppError>;
}

#[async_trait]
impl DocumentDb for Client {
    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> Result<ObjectId, AppError> {
        let result = self
            .database(database)
            .collection::<Document>(collection)
            .insert_one(document)
            .await?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::Database(format!("unexpected inserted id {}", result.inserted_id))
        })
    }

    async fn find_by_id(
        &self,
        database: &str,
        collection: &str,
        id: ObjectId,
    ) -> Result<Option<Document>, AppError> {
        Ok(self
            .database(database)
            .collection::<Document>(collection)
            .find_one(doc! { "_id": id })
            .await?)
    }
}

const CLUSTER_OPTIONS: &str = "readPreference=secondaryPreferred&retryWrites=false";

/// Opens a new connection handle from a credential bundle.
#[async_trait]
pub trait Connector: Send + Sync {
    type Handle: DocumentDb;

    async fn connect(&self, credentials: &Credentials) -> Result<Self::Handle, AppError>;
}

/// Connects to a DocumentDB cluster over TLS, reading from secondaries when
/// available. DocumentDB does not support retryable writes, so they are off.
pub struct DocDbConnector {
    ca_file: String,
    replica_set: String,
}

impl DocDbConnector {
    pub fn new(config: &Config) -> Self {
        Self {
            ca_file: config.ca_file.clone(),
            replica_set: config.replica_set.clone(),
        }
    }

    fn connection_uri(&self, credentials: &Credentials) -> String {
        format!(
            "mongodb://{}:{}/?tls=true&tlsCAFile={}&replicaSet={}&{}",
            credentials.host, credentials.port, self.ca_file, self.replica_set, CLUSTER_OPTIONS
        )
    }
}

#[async_trait]
impl Connector for DocDbConnector {
    type Handle = Client;

    async fn connect(&self, credentials: &Credentials) -> Result<Client, AppError> {
        let mut options = ClientOptions::parse(self.connection_uri(credentials))
            .await
            .map_err(|e| AppError::Connection(format!("invalid connection options: {}", e)))?;
        options.credential = Some(
            Credential::builder()
                .username(credentials.username.clone())
                .password(credentials.password.clone())
                .build(),
        );

        let client = Client::with_options(options)
            .map_err(|e| AppError::Connection(e.to_string()))?;

        // The driver connects lazily; ping so bad hosts, certificates and
        // credentials fail here rather than inside a handler.
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;

        info!(host = %credentials.host, port = credentials.port, "created new DocumentDB client");
        Ok(client)
    }
}
