use std::fmt;

use async_trait::async_trait;
use aws_sdk_secretsmanager::{error::DisplayErrorContext, Client};
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;

/// Cluster credentials as stored by Secrets Manager for a DocumentDB cluster.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Credentials {
    pub fn from_secret_string(secret: &str) -> Result<Self, AppError> {
        serde_json::from_str(secret)
            .map_err(|e| AppError::Retrieval(format!("malformed credential bundle: {}", e)))
    }
}

/// Fetches a credential bundle by secret id. Every call goes to the backing
/// service; callers cache the result.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    async fn resolve(&self, secret_id: &str) -> Result<Credentials, AppError>;
}

pub struct SecretsManagerResolver {
    client: Client,
}

impl SecretsManagerResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretResolver for SecretsManagerResolver {
    async fn resolve(&self, secret_id: &str) -> Result<Credentials, AppError> {
        info!(secret_id, "retrieving secret from Secrets Manager");

        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                AppError::Retrieval(format!("{}: {}", secret_id, DisplayErrorContext(e)))
            })?;

        let secret = output
            .secret_string()
            .ok_or_else(|| AppError::Retrieval(format!("{} has no SecretString", secret_id)))?;

        Credentials::from_secret_string(secret)
    }
}
