use std::env;

use crate::error::AppError;

const DEFAULT_CA_FILE: &str = "/opt/global-bundle.pem";
const DEFAULT_REPLICA_SET: &str = "rs0";

/// Settings read once at cold start and shared by every invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets Manager id (name or ARN) of the cluster credentials.
    pub secret_name: String,
    pub database: String,
    pub collection: String,
    /// CA bundle used to verify the cluster's TLS certificate.
    pub ca_file: String,
    pub replica_set: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::Configuration(format!("{} not set", key)))
        };
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            secret_name: required("CLUSTERSM")?,
            database: required("DOCDB_DATABASE")?,
            collection: required("DOCDB_COLLECTION")?,
            ca_file: optional("DOCDB_CA_FILE", DEFAULT_CA_FILE),
            replica_set: optional("DOCDB_REPLICA_SET", DEFAULT_REPLICA_SET),
        })
    }
}
