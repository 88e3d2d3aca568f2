use lambda_http::{run, service_fn, tracing, Error};
mod config;
mod connection;
mod db;
mod error;
mod handler;
mod secrets;
use config::Config;
use connection::CachedConnection;
use db::DocDbConnector;
use handler::function_handler;
use secrets::SecretsManagerResolver;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Built once at cold start; the database connection itself is opened by
    // the first invocation and reused while the container stays warm.
    let config = Config::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let resolver = SecretsManagerResolver::new(aws_sdk_secretsmanager::Client::new(&aws_config));
    let connections = CachedConnection::new(
        config.secret_name.clone(),
        resolver,
        DocDbConnector::new(&config),
    );

    run(service_fn(|event| {
        function_handler(&connections, &config, event)
    }))
    .await
}
