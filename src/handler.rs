use lambda_http::{request::RequestContext, Body, Error, Request, RequestExt, Response};
use mongodb::bson::{doc, oid::ObjectId, Bson};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::connection::ConnectionProvider;
use crate::db::DocumentDb;
use crate::error::AppError;

const RESOURCE: &str = "test";
const OBJECT_ID_PARAM: &str = "objectid";

struct Reply {
    status: u16,
    body: Value,
}

impl Reply {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            body: json!({ "message": "Not found" }),
        }
    }

    // Only client errors echo the cause; server errors stay generic.
    fn from_error(err: &AppError) -> Self {
        let status = err.status_code();
        let message = if status < 500 {
            err.to_string()
        } else {
            "Internal server error".to_string()
        };
        Self {
            status,
            body: json!({ "message": message }),
        }
    }

    fn into_response(self) -> Result<Response<Body>, Error> {
        Ok(Response::builder()
            .status(self.status)
            .header("content-type", "application/json")
            .header("access-control-allow-origin", "*")
            .body(Body::Text(self.body.to_string()))?)
    }
}

/// Inserts the sample document and returns its generated id.
pub(crate) async fn insert_document<D>(db: &D, config: &Config) -> Result<ObjectId, AppError>
where
    D: DocumentDb + ?Sized,
{
    let document = doc! { "name": "Amazon DocumentDB", "port": 27017 };
    let id = db
        .insert_one(&config.database, &config.collection, document)
        .await?;

    info!(inserted_id = %id, "inserted document");
    Ok(id)
}

/// Looks up a document by its hex object id. A missing document is `Value::Null`.
pub(crate) async fn find_document<D>(
    db: &D,
    config: &Config,
    object_id: &str,
) -> Result<Value, AppError>
where
    D: DocumentDb + ?Sized,
{
    let id = ObjectId::parse_str(object_id)
        .map_err(|e| AppError::Validation(format!("{}: {}", object_id, e)))?;

    let document = db
        .find_by_id(&config.database, &config.collection, id)
        .await?;
    let value = match document {
        Some(document) => Bson::Document(document).into_relaxed_extjson(),
        None => Value::Null,
    };

    info!(document = %value, "retrieved document");
    Ok(value)
}

// Path as the client sent it. For REST APIs the URI also carries the stage
// name, e.g. `/prod/test`; the raw path does not.
fn request_path(event: &Request) -> &str {
    match event.raw_http_path() {
        "" => event.uri().path(),
        raw => raw,
    }
}

fn resource_path(event: &Request) -> Option<&str> {
    match event.request_context_ref()? {
        RequestContext::ApiGatewayV1(ctx) => ctx.resource_path.as_deref(),
        _ => None,
    }
}

async fn route<P>(connections: &P, config: &Config, event: &Request) -> Result<Reply, AppError>
where
    P: ConnectionProvider,
{
    let db = connections.get_connection().await?;

    let segments: Vec<&str> = request_path(event).trim_matches('/').split('/').collect();
    match (event.method().as_str(), segments.as_slice()) {
        ("POST", [resource]) if *resource == RESOURCE => {
            let id = insert_document(db.as_ref(), config).await?;
            Ok(Reply::ok(Value::String(id.to_hex())))
        }
        ("GET", [resource, segment]) if *resource == RESOURCE => {
            let params = event.path_parameters();
            let object_id = params.first(OBJECT_ID_PARAM).unwrap_or(*segment);
            let document = find_document(db.as_ref(), config, object_id).await?;
            Ok(Reply::ok(document))
        }
        _ => Ok(Reply::not_found()),
    }
}

pub(crate) async fn function_handler<P>(
    connections: &P,
    config: &Config,
    event: Request,
) -> Result<Response<Body>, Error>
where
    P: ConnectionProvider,
{
    let method = event.method().as_str();
    let path = request_path(&event);
    let request_id = event
        .lambda_context_ref()
        .map(|ctx| ctx.request_id.as_str())
        .unwrap_or_default();
    debug!(
        request_id,
        method,
        path,
        resource = resource_path(&event).unwrap_or_default(),
        path_parameters = ?event.path_parameters(),
        query = ?event.query_string_parameters(),
        body = ?event.body(),
        "received request"
    );

    let reply = match route(connections, config, &event).await {
        Ok(reply) => reply,
        Err(err) => {
            error!(request_id, method, path, error = %err, "request failed");
            Reply::from_error(&err)
        }
    };

    reply.into_response()
}
