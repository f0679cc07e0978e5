//! In-memory PI Web API.
//!
//! Serves the subset of PI Web API the client covers, under `/piwebapi`,
//! backed by a seeded `Store`. Responses honour `selectedFields`; errors use
//! the PI bodies (`{"Errors": [...]}` or a `PIPropertyError` list).

pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub use store::{Kind, Store, StoreError};

pub type Db = Arc<RwLock<Store>>;

const API_ROOT: &str = "/piwebapi";

#[derive(Debug, Default, Deserialize)]
pub struct Params {
    pub path: Option<String>,
    #[serde(rename = "selectedFields", alias = "selectedfields")]
    pub selected_fields: Option<String>,
}

/// Router over a freshly seeded store.
pub fn app() -> Router {
    app_with_store(Store::seeded())
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route(API_ROOT, get(landing))
        .route("/piwebapi/{collection}", get(get_collection))
        .route(
            "/piwebapi/{collection}/{web_id}",
            get(get_resource).patch(update_resource).delete(delete_resource),
        )
        .route(
            "/piwebapi/{collection}/{web_id}/{segment}",
            get(get_nested).post(post_nested),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock PI Web API listening");
    }
    axum::serve(listener, app()).await
}

/// Error response in PI Web API shape.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    body: Value,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "Errors": [message.into()] }),
        }
    }
}

impl From<StoreError> for ApiFailure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiFailure::new(StatusCode::NOT_FOUND, msg),
            StoreError::BadRequest(msg) => ApiFailure::new(StatusCode::BAD_REQUEST, msg),
            StoreError::Conflict(msg) => ApiFailure::new(StatusCode::CONFLICT, msg),
            StoreError::InvalidFields(fields) => ApiFailure {
                status: StatusCode::BAD_REQUEST,
                body: Value::Array(
                    fields
                        .into_iter()
                        .map(|(field, message)| json!({ "Field": field, "Message": [message] }))
                        .collect(),
                ),
            },
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        debug!(status = %self.status, body = %self.body, "rejecting request");
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult = Result<Response, ApiFailure>;

/// Absolute API root as seen by the caller, for `Links` and `Location`.
fn base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}{API_ROOT}")
}

fn kind_of(collection: &str) -> Result<Kind, ApiFailure> {
    Kind::from_collection(collection)
        .ok_or_else(|| ApiFailure::new(StatusCode::NOT_FOUND, format!("Unknown collection '{collection}'.")))
}

fn respond(value: Value, params: &Params) -> Response {
    let value = match params.selected_fields.as_deref() {
        Some(selected) => select_fields(&value, selected),
        None => value,
    };
    Json(value).into_response()
}

/// Applies a `selectedFields` expression (`WebId;Links.Self;Items.Name`).
/// Names compare case-insensitively; arrays apply the selection per element.
pub fn select_fields(value: &Value, selected: &str) -> Value {
    let paths: Vec<Vec<&str>> = selected
        .split(';')
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(|path| path.split('.').collect())
        .collect();
    if paths.is_empty() {
        return value.clone();
    }
    project(value, &paths)
}

fn project(value: &Value, paths: &[Vec<&str>]) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                let matching: Vec<&Vec<&str>> = paths
                    .iter()
                    .filter(|path| path.first().is_some_and(|head| head.eq_ignore_ascii_case(key)))
                    .collect();
                if matching.is_empty() {
                    continue;
                }
                if matching.iter().any(|path| path.len() == 1) {
                    out.insert(key.clone(), child.clone());
                } else {
                    let rest: Vec<Vec<&str>> = matching.iter().map(|path| path[1..].to_vec()).collect();
                    out.insert(key.clone(), project(child, &rest));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|item| project(item, paths)).collect()),
        other => other.clone(),
    }
}

async fn landing(headers: HeaderMap, Query(params): Query<Params>) -> Response {
    let base = base_url(&headers);
    let body = json!({
        "Links": {
            "Self": base,
            "AssetServers": format!("{base}/assetservers"),
            "DataServers": format!("{base}/dataservers"),
            "System": format!("{base}/system"),
        }
    });
    respond(body, &params)
}

/// `GET /{collection}?path=...` looks up by path; root collections list
/// without a path.
async fn get_collection(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(collection): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult {
    let kind = kind_of(&collection)?;
    let base = base_url(&headers);
    let store = db.read().await;
    let body = match params.path.as_deref() {
        Some(path) => store.get_by_path(&base, kind, path)?,
        None if kind.is_root() => store.list_roots(&base, kind),
        None => {
            return Err(ApiFailure::new(
                StatusCode::BAD_REQUEST,
                "The 'path' parameter is required.",
            ))
        }
    };
    Ok(respond(body, &params))
}

async fn get_resource(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((collection, web_id)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> ApiResult {
    let kind = kind_of(&collection)?;
    let body = db.read().await.get(&base_url(&headers), kind, &web_id)?;
    Ok(respond(body, &params))
}

async fn update_resource(
    State(db): State<Db>,
    Path((collection, web_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult {
    let kind = kind_of(&collection)?;
    db.write().await.update(kind, &web_id, body)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn delete_resource(
    State(db): State<Db>,
    Path((collection, web_id)): Path<(String, String)>,
) -> ApiResult {
    let kind = kind_of(&collection)?;
    db.write().await.delete(kind, &web_id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// `streams/{webId}/value` or a child collection listing.
async fn get_nested(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((collection, web_id, segment)): Path<(String, String, String)>,
    Query(params): Query<Params>,
) -> ApiResult {
    let store = db.read().await;
    let body = if is_stream_value(&collection, &segment) {
        store.get_value(&web_id)?
    } else {
        let kind = kind_of(&collection)?;
        store.list_children(&base_url(&headers), kind, &web_id, &segment)?
    };
    Ok(respond(body, &params))
}

async fn post_nested(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((collection, web_id, segment)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> ApiResult {
    let mut store = db.write().await;
    if is_stream_value(&collection, &segment) {
        store.update_value(&web_id, body)?;
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let kind = kind_of(&collection)?;
    let (child, child_kind) = store.create_child(kind, &web_id, &segment, body)?;
    let location = format!("{}/{}/{child}", base_url(&headers), child_kind.collection());
    debug!(%location, "created");
    let mut response = StatusCode::CREATED.into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

fn is_stream_value(collection: &str, segment: &str) -> bool {
    collection.eq_ignore_ascii_case("streams") && segment.eq_ignore_ascii_case("value")
}
