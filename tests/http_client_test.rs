mod common;

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use catalog_admin::api::client::{HttpProductApi, ProductApi};
use catalog_admin::api::error::{AppError, ErrorKind};
use catalog_admin::api::payload::SubmissionPayload;
use catalog_admin::config::ClientConfig;
use catalog_admin::services::preview::LocalFile;
use common::{PDF, PNG};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

const API_KEY: &str = "k-123";

#[derive(Default)]
struct Recorded {
    /// `key` header seen per request, tagged with the route.
    keys: Vec<(&'static str, Option<String>)>,
    /// `(field name, file name)` per multipart part, in arrival order.
    parts: Vec<(String, Option<String>)>,
    deleted: Vec<String>,
}

type Shared = Arc<Mutex<Recorded>>;

fn key_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get("key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn product_json() -> Value {
    json!({
        "id": "p1",
        "name": "Caixa Parda",
        "description": "Caixa de papelão",
        "category": { "id": "c1", "name": "Caixas" },
        "type": { "id": "t1", "name": "Corrugado" },
        "size": { "id": "s1", "value": "30x20" },
        "gallery": ["https://cdn.example.com/1.png"],
        "manualUrl": "https://cdn.example.com/manual.pdf"
    })
}

async fn list_products(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    state.lock().unwrap().keys.push(("list", key_of(&headers)));
    Json(json!([product_json()]))
}

async fn get_product(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let key = key_of(&headers);
    state.lock().unwrap().keys.push(("get", key.clone()));
    if key.as_deref() != Some(API_KEY) {
        return (StatusCode::UNAUTHORIZED, "missing key").into_response();
    }
    if id != "p1" {
        return (StatusCode::NOT_FOUND, "no such product").into_response();
    }
    Json(product_json()).into_response()
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> StatusCode {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let _ = field.bytes().await.unwrap();
        parts.push((name, file_name));
    }

    let mut recorded = state.lock().unwrap();
    recorded.keys.push(("create", key_of(&headers)));
    recorded.parts = parts;
    StatusCode::CREATED
}

async fn delete_product(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> StatusCode {
    let mut recorded = state.lock().unwrap();
    recorded.keys.push(("delete", key_of(&headers)));
    recorded.deleted.push(id);
    StatusCode::NO_CONTENT
}

async fn list_categories() -> Json<Value> {
    Json(json!([{ "id": "c1", "name": "Caixas" }]))
}

async fn list_sizes() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "db down").into_response()
}

async fn spawn_server(state: Shared) -> String {
    let app = Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/:id", get(get_product).delete(delete_product))
        .route("/api/categories", get(list_categories))
        .route("/api/sizes", get(list_sizes))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn client(base: &str, key: Option<&str>) -> HttpProductApi {
    let config = ClientConfig {
        api_key: key.map(str::to_string),
        ..ClientConfig::for_base_url(base)
    };
    HttpProductApi::new(&config).unwrap()
}

#[tokio::test]
async fn test_list_parses_products_without_sending_key() {
    let state = Shared::default();
    let base = spawn_server(state.clone()).await;
    let api = client(&base, Some(API_KEY));

    let products = api.list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    let product = &products[0];
    assert_eq!(product.id.as_deref(), Some("p1"));
    assert_eq!(product.type_label(), "Corrugado");
    assert_eq!(product.size_label(), "30x20");
    assert_eq!(product.effective_category_id().as_deref(), Some("c1"));
    assert_eq!(product.gallery.len(), 1);
    assert!(product.manual_url.is_some());

    let recorded = state.lock().unwrap();
    assert_eq!(recorded.keys, vec![("list", None)]);
}

#[tokio::test]
async fn test_get_product_sends_key() {
    let state = Shared::default();
    let base = spawn_server(state.clone()).await;

    let product = client(&base, Some(API_KEY)).get_product("p1").await.unwrap();
    assert_eq!(product.name, "Caixa Parda");

    let err = client(&base, None).get_product("p1").await.unwrap_err();
    assert!(matches!(err, AppError::Api { status: 401, .. }));

    let err = client(&base, Some(API_KEY))
        .get_product("nope")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_create_sends_multipart_with_repeated_gallery_parts() {
    let state = Shared::default();
    let base = spawn_server(state.clone()).await;
    let api = client(&base, Some(API_KEY));

    let mut payload = SubmissionPayload::new();
    payload.push_text("name", "Caixa Parda");
    payload.push_text("description", "Caixa de papelão");
    payload.push_text("categoryId", "c1");
    payload.push_file("gallery", LocalFile::new("a.png", PNG).unwrap());
    payload.push_file("gallery", LocalFile::new("b.png", PNG).unwrap());
    payload.push_file("manual", LocalFile::new("manual.pdf", PDF).unwrap());

    api.create_product(payload).await.unwrap();

    let recorded = state.lock().unwrap();
    assert_eq!(recorded.keys, vec![("create", Some(API_KEY.to_string()))]);
    let parts: Vec<(&str, Option<&str>)> = recorded
        .parts
        .iter()
        .map(|(name, file)| (name.as_str(), file.as_deref()))
        .collect();
    assert_eq!(
        parts,
        vec![
            ("name", None),
            ("description", None),
            ("categoryId", None),
            ("gallery", Some("a.png")),
            ("gallery", Some("b.png")),
            ("manual", Some("manual.pdf")),
        ]
    );
}

#[tokio::test]
async fn test_delete_targets_product_path() {
    let state = Shared::default();
    let base = spawn_server(state.clone()).await;

    client(&base, Some(API_KEY))
        .delete_product("p1")
        .await
        .unwrap();

    let recorded = state.lock().unwrap();
    assert_eq!(recorded.deleted, vec!["p1".to_string()]);
    assert_eq!(recorded.keys, vec![("delete", Some(API_KEY.to_string()))]);
}

#[tokio::test]
async fn test_reference_lists_and_server_errors() {
    let state = Shared::default();
    let base = spawn_server(state).await;
    let api = client(&base, Some(API_KEY));

    let categories = api.list_categories().await.unwrap();
    assert_eq!(categories[0].name, "Caixas");

    let err = api.list_sizes().await.unwrap_err();
    assert!(matches!(err, AppError::Api { status: 500, .. }));
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}/api", addr), None)
        .list_products()
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Network(_)));
    assert_eq!(err.kind(), ErrorKind::Network);
}
