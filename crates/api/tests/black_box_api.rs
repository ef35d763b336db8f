use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::StatusCode;
use serde_json::{Value, json};

use catalog_api::app::{AppServices, build_app};
use catalog_infra::{CatalogConfig, InMemoryProductStore, ProductStore, StoreError};
use catalog_products::ProductPage;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(services: AppServices) -> Self {
        catalog_observability::tracing::init_for_tests();

        // Same router as prod, bound to an ephemeral port.
        let app = build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn spawn_default() -> Self {
        Self::spawn(AppServices::from_config(&default_config()).unwrap()).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = reqwest::get(format!("{}{}", self.base_url, path)).await.unwrap();
        let status = res.status();
        let body = res.json().await.unwrap_or(Value::Null);
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn default_config() -> CatalogConfig {
    CatalogConfig::from_lookup(|_| None).unwrap()
}

/// Seeded store that counts fetches and can be switched to failing.
#[derive(Debug)]
struct ObservedStore {
    inner: InMemoryProductStore,
    calls: AtomicUsize,
    down: bool,
}

impl ObservedStore {
    fn new(down: bool) -> Self {
        Self {
            inner: InMemoryProductStore::seeded(),
            calls: AtomicUsize::new(0),
            down,
        }
    }
}

#[async_trait::async_trait]
impl ProductStore for ObservedStore {
    async fn fetch(
        &self,
        page_start: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<ProductPage, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(StoreError::unavailable("connection reset by peer"));
        }
        self.inner.fetch(page_start, page_size).await
    }
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn_default().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn first_page_in_euros() {
    let srv = TestServer::spawn_default().await;

    let (status, body) = srv.get("/products?pageStart=0&pageSize=2&currency=EUR").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "items": [
                {"name": "Sausage Roll", "price": "1.11", "currency": "EUR"},
                {"name": "Vegan Sausage Roll", "price": "1.22", "currency": "EUR"},
            ],
            "totalCount": 8,
            "pageStart": 0,
            "pageSize": 2,
        })
    );
}

#[tokio::test]
async fn gbp_prices_keep_two_decimals() {
    let srv = TestServer::spawn_default().await;

    let (status, body) = srv.get("/products?pageStart=0&pageSize=5&currency=gbp").await;

    assert_eq!(status, StatusCode::OK);
    let prices: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["price"].as_str().unwrap())
        .collect();
    assert_eq!(prices, ["1.00", "1.10", "1.20", "0.70", "0.50"]);
    assert!(body["items"].as_array().unwrap().iter().all(|i| i["currency"] == "GBP"));
}

#[tokio::test]
async fn defaults_apply_without_query() {
    let srv = TestServer::spawn_default().await;

    let (status, body) = srv.get("/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pageStart"], 0);
    assert_eq!(body["pageSize"], 10);
    assert_eq!(body["items"].as_array().unwrap().len(), 8);
    assert_eq!(body["totalCount"], 8);
}

#[tokio::test]
async fn page_past_the_end_is_empty_with_zero_total() {
    let srv = TestServer::spawn_default().await;

    let (status, body) = srv.get("/products?pageStart=40&pageSize=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"items": [], "totalCount": 0, "pageStart": 40, "pageSize": 5}));
}

#[tokio::test]
async fn invalid_queries_are_rejected_with_400() {
    let srv = TestServer::spawn_default().await;

    for (path, code) in [
        ("/products?pageStart=-1", "invalid_page_start"),
        ("/products?pageStart=4294967296", "invalid_page_start"),
        ("/products?pageStart=abc", "invalid_query"),
        ("/products?pageSize=ten", "invalid_query"),
        ("/products?pageSize=0", "invalid_page_size"),
        ("/products?pageSize=51", "invalid_page_size"),
        ("/products?currency=EURO", "invalid_currency"),
        ("/products?currency=USD", "unsupported_currency"),
    ] {
        let (status, body) = srv.get(path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(body["error"], code, "{path}");
        assert!(body["message"].is_string(), "{path}");
    }
}

#[tokio::test]
async fn out_of_range_page_start_names_the_accepted_range() {
    let srv = TestServer::spawn_default().await;

    let (status, body) = srv.get("/products?pageStart=4294967296").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "pageStart must be an integer between 0 and 4294967295");
}

#[tokio::test]
async fn currencies_endpoint_lists_supported_codes() {
    let srv = TestServer::spawn_default().await;

    let (status, body) = srv.get("/currencies").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"currencies": ["EUR", "GBP"], "maxPageSize": 50}));
}

#[tokio::test]
async fn one_store_fetch_serves_every_currency() {
    let store = Arc::new(ObservedStore::new(false));
    let services = AppServices::with_store(store.clone(), &default_config()).unwrap();
    let srv = TestServer::spawn(services).await;

    let (gbp_status, gbp) = srv.get("/products?pageStart=0&pageSize=5&currency=GBP").await;
    let (eur_status, eur) = srv.get("/products?pageStart=0&pageSize=5&currency=EUR").await;

    assert_eq!((gbp_status, eur_status), (StatusCode::OK, StatusCode::OK));
    assert_eq!(gbp["items"][0]["price"], "1.00");
    assert_eq!(eur["items"][0]["price"], "1.11");
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn store_outage_maps_to_503() {
    let store = Arc::new(ObservedStore::new(true));
    let services = AppServices::with_store(store.clone(), &default_config()).unwrap();
    let srv = TestServer::spawn(services).await;

    let (status, body) = srv.get("/products?pageSize=5").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "store_unavailable");

    // Failures are not cached: the next request tries the store again.
    let (status, _) = srv.get("/products?pageSize=5").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(store.calls.load(Ordering::SeqCst), 2);
}
