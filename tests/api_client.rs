//! Request issuing against a live mock backend: body and header handling,
//! status normalization and the typed catalog calls built on top.

mod common;

use reqwest::Method;
use serde_json::{json, Value};

use common::{page_of, product, MockBackend, Reply};
use ecopreco::catalog::{CatalogService, Facet};
use ecopreco::query::FilterCriteria;
use ecopreco::{ApiClient, ClientError, Config, SessionStore};

fn client_for(mock: &MockBackend, session: SessionStore) -> ApiClient {
    ApiClient::new(&mock.config(), session).unwrap()
}

fn logged_in_session() -> SessionStore {
    let session = SessionStore::in_memory();
    session
        .set_session("abc", "jane", &["ROLE_ADMIN".to_string()])
        .unwrap();
    session
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_content_yields_none() {
    let mock = MockBackend::start().await;
    mock.on("DELETE", "/products/3", Reply::no_content());
    let client = client_for(&mock, logged_in_session());

    let body = client.call(Method::DELETE, "/products/3", true).await.unwrap();
    assert!(body.is_none());
}

#[tokio::test]
async fn json_body_is_returned_untouched() {
    let mock = MockBackend::start().await;
    mock.on("GET", "/things", Reply::json(json!({"a": [1, 2], "b": null})));
    let client = client_for(&mock, SessionStore::in_memory());

    let body = client
        .request::<Value>("/things", Method::GET, None, false)
        .await
        .unwrap();
    assert_eq!(body, Some(json!({"a": [1, 2], "b": null})));
}

#[tokio::test]
async fn error_message_from_json_body() {
    let mock = MockBackend::start().await;
    mock.on("POST", "/auth/login", Reply::status(401, r#"{"message":"Bad credentials"}"#));
    let client = client_for(&mock, SessionStore::in_memory());

    let err = client
        .request("/auth/login", Method::POST, Some(&json!({"username": "x"})), false)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Bad credentials");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
}

#[tokio::test]
async fn unparseable_error_falls_back_to_status_line() {
    let mock = MockBackend::start().await;
    mock.on("GET", "/broken", Reply::status(500, "<html>stack trace</html>"));
    let client = client_for(&mock, SessionStore::in_memory());

    let err = client
        .request::<Value>("/broken", Method::GET, None, false)
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "request failed: 500 Internal Server Error");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_success_body_is_a_decode_error() {
    let mock = MockBackend::start().await;
    mock.on("GET", "/odd", Reply::status(200, "not json"));
    let client = client_for(&mock, SessionStore::in_memory());

    let err = client
        .request::<Value>("/odd", Method::GET, None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config::default().with_api_url(format!("http://{addr}/api"));
    let client = ApiClient::new(&config, SessionStore::in_memory()).unwrap();
    let err = client
        .request::<Value>("/products/public/all", Method::GET, None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.status().is_none());
}

// ---------------------------------------------------------------------------
// Request shaping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bearer_token_sent_only_when_auth_required() {
    let mock = MockBackend::start().await;
    mock.on("GET", "/products/1", Reply::json(product(1, "Soap", "5.00")));
    let client = client_for(&mock, logged_in_session());

    client.call(Method::GET, "/products/1", true).await.unwrap();
    client.call(Method::GET, "/products/1", false).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer abc"));
    assert_eq!(requests[1].authorization, None);
}

#[tokio::test]
async fn auth_required_without_session_sends_nothing() {
    let mock = MockBackend::start().await;
    let client = client_for(&mock, SessionStore::in_memory());

    let err = client.call(Method::DELETE, "/products/1", true).await.unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn get_and_delete_never_carry_a_body() {
    let mock = MockBackend::start().await;
    mock.on("GET", "/x", Reply::json(json!({})));
    mock.on("DELETE", "/x", Reply::no_content());
    mock.on("PUT", "/x", Reply::json(json!({})));
    let client = client_for(&mock, logged_in_session());
    let body = json!({"ignored": true});

    client.request("/x", Method::GET, Some(&body), false).await.unwrap();
    client.request("/x", Method::DELETE, Some(&body), true).await.unwrap();
    client.request("/x", Method::PUT, Some(&body), true).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].body, "");
    assert_eq!(requests[1].body, "");
    let sent: Value = serde_json::from_str(&requests[2].body).unwrap();
    assert_eq!(sent, body);
    assert_eq!(requests[2].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn post_body_is_json_encoded() {
    let mock = MockBackend::start().await;
    mock.on("POST", "/reviews", Reply::json(json!({"id": 1, "productId": 3, "rating": 4})));
    let client = client_for(&mock, logged_in_session());

    let draft = json!({"productId": 3, "rating": 4, "comment": "Solid"});
    client.request("/reviews", Method::POST, Some(&draft), true).await.unwrap();

    let req = mock.last_request();
    assert_eq!(req.content_type.as_deref(), Some("application/json"));
    assert_eq!(serde_json::from_str::<Value>(&req.body).unwrap(), draft);
}

// ---------------------------------------------------------------------------
// Catalog service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listing_goes_to_the_endpoint_the_criteria_select() {
    let mock = MockBackend::start().await;
    mock.on("GET", "/products/public/search", Reply::json(page_of(vec![product(1, "Soap", "5")])));
    mock.on("GET", "/products/public/filter", Reply::json(page_of(vec![])));
    let catalog = CatalogService::new(client_for(&mock, SessionStore::in_memory()));

    let search = FilterCriteria {
        keyword: Some("soap".into()),
        min_price: Some("5".into()),
        ..Default::default()
    };
    let page = catalog.list_products(&search).await.unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(
        mock.last_request().target,
        "/products/public/search?keyword=soap&minPrice=5&page=0&size=12"
    );

    let filter = FilterCriteria {
        brand: Some("Terra Pura".into()),
        ..FilterCriteria::page(2, 12)
    };
    catalog.list_products(&filter).await.unwrap();
    assert_eq!(
        mock.last_request().target,
        "/products/public/filter?brand=Terra+Pura&page=2&size=12"
    );
}

#[tokio::test]
async fn facets_drop_null_and_blank_entries() {
    let mock = MockBackend::start().await;
    mock.on("GET", Facet::EcoLabels.path(), Reply::json(json!(["FSC", null, "", "  ", "Vegan"])));
    let catalog = CatalogService::new(client_for(&mock, SessionStore::in_memory()));

    let labels = catalog.facet(Facet::EcoLabels).await.unwrap();
    assert_eq!(labels, vec!["FSC".to_string(), "Vegan".to_string()]);
}

#[tokio::test]
async fn all_products_requests_one_large_page() {
    let mock = MockBackend::start().await;
    mock.on(
        "GET",
        "/products/public/all",
        Reply::json(page_of(vec![product(1, "A", "1"), product(2, "B", "2")])),
    );
    let catalog = CatalogService::new(client_for(&mock, SessionStore::in_memory()));

    let products = catalog.all_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(mock.last_request().target, "/products/public/all?size=1000");
}

#[tokio::test]
async fn average_rating_absent_and_count_defaults() {
    let mock = MockBackend::start().await;
    mock.on("GET", "/reviews/product/4/average-rating", Reply::json(Value::Null));
    mock.on("GET", "/reviews/product/4/count", Reply::json(json!(0)));
    let catalog = CatalogService::new(client_for(&mock, SessionStore::in_memory()));

    assert_eq!(catalog.average_rating(4).await.unwrap(), None);
    assert_eq!(catalog.review_count(4).await.unwrap(), 0);
}

#[tokio::test]
async fn price_statistics_period_is_form_encoded() {
    let mock = MockBackend::start().await;
    mock.on(
        "GET",
        "/price-history/product/7/statistics/period",
        Reply::json(json!({"minPrice": 1.5, "maxPrice": 3.0, "avgPrice": 2.25})),
    );
    let catalog = CatalogService::new(client_for(&mock, SessionStore::in_memory()));

    catalog
        .price_statistics_between(7, "2024-01-01T00:00:00", "2024-01-31T23:59:59")
        .await
        .unwrap();
    assert_eq!(
        mock.last_request().target,
        "/price-history/product/7/statistics/period?startDate=2024-01-01T00%3A00%3A00&endDate=2024-01-31T23%3A59%3A59"
    );
}
