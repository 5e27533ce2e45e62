//! In-process stand-in for the catalog backend.
//!
//! Every request is recorded. Replies are scripted per `METHOD path`, where a
//! route with a query string takes precedence over the bare path.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

use ecopreco::controllers::AppContext;
use ecopreco::{Config, SessionStore};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path below the API root, with query string.
    pub target: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    body: Option<String>,
    delay: Duration,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self { status: StatusCode::OK, body: Some(value.to_string()), delay: Duration::ZERO }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: (!body.is_empty()).then(|| body.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn no_content() -> Self {
        Self::status(204, "")
    }

    pub fn delayed(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{addr}/api"), state }
    }

    /// Script the reply for `method target`, e.g. `("GET", "/products/1")`.
    pub fn on(&self, method: &str, target: &str, reply: Reply) -> &Self {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(format!("{method} {target}"), reply);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request was recorded")
    }

    pub fn config(&self) -> Config {
        Config::default().with_api_url(self.base_url.clone())
    }

    /// Context with a fresh in-memory session.
    pub fn context(&self) -> AppContext {
        AppContext::new(self.config(), SessionStore::in_memory()).unwrap()
    }

    /// Context whose session already holds `roles`.
    pub fn logged_in(&self, username: &str, roles: &[&str]) -> AppContext {
        let ctx = self.context();
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        ctx.session.set_session("test-token", username, &roles).unwrap();
        ctx
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .trim_start_matches("/api")
        .to_string();
    let path = target.split('?').next().unwrap_or_default().to_string();

    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        target: target.clone(),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let reply = {
        let routes = state.routes.lock().unwrap();
        routes
            .get(&format!("{method} {target}"))
            .or_else(|| routes.get(&format!("{method} {path}")))
            .cloned()
    };

    let Some(reply) = reply else {
        return (StatusCode::NOT_FOUND, "no route").into_response();
    };
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    match reply.body {
        Some(body) => (reply.status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        None => reply.status.into_response(),
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

/// A minimal product record as the backend serializes it.
pub fn product(id: i64, name: &str, price: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "currentPrice": price.parse::<f64>().unwrap(),
        "brand": "Verde Vivo",
        "category": "Hygiene",
        "ecoLabel": "FSC",
        "productUrl": format!("https://shop.example/{id}"),
        "imageUrl": null,
        "store": "EcoShop",
        "sustainabilityInfo": null
    })
}

pub fn page_of(products: Vec<Value>) -> Value {
    let total = products.len();
    serde_json::json!({
        "content": products,
        "totalElements": total,
        "totalPages": 1,
        "number": 0,
        "size": 12
    })
}
