use std::{
    net::SocketAddr,
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, Response},
};
use fake::{Fake, faker::name::en::Name};
use gearshare::{Config, routes::app_router, store::InMemoryStore};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{Level, Span, error, info, info_span, level_filters::LevelFilter};
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub const SHARER_USER_ID_HEADER: &str = "x-sharer-user-id";

#[allow(dead_code)]
pub struct InstanceState {
    pub reqwest_client: reqwest::Client,
    pub server_url: String,
}

#[allow(dead_code)]
pub fn default_test_config() -> Config {
    Config {
        port: 0,
        log_level: Level::WARN,
    }
}

pub async fn setup_instance(config: Config) -> Result<InstanceState, anyhow::Error> {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer().with_filter(LevelFilter::from_level(config.log_level)),
        )
        .try_init();

    let store = InMemoryStore::new();
    let users_repository =
        gearshare::domains::users::repository::InMemoryUsersRepository::new(store.clone());
    let items_repository =
        gearshare::domains::items::repository::InMemoryItemsRepository::new(store.clone());
    let comments_repository =
        gearshare::domains::items::repository::InMemoryCommentsRepository::new(store.clone());
    let bookings_repository =
        gearshare::domains::bookings::repository::InMemoryBookingsRepository::new(store.clone());
    let requests_repository =
        gearshare::domains::requests::repository::InMemoryRequestsRepository::new(store);

    let users_service =
        gearshare::domains::users::service::DefaultUsersService::new(users_repository.clone());
    let items_service = gearshare::domains::items::service::DefaultItemsService::new(
        items_repository.clone(),
        comments_repository,
        users_repository.clone(),
        bookings_repository.clone(),
    );
    let bookings_service = gearshare::domains::bookings::service::DefaultBookingsService::new(
        bookings_repository,
        items_repository.clone(),
        users_repository.clone(),
    );
    let requests_service = gearshare::domains::requests::service::DefaultRequestsService::new(
        requests_repository,
        items_repository,
        users_repository,
    );

    let app = app_router(
        users_service,
        items_service,
        bookings_service,
        requests_service,
    )
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                info_span!(
                    "http_request",
                    method = ?request.method(),
                    matched_path,
                )
            })
            .on_response(
                |response: &Response<Body>, latency: Duration, _span: &Span| {
                    if response.status().is_server_error() {
                        error!("response: {} {latency:?}", response.status())
                    } else {
                        info!("response: {} {latency:?}", response.status())
                    }
                },
            ),
    );

    let listener = if config.port == 0 {
        bind_listener_to_free_port().await?
    } else {
        let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
        tokio::net::TcpListener::bind(&addr).await.map_err(|err| {
            anyhow::anyhow!("Failed to bind the TCP listener to address {addr}: {err}")
        })?
    };

    let addr = listener.local_addr().unwrap();

    info!("Successfully bound the TCP listener to address {addr}\n");

    // Start a server, the handle is kept in order to abort it if needed
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    Ok(InstanceState {
        server_url: format!("http://{}:{}", addr.ip(), addr.port()),
        reqwest_client: reqwest::Client::new(),
    })
}

async fn bind_listener_to_free_port() -> Result<tokio::net::TcpListener, anyhow::Error> {
    for port in 51_000..60_000 {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => return Ok(listener),
            Err(_) => continue,
        }
    }
    Err(anyhow::anyhow!(
        "No free port found in the range 51000-60000"
    ))
}

static EMAIL_COUNTER: AtomicI64 = AtomicI64::new(0);

/// Registers a user with fake data and returns its id. Emails carry a
/// counter so registrations never collide within a test binary.
#[allow(dead_code)]
pub async fn register_user(instance: &InstanceState) -> i64 {
    let name: String = Name().fake();
    let email = format!(
        "user{}@example.com",
        EMAIL_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let response = instance
        .reqwest_client
        .post(format!("{}/users", instance.server_url))
        .json(&json!({ "name": name, "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

/// Lists an item for `owner_id` and returns its id.
#[allow(dead_code)]
pub async fn list_item(instance: &InstanceState, owner_id: i64, name: &str, available: bool) -> i64 {
    let response = instance
        .reqwest_client
        .post(format!("{}/items", instance.server_url))
        .header(SHARER_USER_ID_HEADER, owner_id)
        .json(&json!({
            "name": name,
            "description": format!("{name} in good condition"),
            "available": available,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}
