use dotenvy::dotenv;
use gearshare::{Config, httpserver::serve_http_server, store::InMemoryStore};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    if let Err(err) = dotenv()
        && !err.not_found()
    {
        return Err(anyhow::anyhow!("Error while loading .env file: {err}"));
    }

    let config = match Config::parse_environment() {
        Ok(c) => c,
        Err(errors) => {
            return Err(anyhow::anyhow!(
                "Failed to parse environment variables for configuration with errors: {}",
                errors
                    .into_iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ));
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_filter(Into::<LevelFilter>::into(config.log_level)),
        )
        .init();

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

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|err| {
        anyhow::anyhow!("Error while binding the TCP listener to address {addr}: {err}")
    })?;

    info!(
        "Successfully bind the TCP listener to address {}\n",
        listener.local_addr()?
    );

    serve_http_server(
        listener,
        users_service,
        items_service,
        bookings_service,
        requests_service,
    )
    .await
}
