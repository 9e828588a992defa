mod auth;
mod context;
mod docs;
mod errors;
mod logging;
mod queue;
mod schemas;
mod serialized;

use axum::routing::get;
use log::info;
use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use encore_collab::{Collab, PgDatabase, YouTubeLookup};

pub use context::ServerContext;
pub use logging::init_logger;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9070;

pub type Router = axum::Router<ServerContext>;

/// Starts the encore server
pub async fn run_server() {
    let port = env::var("ENCORE_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    // Without a key, submissions persist without display metadata
    let lookup = env::var("ENCORE_YOUTUBE_API_KEY")
        .ok()
        .map(YouTubeLookup::new);

    if lookup.is_none() {
        info!("ENCORE_YOUTUBE_API_KEY is not set, metadata lookup is disabled");
    }

    info!("Connecting to database...");
    let database = PgDatabase::new(&database_url)
        .await
        .expect("database connects");

    let collab = Collab::new(database, lookup);
    let context = ServerContext {
        collab: Arc::new(collab),
    };

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .nest("/auth", auth::router())
        .nest("/queue", queue::router());

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context);

    info!("Listening on port {}", port);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    axum::serve(listener, root_router.into_make_service())
        .await
        .expect("server runs");
}
