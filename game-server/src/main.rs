use std::sync::Arc;

use tokio::signal;
use tracing::info;

use game_core::{ContentCatalog, GameSessionManager, RoundManager};
use game_persistence::connection::connect_and_migrate;
use game_persistence::{ContentRepository, GameRepository, RoundRepository, UserRepository};
use game_server::auth::AuthService;
use game_server::config::Config;
use game_server::create_routes;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting meme trivia server...");

    let config = Config::new();

    // Initialize database connection and run migrations
    let db = match connect_and_migrate().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let catalog = ContentCatalog::new(Arc::new(ContentRepository::new(db.clone())));
    let round_manager = RoundManager::new(Arc::new(RoundRepository::new(db.clone())));
    let game_repository = Arc::new(GameRepository::new(db.clone()));
    let session_manager = Arc::new(GameSessionManager::new(
        catalog,
        game_repository,
        round_manager,
    ));
    let user_repository = Arc::new(UserRepository::new(db));

    // Check for dev mode
    let auth_service = if config.auth_dev_mode {
        info!("Starting in development authentication mode - JWT validation disabled");
        Arc::new(AuthService::new_dev_mode())
    } else {
        Arc::new(AuthService::new(&config.jwt_secret))
    };

    let routes = create_routes(session_manager, auth_service, user_repository);

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().expect("Invalid HOST"),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
