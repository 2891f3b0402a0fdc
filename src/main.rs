use std::process;
use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::StatusCode};
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use booksync_service::{
    create_router,
    models::meeting::default_meeting_types,
    services::{
        availability::{SimulatedAvailability, SIMULATED_AVAILABILITY_DELAY},
        calendar::{CalendarService, ProviderDelays},
        database::create_database_service,
    },
    AppConfig, AppState,
};

// Error handler
async fn handle_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            "Request took too long".to_string(),
        )
    } else if error.is::<tower::load_shed::error::Overloaded>() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service is overloaded, try again later".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", error),
        )
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            process::exit(1);
        }
    };

    #[cfg(feature = "sentry-monitoring")]
    let _sentry_guard = config.sentry_dsn.as_deref().map(|dsn| {
        info!("Sentry error tracking enabled");
        let environment = if config.is_production {
            "production"
        } else {
            "development"
        };
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(environment.into()),
                ..Default::default()
            },
        ))
    });

    if config.is_production {
        info!("Running in PRODUCTION mode");
    } else {
        info!("Running in DEVELOPMENT mode");
    }

    // Initialize the database service
    let database = match create_database_service(&config.database_path) {
        Ok(database) => database,
        Err(err) => {
            error!(
                "Failed to open bookings database at {}: {}",
                config.database_path, err
            );
            process::exit(1);
        }
    };

    let (availability_delay, provider_delays) = if config.simulate_provider_delays {
        (SIMULATED_AVAILABILITY_DELAY, ProviderDelays::simulated())
    } else {
        info!("Simulated provider delays disabled");
        (Duration::ZERO, ProviderDelays::none())
    };

    // Create shared application state
    let app_state = Arc::new(AppState {
        database,
        availability: Arc::new(SimulatedAvailability::new(availability_delay)),
        calendar: CalendarService::new(provider_delays),
        auth: config.admin_auth(),
        meeting_types: default_meeting_types(),
    });

    let app = create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .load_shed()
            .concurrency_limit(64)
            .timeout(Duration::from_secs(10))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any)),
    );

    info!("Server listening on {}", config.bind_addr);

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind to {}: {}", config.bind_addr, err);
            process::exit(1);
        }
    };

    // Set up signal handler for graceful shutdown
    let shutdown = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received interrupt signal, starting graceful shutdown");
            },
            _ = terminate => {
                info!("Received terminate signal, starting graceful shutdown");
            },
        }
    };

    info!("Server is ready to accept connections");
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!("Server error: {}", err);
        process::exit(1);
    }

    info!("Server has been gracefully shut down");
}
