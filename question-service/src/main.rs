use std::{sync::Arc, time::Duration};

use axum::http::{HeaderValue, Method};
use question_service::{
    config::{AppState, EnvVars},
    db::MongoQuestionStore,
    routes,
};
use tokio::signal;
use tower_http::{
    LatencyUnit,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(sentry::integrations::tracing::layer())
        .init();
    info!("Starting question service...");

    let env_vars = EnvVars::new();

    let _guard = if let Some(sentry_dsn) = env_vars.sentry_dsn.clone() {
        info!("initializing Sentry");
        // NOTE: Events are only emitted, once the guard goes out of scope.
        Some(sentry::init((
            sentry_dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(env_vars.environment.to_string().into()),
                traces_sample_rate: 1.0,
                ..Default::default()
            },
        )))
    } else {
        None
    };

    let client = schema::db::client(&env_vars.mongodb_uri, env!("CARGO_PKG_NAME")).await?;
    let store = MongoQuestionStore::new(client)?;
    let app_state = AppState {
        store: Arc::new(store),
    };

    let app = routes::router(app_state)
        .layer(cors_layer(env_vars.client_url.as_deref()))
        .layer(TimeoutLayer::new(Duration::from_millis(
            env_vars.request_timeout_in_ms,
        )))
        .layer(RequestBodyLimitLayer::new(env_vars.request_body_size_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Micros),
                ),
        );

    let port = env_vars.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!(port, environment = %env_vars.environment, "listening");
    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!("Server error: {}", err);
    }
    Ok(())
}

fn cors_layer(client_url: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET]);
    match client_url.map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => layer.allow_origin(AllowOrigin::exact(origin)),
        Some(Err(e)) => {
            warn!(error = %e, "CLIENT_URL is not a valid origin header");
            layer
        }
        None => layer,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}
