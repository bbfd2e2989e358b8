use habitra::assistant::Assistant;
use habitra::{load_data, router, AppState, Config};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let data = load_data(&config.data_path).await;
    info!(
        path = %config.data_path.display(),
        habits = data.habits.len(),
        "state loaded"
    );

    let mut state = AppState::new(config.data_path.clone(), data).with_reply_delay(config.reply_delay);
    match config.assistant.clone() {
        Some(assistant_config) => {
            let assistant = Assistant::new(assistant_config)?;
            info!(model = assistant.model(), "remote assistant enabled");
            state = state.with_assistant(assistant);
        }
        None => info!("OPENAI_API_KEY not set, chat uses the rule engine"),
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
