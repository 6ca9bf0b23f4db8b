use tokio::net::TcpListener;
use todo_core::tables::ALL;
use todo_core::Store;
use todo_server::{app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), todo_server::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=info,todo_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        addr = %config.addr,
        db_path = %config.db_path.display(),
        static_dir = %config.static_dir.display(),
        "configuration loaded"
    );

    let store = Store::open(&config.db_path, &ALL)?;
    let state = AppState::new(store)?;

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "starting server");
    todo_server::run(listener, app(state, &config.static_dir)).await?;
    Ok(())
}
