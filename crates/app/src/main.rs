use engine::RecordStore;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finsync={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let mut builder = RecordStore::builder();
    if settings.app.seed {
        tracing::info!("Seeding store with demo records...");
        builder = builder.seed(engine::demo_seed());
    }
    let store = builder.build()?;

    let addr = settings.address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return Err(err.into());
        }
    };

    tokio::select! {
        res = server::run_with_listener(store, listener) => {
            if let Err(err) = res {
                tracing::error!("server failed: {err}");
                return Err(err.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down, in-memory records are discarded");
        }
    }

    Ok(())
}
