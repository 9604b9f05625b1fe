use std::{env, error::Error, sync::Arc};

use tokio::{fs, net};
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use helpdesk::{http, store::Store, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = env::args().nth(1).unwrap_or_else(|| "config.toml".into());
    let config = fs::read_to_string(&path).await?;
    let config = toml::from_str::<Config>(&config)?;

    let store = Store::load(&config.data).await?;

    let app = http::router(
        Arc::new(http::AppState {
            store,
            library: config.library,
            auth: config.auth,
        }),
        &config.http.cors,
    )?;

    let listener = net::TcpListener::bind(config.http.server.addr).await?;
    tracing::info!(addr = %config.http.server.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
