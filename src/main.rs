use axum::Router;
use blog_publisher::kernel::{build_app, Plugin};
use blog_publisher::plugins::blog::BlogPlugin;
use blog_publisher::plugins::health::HealthPlugin;
use blog_publisher::plugins::info::InfoPlugin;
use blog_publisher::plugins::upload::UploadsPlugin;
use blog_publisher::{BlogStore, Config};
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load .env first so RUST_LOG can come from it
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    tracing::debug!(?config, "loaded configuration");

    let store = Arc::new(BlogStore::new(&config.blogs_path));
    store.init().await?;

    let info_plugin = InfoPlugin::new(config.port);
    let local_ip = info_plugin.local_ip().to_string();
    let plugins_vec: Vec<Box<dyn Plugin>> = vec![
        Box::new(HealthPlugin::new(store.clone())),
        Box::new(info_plugin),
        Box::new(BlogPlugin::new(store.clone(), config.upload_policy())),
        Box::new(UploadsPlugin::new(&config.upload_dir)),
    ];

    let plugin_names: Vec<&'static str> = plugins_vec.iter().map(|p| p.name()).collect();
    tracing::info!("mounting plugins: {:?}", plugin_names);

    let app: Router = build_app(&plugins_vec, Some(config.static_files())).await;

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("publisher running on:");
    tracing::info!("- local: http://localhost:{}", port);
    tracing::info!("- network: http://{}:{}", local_ip, port);
    tracing::info!("api endpoint: http://{}:{}/api/blogs", local_ip, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
            for p in plugins_vec.iter() {
                p.on_shutdown().await;
            }
        })
        .await?;

    Ok(())
}
