use std::path::PathBuf;
use std::sync::Arc;

use blog_publisher::kernel::{build_app, Plugin};
use blog_publisher::plugins::assets::StaticFiles;
use blog_publisher::plugins::blog::BlogPlugin;
use blog_publisher::plugins::health::HealthPlugin;
use blog_publisher::plugins::info::InfoPlugin;
use blog_publisher::plugins::upload::{UploadPolicy, UploadsPlugin};
use blog_publisher::BlogStore;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub struct TestServer {
    pub base: String,
    pub store: Arc<BlogStore>,
    pub upload_dir: PathBuf,
    pub handle: tokio::task::JoinHandle<()>,
    _dir: TempDir,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns the full service on an ephemeral port, rooted in a fresh temp dir.
pub async fn spawn_app() -> anyhow::Result<TestServer> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(BlogStore::new(dir.path().join("data").join("blogs.json")));
    store.init().await?;
    let upload_dir = dir.path().join("uploads");
    let public_dir = dir.path().join("public");
    std::fs::create_dir_all(&public_dir)?;
    std::fs::write(dir.path().join("index.html"), "<h1>publisher</h1>")?;
    std::fs::write(public_dir.join("app.js"), "console.log('hi')")?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let plugins: Vec<Box<dyn Plugin>> = vec![
        Box::new(HealthPlugin::new(store.clone())),
        Box::new(InfoPlugin::with_ip("127.0.0.1", addr.port())),
        Box::new(BlogPlugin::new(store.clone(), UploadPolicy::new(&upload_dir, 2 * 1024 * 1024))),
        Box::new(UploadsPlugin::new(&upload_dir)),
    ];
    let assets = StaticFiles { public_dir, index_file: dir.path().join("index.html") };
    let app = build_app(&plugins, Some(assets)).await;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });

    Ok(TestServer { base: format!("http://{}", addr), store, upload_dir, handle, _dir: dir })
}
