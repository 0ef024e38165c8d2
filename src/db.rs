use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::plugins::blog::models::BlogRecord;

/// All posts, newest first.
pub type BlogCollection = Vec<BlogRecord>;

/// Flat JSON file holding the blog collection.
///
/// Nothing is cached: every call goes back to the file, so a request always
/// sees what is on disk. Read-modify-write cycles are serialized within this
/// process; other processes writing the same file are not coordinated.
#[derive(Debug)]
pub struct BlogStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl BlogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and an empty collection if the file is
    /// missing. An existing file is left alone.
    pub async fn init(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|e| StoreError::io(dir, e))?;
        }

        let created = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await;
        match created {
            Ok(mut file) => {
                file.write_all(b"[]").await.map_err(|e| StoreError::io(&self.path, e))?;
                file.flush().await.map_err(|e| StoreError::io(&self.path, e))?;
                tracing::info!(path = %self.path.display(), "created empty blog collection");
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(StoreError::io(&self.path, e)),
        }
        Ok(())
    }

    pub async fn load_all(&self) -> Result<BlogCollection, StoreError> {
        let bytes = fs::read(&self.path).await.map_err(|e| StoreError::io(&self.path, e))?;
        parse_collection(&self.path, &bytes)
    }

    /// Puts `record` in front of the stored collection and rewrites the file.
    pub async fn prepend_and_save(&self, record: BlogRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut blogs = self.load_all().await?;
        blogs.insert(0, record);
        self.write_collection(&blogs).await
    }

    // The sibling temp file is renamed over the target so readers never see a torn write.
    async fn write_collection(&self, blogs: &[BlogRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(blogs).map_err(StoreError::Serialize)?;
        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, &json).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::io(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::io(&self.path, e));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn parse_collection(path: &Path, bytes: &[u8]) -> Result<BlogCollection, StoreError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("expected an array of blogs, found {}", json_kind(&other)),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value(item).map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("entry {idx} is not a blog record: {e}"),
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
