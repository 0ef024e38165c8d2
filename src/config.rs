use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::plugins::assets::StaticFiles;
use crate::plugins::upload::UploadPolicy;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Runtime settings, read from the environment (after `.env`) with defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub blogs_path: PathBuf,
    pub upload_dir: PathBuf,
    pub public_dir: PathBuf,
    pub index_file: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Unparseable numbers fall back to their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |name: &str, default: &str| lookup(name).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string());
        let number = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            host: text("HOST", "0.0.0.0"),
            port: number("PORT").and_then(|p| u16::try_from(p).ok()).unwrap_or(DEFAULT_PORT),
            blogs_path: PathBuf::from(text("BLOGS_PATH", "data/blogs.json")),
            upload_dir: PathBuf::from(text("UPLOAD_DIR", "uploads")),
            public_dir: PathBuf::from(text("PUBLIC_DIR", "public")),
            index_file: PathBuf::from(text("INDEX_FILE", "index.html")),
            max_upload_bytes: number("MAX_UPLOAD_BYTES")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(&self.upload_dir, self.max_upload_bytes)
    }

    pub fn static_files(&self) -> StaticFiles {
        StaticFiles { public_dir: self.public_dir.clone(), index_file: self.index_file.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_publisher_layout() {
        let config = Config::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.blogs_path, PathBuf::from("data/blogs.json"));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3001");
    }

    #[test]
    fn environment_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("BLOGS_PATH", "/srv/blogs.json"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ]));
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.blogs_path, PathBuf::from("/srv/blogs.json"));
        assert_eq!(config.upload_policy().max_bytes, 1024);
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "99999"), ("MAX_UPLOAD_BYTES", "lots")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn bad_host_is_an_error() {
        let config = Config::from_lookup(lookup_from(&[("HOST", "not an ip")]));
        assert!(config.socket_addr().is_err());
    }
}
