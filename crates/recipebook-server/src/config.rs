use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory for uploaded images. `None` keeps them in memory.
    pub blob_root: Option<PathBuf>,
    /// Public prefix of image URLs handed out by the blob store.
    pub blob_base_url: String,
    /// Bearer token to account id.
    pub tokens: BTreeMap<String, String>,
    pub enable_cors: bool,
    pub max_image_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let bind_addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 8080));
        Self {
            bind_addr,
            blob_root: None,
            blob_base_url: format!("http://{bind_addr}/v1/images"),
            tokens: BTreeMap::new(),
            enable_cors: true,
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.blob_base_url, "http://127.0.0.1:8080/v1/images");
        assert_eq!(c.max_image_bytes, 10 * 1024 * 1024);
        assert!(c.enable_cors);
        assert!(c.tokens.is_empty());
        assert!(c.blob_root.is_none());
    }

    #[test]
    fn parses_partial_toml() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:3000"
            blob_root = "/var/lib/recipebook/blobs"

            [tokens]
            "secret-1" = "alice"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 3000);
        assert_eq!(c.blob_root, Some(PathBuf::from("/var/lib/recipebook/blobs")));
        assert_eq!(c.tokens.get("secret-1").map(String::as_str), Some("alice"));
        assert!(c.enable_cors);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("bind_addr = 12").unwrap_err();
        assert!(matches!(err, ServerError::Toml(_)));
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
