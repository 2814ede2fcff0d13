use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use objstore_core::StoreConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_PORT: u16 = 50051;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub kvs: StoreConfig,
}

impl ServerConfig {
    /// Read a TOML config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            kvs: StoreConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objstore_core::MismatchPolicy;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:50051".parse::<SocketAddr>().unwrap());
        assert_eq!(c.kvs.correlator.request_timeout_ms, 10_000);
        assert_eq!(c.kvs.node_id, 0);
    }

    #[test]
    fn load_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
bind_addr = "0.0.0.0:8080"

[kvs]
request_timeout_ms = 500
unavailable_retries = 2
on_id_mismatch = "reject"
node_id = 3
"#
        )
        .unwrap();

        let c = ServerConfig::load(file.path()).unwrap();
        assert_eq!(c.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.kvs.correlator.request_timeout_ms, 500);
        assert_eq!(c.kvs.correlator.unavailable_retries, 2);
        assert_eq!(c.kvs.correlator.on_id_mismatch, MismatchPolicy::Reject);
        assert_eq!(c.kvs.node_id, 3);
    }

    #[test]
    fn load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objstore.toml");
        std::fs::write(&path, "[kvs]\nnode_id = 9\n").unwrap();

        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.bind_addr, ServerConfig::default().bind_addr);
        assert_eq!(c.kvs.node_id, 9);
        assert_eq!(c.kvs.correlator.on_id_mismatch, MismatchPolicy::Warn);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "bind_addr = 12").unwrap();
        assert!(matches!(ServerConfig::load(&path), Err(ServerError::Config(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ServerError::Io(_)));
    }
}
