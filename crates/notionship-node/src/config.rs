//! Node configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use notionship_state::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Address to listen on.
    pub addr: SocketAddr,

    /// Directory for the file store. `None` keeps the document in memory.
    pub data_dir: Option<PathBuf>,

    /// Slot the document is stored under.
    pub storage_key: String,

    /// Events buffered per WebSocket subscriber before it starts lagging.
    pub event_buffer: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            event_buffer: 256,
        }
    }
}

impl NodeConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from `lookup`, falling back to defaults for unset or
    /// invalid values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("NOTIONSHIP_ADDR") {
            match raw.parse() {
                Ok(addr) => config.addr = addr,
                Err(e) => warn!("Ignoring NOTIONSHIP_ADDR={:?}: {}", raw, e),
            }
        }

        if let Some(raw) = lookup("NOTIONSHIP_DATA_DIR") {
            if !raw.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(raw));
            }
        }

        if let Some(raw) = lookup("NOTIONSHIP_STORAGE_KEY") {
            if raw.trim().is_empty() {
                warn!("Ignoring empty NOTIONSHIP_STORAGE_KEY");
            } else {
                config.storage_key = raw;
            }
        }

        if let Some(raw) = lookup("NOTIONSHIP_EVENT_BUFFER") {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => config.event_buffer = n,
                _ => warn!("Ignoring NOTIONSHIP_EVENT_BUFFER={:?}", raw),
            }
        }

        config
    }
}
