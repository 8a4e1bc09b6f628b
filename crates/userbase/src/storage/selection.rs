//! Runtime hint used to choose which adapter to construct.

use std::path::PathBuf;

use super::d1::D1Config;

/// Where the process is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Runtime {
    /// Cloudflare Workers, where a D1 binding is the natural store.
    Cloudflare,
    #[default]
    Native,
}

impl Runtime {
    /// Parse the `RUNTIME` value. Only `cloudflare` selects Cloudflare.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(name) if name.eq_ignore_ascii_case("cloudflare") => Self::Cloudflare,
            _ => Self::Native,
        }
    }
}

/// Describes the execution environment for adapter selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSignal {
    pub runtime: Runtime,
    /// Database file for the embedded adapter.
    pub sqlite_path: PathBuf,
    /// D1 settings, when all of them were provided.
    pub d1: Option<D1Config>,
}

#[cfg(test)]
impl SelectionSignal {
    /// Local-only signal for the given SQLite file.
    pub fn embedded(sqlite_path: impl Into<PathBuf>) -> Self {
        Self {
            runtime: Runtime::Native,
            sqlite_path: sqlite_path.into(),
            d1: None,
        }
    }

    /// Remote-capable signal for the given D1 database.
    pub fn remote(config: D1Config) -> Self {
        Self {
            runtime: Runtime::Cloudflare,
            sqlite_path: PathBuf::new(),
            d1: Some(config),
        }
    }
}

impl SelectionSignal {
    /// The D1 settings to use, or `None` when the embedded adapter applies.
    ///
    /// Remote capability requires both the Cloudflare runtime and a complete
    /// D1 configuration.
    pub fn remote_handle(&self) -> Option<&D1Config> {
        match self.runtime {
            Runtime::Cloudflare => self.d1.as_ref(),
            Runtime::Native => None,
        }
    }
}
