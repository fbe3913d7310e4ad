//! Embedded dev-server seam.
//!
//! The bridge does not implement a dev server; it drives one through the
//! [`DevServer`] trait and the capability pair handed back on startup.
//! Module building, caching, and request ordering are entirely the server's
//! business.

use futures::future::BoxFuture;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ConfigError, DevOverrides, ServerConfig};
use crate::manifest::PackageManifest;

/// Error surfaced by the embedded dev server.
///
/// The bridge never inspects these; they pass through to the host runner
/// unchanged.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServerError {
    /// Human-readable failure description.
    pub message: String,
}

impl ServerError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ConfigError> for ServerError {
    fn from(err: ConfigError) -> Self {
        Self::new(err.to_string())
    }
}

/// Options for a single URL load.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Build for server-side rendering instead of the browser.
    pub is_ssr: bool,
}

/// Everything the embedded server needs to start.
pub struct StartArgs<'a> {
    /// Project working directory.
    pub cwd: &'a Path,
    /// Validated configuration from [`DevServer::load_and_validate_config`].
    pub config: &'a ServerConfig,
    /// Always `None` from the bridge: skip dependency install and lockfile
    /// verification.
    pub lockfile: Option<&'a Path>,
    /// Project manifest.
    pub manifest: &'a PackageManifest,
}

/// URL loader capability returned by [`DevServer::start`].
pub type LoadByUrlFn =
    Arc<dyn Fn(String, LoadOptions) -> BoxFuture<'static, Result<String, ServerError>> + Send + Sync>;

/// Shutdown capability returned by [`DevServer::start`].
pub type ShutdownFn =
    Arc<dyn Fn() -> BoxFuture<'static, Result<(), ServerError>> + Send + Sync>;

/// Capabilities captured from a started server.
///
/// Valid from `server_start` completion until `server_stop` resolves.
/// Invoking either capability after shutdown is the server's undefined
/// behavior; the bridge does not guard against it.
pub struct ServerHandle {
    /// Build and return the content served at a URL path.
    pub load_by_url: LoadByUrlFn,
    /// Drain in-flight work and release server resources.
    pub shutdown: ShutdownFn,
}

/// The embedded dev server the bridge wraps.
///
/// `load_and_validate_config` and `url_for_file` have provided
/// implementations covering the common mount-table behavior; servers with
/// their own config or mount semantics override them.
pub trait DevServer: Send + Sync {
    /// Merge the fixed dev-option overrides with the project manifest and
    /// validate the result.
    fn load_and_validate_config(
        &self,
        cwd: &Path,
        overrides: DevOverrides,
        manifest: &PackageManifest,
    ) -> Result<ServerConfig, ServerError> {
        ServerConfig::resolve(cwd, overrides, manifest).map_err(ServerError::from)
    }

    /// Start serving and hand back the loader/shutdown capabilities.
    async fn start(&self, args: StartArgs<'_>) -> Result<ServerHandle, ServerError>;

    /// URL under which an absolute file path is served, if any mount covers
    /// it.
    fn url_for_file(&self, path: &Path, config: &ServerConfig) -> Option<String> {
        config.url_for_file(path)
    }
}
