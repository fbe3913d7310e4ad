//! The test-runner plugin contract and its dev-server bridge implementation.
//!
//! Hook flow: the runner awaits [`RunnerPlugin::server_start`] before issuing
//! any file requests, rewrites test-file imports through
//! [`RunnerPlugin::transform_import`], answers browser requests through
//! [`RunnerPlugin::serve`], and finally awaits [`RunnerPlugin::server_stop`].
//!
//! The marker query parameter is the only channel between the two request
//! hooks: `transform_import` appends it to mounted test-file URLs, `serve`
//! looks for it to decide whether the setup snippet gets injected.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use crate::config::{DevOverrides, ServerConfig};
use crate::env::RUNTIME_MODE_TEST;
use crate::error::BridgeError;
use crate::manifest::{read_manifest, PackageManifest};
use crate::server::{DevServer, LoadOptions, ServerHandle, StartArgs};
use crate::watch::WatchRegistry;

/// Marker query parameter identifying browser-loaded test entry files.
pub const TEST_FILE_MARKER: &str = "?isTestFile=1";

/// Setup snippet prepended to test-file responses.
///
/// Removes leftover test markup from the document before each test runs.
pub const TEST_RUNNER_SETUP: &str = "\
beforeEach(() => {
  document.querySelectorAll('.test').forEach((el) => el.remove());
});";

/// Classifier for test-file paths, supplied by the host runner.
pub type TestFilePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Default test-file classifier: `*.test.*` / `*.spec.*` with a script
/// extension, query string ignored.
#[must_use]
pub fn is_test_file_path(source: &str) -> bool {
    let path = strip_query(source);
    let file_name = path.rsplit('/').next().unwrap_or(path);

    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return false;
    };

    (stem.ends_with(".test") || stem.ends_with(".spec"))
        && matches!(
            ext.to_ascii_lowercase().as_str(),
            "ts" | "tsx" | "js" | "jsx" | "mts" | "mjs" | "cts" | "cjs"
        )
}

/// Strip the query string from a URL or import specifier.
fn strip_query(url: &str) -> &str {
    url.find('?').map_or(url, |at| &url[..at])
}

/// An HTTP-like request for a served resource.
#[derive(Debug, Clone)]
pub struct ServeRequest {
    /// Request URL, query string included.
    pub url: String,
}

/// An import specifier encountered by the runner's transform pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ImportRequest<'a> {
    /// The specifier as written in the importing file.
    pub source: &'a str,
}

/// Context handed to [`RunnerPlugin::server_start`].
pub struct ServerStartContext<'a> {
    /// The runner's file watcher; registered paths feed the embedded
    /// server's rebuild pipeline.
    pub file_watcher: &'a mut dyn WatchRegistry,
}

/// Plugin contract consumed by the host test runner.
///
/// The runner awaits `server_start` before the first request hook and
/// `server_stop` after the last; request hooks otherwise run concurrently
/// and independently.
pub trait RunnerPlugin: Send + Sync {
    /// Plugin name for diagnostics.
    fn name(&self) -> &str;

    /// Acquire backing resources. Called once.
    async fn server_start(&self, ctx: ServerStartContext<'_>) -> Result<(), BridgeError>;

    /// Release backing resources. Called once, last.
    async fn server_stop(&self) -> Result<(), BridgeError>;

    /// Produce the response body for a requested URL.
    async fn serve(&self, request: &ServeRequest) -> Result<String, BridgeError>;

    /// Rewrite an import specifier, or return `None` to leave it untouched.
    async fn transform_import(
        &self,
        import: ImportRequest<'_>,
    ) -> Result<Option<String>, BridgeError>;
}

/// Constructor inputs for [`BridgePlugin`].
///
/// The runtime mode is passed in explicitly; the surrounding glue decides
/// how to source it (usually [`crate::env::runtime_mode`]).
pub struct BridgeOptions {
    /// Project working directory: manifest location and mount anchor.
    pub cwd: PathBuf,
    /// Runtime-mode flag value, `None` when unset.
    pub mode: Option<String>,
    /// Test-file classifier; defaults to [`is_test_file_path`].
    pub is_test_file: Option<TestFilePredicate>,
}

impl BridgeOptions {
    /// Options for `cwd` with the mode read from the process environment.
    #[must_use]
    pub fn from_env(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            mode: crate::env::runtime_mode(),
            is_test_file: None,
        }
    }
}

/// Bridges an embedded dev server into the runner's plugin contract.
///
/// Lifecycle is strictly linear: uninitialized (constructed) → running
/// (`server_start` resolved) → stopped (`server_stop` resolved). There is no
/// restart path.
pub struct BridgePlugin<S> {
    server: S,
    cwd: PathBuf,
    manifest: PackageManifest,
    config: ServerConfig,
    is_test_file: TestFilePredicate,
    handle: OnceLock<ServerHandle>,
}

impl<S: DevServer> BridgePlugin<S> {
    /// Validate the environment, read the manifest, and resolve the server
    /// configuration. No server resources are allocated here.
    pub fn new(server: S, options: BridgeOptions) -> Result<Self, BridgeError> {
        match options.mode.as_deref() {
            Some(RUNTIME_MODE_TEST) => {}
            other => return Err(BridgeError::wrong_mode(other)),
        }

        let manifest = read_manifest(&options.cwd)?;
        let config = server.load_and_validate_config(
            &options.cwd,
            DevOverrides::for_test_runner(),
            &manifest,
        )?;

        Ok(Self {
            server,
            cwd: options.cwd,
            manifest,
            config,
            is_test_file: options
                .is_test_file
                .unwrap_or_else(|| Arc::new(is_test_file_path)),
            handle: OnceLock::new(),
        })
    }

    /// The resolved server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The parsed project manifest.
    #[must_use]
    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    fn handle(&self, hook: &'static str) -> Result<&ServerHandle, BridgeError> {
        self.handle.get().ok_or(BridgeError::NotStarted { hook })
    }
}

impl<S: DevServer> RunnerPlugin for BridgePlugin<S> {
    fn name(&self) -> &str {
        "dev-server-bridge"
    }

    async fn server_start(&self, ctx: ServerStartContext<'_>) -> Result<(), BridgeError> {
        for dir in self.config.mount.keys() {
            ctx.file_watcher.watch(dir);
        }

        let handle = self
            .server
            .start(StartArgs {
                cwd: &self.cwd,
                config: &self.config,
                lockfile: None,
                manifest: &self.manifest,
            })
            .await?;

        if self.handle.set(handle).is_err() {
            return Err(BridgeError::AlreadyStarted);
        }

        info!(mounts = self.config.mount.len(), "dev server started");
        Ok(())
    }

    async fn server_stop(&self) -> Result<(), BridgeError> {
        let handle = self.handle("server_stop")?;
        (handle.shutdown)().await?;
        info!("dev server stopped");
        Ok(())
    }

    async fn serve(&self, request: &ServeRequest) -> Result<String, BridgeError> {
        let is_test_file = request.url.contains(TEST_FILE_MARKER);
        let req_path = strip_query(&request.url);
        let handle = self.handle("serve")?;

        let body =
            (handle.load_by_url)(req_path.to_string(), LoadOptions { is_ssr: false }).await?;

        if is_test_file {
            debug!(url = %request.url, "injecting test setup snippet");
            Ok(format!("{TEST_RUNNER_SETUP}\n\n{body}"))
        } else {
            Ok(body)
        }
    }

    async fn transform_import(
        &self,
        import: ImportRequest<'_>,
    ) -> Result<Option<String>, BridgeError> {
        if !(self.is_test_file)(import.source) {
            return Ok(None);
        }

        // Specifiers are root-relative; anchor them at the project root.
        let req_path = strip_query(import.source);
        let source_path = self.cwd.join(req_path.trim_start_matches('/'));

        let mounted = self
            .server
            .url_for_file(&source_path, &self.config)
            .ok_or_else(|| BridgeError::NotMounted {
                specifier: import.source.to_string(),
            })?;

        debug!(source = import.source, url = %mounted, "rewrote test-file import");
        Ok(Some(format!("{mounted}{TEST_FILE_MARKER}")))
    }
}
