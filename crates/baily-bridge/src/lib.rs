#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(async_fn_in_trait)]

//! Bridge between an embedded dev server and a browser test runner.
//!
//! Implements the runner's plugin contract
//! (`server_start` / `server_stop` / `serve` / `transform_import`):
//! starts an in-process dev server from the project manifest, serves built
//! modules through the server's URL loader, injects a cleanup snippet into
//! test entry files, and rewrites test-file imports to their mounted URLs
//! tagged with the `?isTestFile=1` marker.
//!
//! The dev server itself stays behind the [`DevServer`] trait; this crate
//! never builds or bundles modules.

pub mod config;
pub mod env;
pub mod error;
pub mod manifest;
pub mod plugin;
pub mod server;
pub mod version;
pub mod watch;

pub use config::{ConfigError, DevOverrides, OpenMode, OutputMode, ServerConfig};
pub use error::BridgeError;
pub use manifest::{read_manifest, PackageManifest, MANIFEST_FILE};
pub use plugin::{
    is_test_file_path, BridgeOptions, BridgePlugin, ImportRequest, RunnerPlugin, ServeRequest,
    ServerStartContext, TestFilePredicate, TEST_FILE_MARKER, TEST_RUNNER_SETUP,
};
pub use server::{DevServer, LoadOptions, ServerError, ServerHandle, StartArgs};
pub use version::VERSION;
pub use watch::{NotifyRegistry, WatchRegistry};
