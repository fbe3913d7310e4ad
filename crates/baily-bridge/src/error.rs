use std::path::PathBuf;
use thiserror::Error;

use crate::server::ServerError;

/// Error type for the test-runner bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The runtime-mode flag was missing or not `test`.
    ///
    /// Raised synchronously at plugin construction, before any manifest read
    /// or server resource allocation.
    #[error(
        "NODE_ENV is {found} but must be \"test\" for the dev server to build files correctly.\n\
         To resolve:\n\
         \x20 1. set NODE_ENV=test at the top of your test-runner configuration (before all imports), or\n\
         \x20 2. prefix the test-runner invocation: NODE_ENV=test <command> ..."
    )]
    WrongMode {
        /// The value the flag actually had, or `unset`.
        found: String,
    },

    #[error("Failed to read package manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse package manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A test file's resolved path is covered by no mount.
    #[error("{specifier} could not be mounted!")]
    NotMounted { specifier: String },

    /// A request hook ran before `server_start` completed.
    #[error("{hook} called before server_start completed")]
    NotStarted { hook: &'static str },

    /// `server_start` was called a second time; the lifecycle is strictly
    /// uninitialized → running → stopped.
    #[error("server_start called twice")]
    AlreadyStarted,

    /// Error surfaced by the embedded dev server, passed through verbatim.
    #[error(transparent)]
    Server(#[from] ServerError),
}

impl BridgeError {
    /// Wrong-mode error from the observed flag value.
    #[must_use]
    pub fn wrong_mode(found: Option<&str>) -> Self {
        Self::WrongMode {
            found: found.map_or_else(|| "unset".to_string(), |mode| format!("{mode:?}")),
        }
    }
}
