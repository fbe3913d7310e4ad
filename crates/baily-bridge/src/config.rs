//! Dev-server configuration for test-runner builds.
//!
//! Built once at bridge construction: the manifest's mount section merged
//! with the fixed test-runner overrides, validated, then treated as
//! immutable for the bridge's whole lifetime.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::manifest::PackageManifest;

/// Default mounts when the manifest has no mount section.
const DEFAULT_MOUNT: &[(&str, &str)] = &[("public", "/"), ("src", "/_dist_")];

/// Browser auto-launch behavior on server startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Never open a browser.
    None,
    /// Open the platform default browser.
    #[default]
    Default,
}

/// Console output mode of the dev server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Plain line-by-line output.
    Stream,
    /// Interactive terminal dashboard.
    #[default]
    Dashboard,
}

/// Dev-option overrides applied on top of the server's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevOverrides {
    /// Push rebuilt modules to connected clients.
    pub hmr: bool,
    /// Browser auto-launch behavior.
    pub open: OpenMode,
    /// Console output mode.
    pub output: OutputMode,
}

impl DevOverrides {
    /// The fixed overrides for test-runner builds: no reload pushes, no
    /// browser launch, plain streaming output.
    #[must_use]
    pub fn for_test_runner() -> Self {
        Self {
            hmr: false,
            open: OpenMode::None,
            output: OutputMode::Stream,
        }
    }
}

/// Error from merged-configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("mount directory may not be empty")]
    EmptyMountDir,

    #[error("mount directory must be relative to the project, got {dir}")]
    AbsoluteMountDir { dir: PathBuf },

    #[error("mount URL for {dir} must start with '/', got {url:?}")]
    BadUrlPrefix { dir: PathBuf, url: String },

    #[error("mount URL {url:?} is mapped from both {first} and {second}")]
    DuplicateUrlPrefix {
        url: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Validated dev-server configuration for a test-runner session.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Mount table: absolute project directory → URL prefix it is served
    /// under. Prefixes are stored without a trailing slash; the root mount
    /// is the empty string.
    pub mount: BTreeMap<PathBuf, String>,
    /// Dev options in effect for this session.
    pub dev_options: DevOverrides,
}

impl ServerConfig {
    /// Merge the manifest's mount section with `overrides` and validate.
    ///
    /// Mount directories are taken relative to `cwd`. A manifest with no
    /// mount section gets the server defaults: `public → /`, `src → /_dist_`.
    pub fn resolve(
        cwd: &Path,
        overrides: DevOverrides,
        manifest: &PackageManifest,
    ) -> Result<Self, ConfigError> {
        let raw: Vec<(String, String)> = if manifest.dev_server.mount.is_empty() {
            DEFAULT_MOUNT
                .iter()
                .map(|(dir, url)| ((*dir).to_string(), (*url).to_string()))
                .collect()
        } else {
            manifest
                .dev_server
                .mount
                .iter()
                .map(|(dir, url)| (dir.clone(), url.clone()))
                .collect()
        };

        let mut mount = BTreeMap::new();
        let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();

        for (dir, url) in raw {
            if dir.is_empty() {
                return Err(ConfigError::EmptyMountDir);
            }
            if Path::new(&dir).is_absolute() {
                return Err(ConfigError::AbsoluteMountDir { dir: dir.into() });
            }
            if !url.starts_with('/') {
                return Err(ConfigError::BadUrlPrefix {
                    dir: dir.into(),
                    url,
                });
            }

            let prefix = url.trim_end_matches('/').to_string();
            let abs = cwd.join(&dir);

            if let Some(first) = seen.insert(prefix.clone(), abs.clone()) {
                return Err(ConfigError::DuplicateUrlPrefix {
                    url,
                    first,
                    second: abs,
                });
            }
            mount.insert(abs, prefix);
        }

        Ok(Self {
            mount,
            dev_options: overrides,
        })
    }

    /// URL under which an absolute file path is served, if any mount covers
    /// it. The longest (most specific) matching mount wins.
    #[must_use]
    pub fn url_for_file(&self, path: &Path) -> Option<String> {
        let (dir, prefix) = self
            .mount
            .iter()
            .filter(|(dir, _)| path.starts_with(dir))
            .max_by_key(|(dir, _)| dir.as_os_str().len())?;

        let rel = path.strip_prefix(dir).ok()?;

        let mut url = prefix.clone();
        for component in rel.components() {
            url.push('/');
            url.push_str(&component.as_os_str().to_string_lossy());
        }
        if url.is_empty() {
            url.push('/');
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DevServerSection;

    fn manifest_with_mount(pairs: &[(&str, &str)]) -> PackageManifest {
        PackageManifest {
            dev_server: DevServerSection {
                mount: pairs
                    .iter()
                    .map(|(dir, url)| ((*dir).to_string(), (*url).to_string()))
                    .collect(),
            },
            ..PackageManifest::default()
        }
    }

    #[test]
    fn test_resolve_default_mounts() {
        let config = ServerConfig::resolve(
            Path::new("/proj"),
            DevOverrides::for_test_runner(),
            &PackageManifest::default(),
        )
        .unwrap();

        assert_eq!(
            config.mount.get(Path::new("/proj/public")).map(String::as_str),
            Some("")
        );
        assert_eq!(
            config.mount.get(Path::new("/proj/src")).map(String::as_str),
            Some("/_dist_")
        );
    }

    #[test]
    fn test_resolve_manifest_mounts() {
        let manifest = manifest_with_mount(&[("web", "/app/")]);
        let config = ServerConfig::resolve(
            Path::new("/proj"),
            DevOverrides::for_test_runner(),
            &manifest,
        )
        .unwrap();

        // Trailing slash is normalized away.
        assert_eq!(
            config.mount.get(Path::new("/proj/web")).map(String::as_str),
            Some("/app")
        );
    }

    #[test]
    fn test_resolve_rejects_bad_url_prefix() {
        let manifest = manifest_with_mount(&[("src", "dist")]);
        let err = ServerConfig::resolve(
            Path::new("/proj"),
            DevOverrides::for_test_runner(),
            &manifest,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::BadUrlPrefix { .. }));
    }

    #[test]
    fn test_resolve_rejects_duplicate_url_prefix() {
        let manifest = manifest_with_mount(&[("a", "/x"), ("b", "/x/")]);
        let err = ServerConfig::resolve(
            Path::new("/proj"),
            DevOverrides::for_test_runner(),
            &manifest,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateUrlPrefix { .. }));
    }

    #[test]
    fn test_resolve_rejects_absolute_mount_dir() {
        let manifest = manifest_with_mount(&[("/abs", "/x")]);
        let err = ServerConfig::resolve(
            Path::new("/proj"),
            DevOverrides::for_test_runner(),
            &manifest,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::AbsoluteMountDir { .. }));
    }

    #[test]
    fn test_url_for_file_maps_through_mount() {
        let config = ServerConfig::resolve(
            Path::new("/proj"),
            DevOverrides::for_test_runner(),
            &PackageManifest::default(),
        )
        .unwrap();

        assert_eq!(
            config.url_for_file(Path::new("/proj/src/__test__/foo.test.js")),
            Some("/_dist_/__test__/foo.test.js".to_string())
        );
        assert_eq!(
            config.url_for_file(Path::new("/proj/public/index.html")),
            Some("/index.html".to_string())
        );
        assert_eq!(config.url_for_file(Path::new("/proj/unmounted/a.js")), None);
    }

    #[test]
    fn test_url_for_file_prefers_longest_mount() {
        let manifest = manifest_with_mount(&[("src", "/_dist_"), ("src/vendor", "/vendor")]);
        let config = ServerConfig::resolve(
            Path::new("/proj"),
            DevOverrides::for_test_runner(),
            &manifest,
        )
        .unwrap();

        assert_eq!(
            config.url_for_file(Path::new("/proj/src/vendor/lib.js")),
            Some("/vendor/lib.js".to_string())
        );
        assert_eq!(
            config.url_for_file(Path::new("/proj/src/app.js")),
            Some("/_dist_/app.js".to_string())
        );
    }

    #[test]
    fn test_for_test_runner_overrides() {
        let overrides = DevOverrides::for_test_runner();
        assert!(!overrides.hmr);
        assert_eq!(overrides.open, OpenMode::None);
        assert_eq!(overrides.output, OutputMode::Stream);
    }
}
