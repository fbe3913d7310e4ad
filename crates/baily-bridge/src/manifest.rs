//! Package manifest (`package.json`) reading.
//!
//! The bridge consumes a small slice of the manifest: identity, dependency
//! tables (handed to the embedded server at startup), and the inline
//! dev-server section carrying the mount table.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::BridgeError;

/// Manifest file name, resolved against the working directory.
pub const MANIFEST_FILE: &str = "package.json";

/// Project manifest, the subset the bridge consumes.
///
/// Unknown fields are ignored; real manifests carry plenty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// Package name.
    pub name: Option<String>,
    /// Package version.
    pub version: Option<String>,
    /// Runtime dependencies, name → version range.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Development dependencies, name → version range.
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
    /// Inline configuration for the embedded dev server.
    #[serde(default, rename = "devServer")]
    pub dev_server: DevServerSection,
}

/// The manifest's embedded dev-server section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevServerSection {
    /// Mount table: project directory → URL prefix.
    #[serde(default)]
    pub mount: BTreeMap<String, String>,
}

/// Read and parse the project manifest from `cwd`.
///
/// An absent or malformed manifest is a configuration error; the bridge
/// aborts construction rather than starting a server without one.
pub fn read_manifest(cwd: &Path) -> Result<PackageManifest, BridgeError> {
    let path = cwd.join(MANIFEST_FILE);

    let content = fs::read_to_string(&path).map_err(|source| BridgeError::ManifestRead {
        path: path.clone(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| BridgeError::ManifestParse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
                "name": "fixture-app",
                "version": "1.2.3",
                "dependencies": { "preact": "^10.0.0" },
                "devDependencies": { "web-test-runner": "^0.13.0" },
                "devServer": { "mount": { "src": "/_dist_", "public": "/" } },
                "scripts": { "test": "ignored" }
            }"#,
        )
        .unwrap();

        let manifest = read_manifest(dir.path()).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("fixture-app"));
        assert_eq!(manifest.version.as_deref(), Some("1.2.3"));
        assert_eq!(
            manifest.dependencies.get("preact").map(String::as_str),
            Some("^10.0.0")
        );
        assert_eq!(
            manifest.dev_server.mount.get("src").map(String::as_str),
            Some("/_dist_")
        );
    }

    #[test]
    fn test_read_manifest_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();

        let manifest = read_manifest(dir.path()).unwrap();
        assert_eq!(manifest.name, None);
        assert!(manifest.dependencies.is_empty());
        assert!(manifest.dev_server.mount.is_empty());
    }

    #[test]
    fn test_read_manifest_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_manifest(dir.path()).unwrap_err();
        assert!(matches!(err, BridgeError::ManifestRead { .. }));
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn test_read_manifest_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();

        let err = read_manifest(dir.path()).unwrap_err();
        assert!(matches!(err, BridgeError::ManifestParse { .. }));
    }
}
