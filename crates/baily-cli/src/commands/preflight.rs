//! `baily preflight` command implementation.
//!
//! Re-runs the checks the bridge performs at construction — runtime mode,
//! manifest, merged server configuration — and reports them all as a
//! diagnosis instead of failing on the first one.

use baily_bridge::env::{runtime_mode, RUNTIME_MODE_TEST, RUNTIME_MODE_VAR};
use baily_bridge::{read_manifest, DevOverrides, ServerConfig};
use miette::Result;
use std::path::Path;

/// Exit code for a failed preflight check.
const EXIT_VALIDATION_ERROR: i32 = 2;

/// One preflight check result.
struct Finding {
    check: &'static str,
    ok: bool,
    detail: String,
}

/// Run the preflight command.
pub fn run(cwd: &Path, json: bool) -> Result<()> {
    let (findings, config) = collect_findings(cwd);
    let all_ok = findings.iter().all(|finding| finding.ok);

    if json {
        print_json(&findings, config.as_ref(), all_ok);
    } else {
        print_human(&findings, config.as_ref());
    }

    if !all_ok {
        std::process::exit(EXIT_VALIDATION_ERROR);
    }
    Ok(())
}

fn collect_findings(cwd: &Path) -> (Vec<Finding>, Option<ServerConfig>) {
    let mut findings = Vec::new();

    let mode = runtime_mode();
    findings.push(Finding {
        check: "runtime-mode",
        ok: mode.as_deref() == Some(RUNTIME_MODE_TEST),
        detail: match &mode {
            Some(mode) => format!("{RUNTIME_MODE_VAR}={mode}"),
            None => format!("{RUNTIME_MODE_VAR} is unset"),
        },
    });

    let mut config = None;
    match read_manifest(cwd) {
        Ok(manifest) => {
            findings.push(Finding {
                check: "manifest",
                ok: true,
                detail: manifest
                    .name
                    .clone()
                    .unwrap_or_else(|| "unnamed package".to_string()),
            });

            match ServerConfig::resolve(cwd, DevOverrides::for_test_runner(), &manifest) {
                Ok(resolved) => {
                    findings.push(Finding {
                        check: "server-config",
                        ok: true,
                        detail: format!("{} mount(s)", resolved.mount.len()),
                    });
                    config = Some(resolved);
                }
                Err(err) => findings.push(Finding {
                    check: "server-config",
                    ok: false,
                    detail: err.to_string(),
                }),
            }
        }
        Err(err) => findings.push(Finding {
            check: "manifest",
            ok: false,
            detail: err.to_string(),
        }),
    }

    (findings, config)
}

fn display_prefix(url: &str) -> &str {
    if url.is_empty() {
        "/"
    } else {
        url
    }
}

fn print_human(findings: &[Finding], config: Option<&ServerConfig>) {
    for finding in findings {
        let status = if finding.ok { "ok  " } else { "FAIL" };
        println!("{status} {:<13} {}", finding.check, finding.detail);
    }

    if let Some(config) = config {
        for (dir, url) in &config.mount {
            println!("     mount {} -> {}", dir.display(), display_prefix(url));
        }
    }
}

fn print_json(findings: &[Finding], config: Option<&ServerConfig>, all_ok: bool) {
    let checks: Vec<_> = findings
        .iter()
        .map(|finding| {
            serde_json::json!({
                "check": finding.check,
                "ok": finding.ok,
                "detail": finding.detail,
            })
        })
        .collect();

    let mounts: Vec<_> = config
        .iter()
        .flat_map(|config| config.mount.iter())
        .map(|(dir, url)| {
            serde_json::json!({
                "dir": dir,
                "url": display_prefix(url),
            })
        })
        .collect();

    println!(
        "{}",
        serde_json::json!({ "ok": all_ok, "checks": checks, "mounts": mounts })
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_collect_findings_for_ready_project() {
        std::env::set_var(RUNTIME_MODE_VAR, RUNTIME_MODE_TEST);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "fixture-app" }"#,
        )
        .unwrap();

        let (findings, config) = collect_findings(dir.path());
        assert!(findings.iter().all(|finding| finding.ok));
        assert_eq!(config.unwrap().mount.len(), 2);

        std::env::remove_var(RUNTIME_MODE_VAR);
    }

    #[test]
    #[serial]
    fn test_collect_findings_flags_missing_manifest() {
        std::env::remove_var(RUNTIME_MODE_VAR);
        let dir = tempfile::tempdir().unwrap();

        let (findings, config) = collect_findings(dir.path());
        assert!(config.is_none());

        let mode = findings.iter().find(|f| f.check == "runtime-mode").unwrap();
        assert!(!mode.ok);

        let manifest = findings.iter().find(|f| f.check == "manifest").unwrap();
        assert!(!manifest.ok);
        assert!(manifest.detail.contains("package.json"));
    }
}
