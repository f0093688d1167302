//! Provenance sidecars for CLI outputs.
//!
//! Every artifact `out/foo.csv` gets `out/foo.provenance.json` recording the
//! code revision, crate version, the arm configuration that produced it, the
//! command parameters and the callsite that wrote it.

use anyhow::{Context, Result};
use armsim::ArmCfg;
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What produced an artifact.
pub struct RunInfo {
    pub command: &'static str,
    pub arm: Value,
    pub params: Value,
}

impl RunInfo {
    pub fn new(command: &'static str, cfg: &ArmCfg, params: Value) -> Result<Self> {
        Ok(Self {
            command,
            arm: serde_json::to_value(cfg).context("serialising arm config")?,
            params,
        })
    }

    /// Provenance document for `outputs`.
    pub fn to_json(&self, outputs: &[&Path]) -> Value {
        json!({
            "code_rev": current_git_rev(),
            "armsim_version": armsim::VERSION,
            "command": self.command,
            "arm": self.arm,
            "params": self.params,
            "outputs": outputs.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>(),
        })
    }
}

/// Write `<artifact stem>.provenance.json` next to `artifact`.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, info: &RunInfo) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = sidecar_path(artifact);
    ensure_parent(&path)?;

    let callsite = Location::caller();
    let mut doc = info.to_json(&[artifact]);
    doc["callsite"] = json!({ "file": callsite.file(), "line": callsite.line() });
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "provenance written");
    Ok(path)
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display())),
        _ => Ok(()),
    }
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`,
/// else `"unknown"`.
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|s| !s.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_artifact() {
        let derived = sidecar_path(Path::new("/tmp/runs/train.csv"));
        assert_eq!(derived, Path::new("/tmp/runs/train.provenance.json"));
    }

    #[test]
    fn write_sidecar_records_config_and_outputs() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("nested").join("episodes.csv");
        let cfg = ArmCfg {
            seed: 11,
            ..ArmCfg::default()
        };
        let info = RunInfo::new("train", &cfg, json!({"episodes": 3})).unwrap();
        let path = write_sidecar(&artifact, &info).unwrap();
        assert!(path.exists());

        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["command"], "train");
        assert_eq!(parsed["arm"]["seed"], 11);
        assert_eq!(parsed["params"]["episodes"], 3);
        assert!(parsed["callsite"]["line"].is_u64());
    }
}
