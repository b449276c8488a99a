//! Common test utilities for popdocs integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never read the
//! user's `~/.config/popdocs/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::Path;
pub use tempfile::TempDir;

/// A test environment with isolated config and working directory.
///
/// Each `TestEnv` creates two temporary directories:
/// - `work_dir`: The working directory, holding `docs/` and `popdocs.kdl`
/// - `config_dir`: The system config directory (via `PD_CONFIG_DIR`)
///
/// The `pd()` method returns a `Command` that sets both per-invocation,
/// making tests parallel-safe.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a test environment holding the standard sample tree:
    ///
    /// ```text
    /// docs/
    ///   a.md
    ///   assets/logo.png
    ///   guide/deep/c.md
    ///   guide/d.md
    ///   sub/b.md
    /// ```
    pub fn with_docs() -> Self {
        let env = Self::new();
        env.write_doc("a.md");
        env.write_doc("assets/logo.png");
        env.write_doc("guide/deep/c.md");
        env.write_doc("guide/d.md");
        env.write_doc("sub/b.md");
        env
    }

    /// Get a Command for the pd binary with isolated config.
    pub fn pd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pd"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("PD_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("PD_SOURCE");
        cmd.env_remove("PD_LOG");
        cmd
    }

    /// Create a file under `docs/`, with parent directories.
    pub fn write_doc(&self, rel: &str) {
        let path = self.work_dir.path().join("docs").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("# {}\n", rel)).unwrap();
    }

    /// Write the project config file.
    pub fn write_project_config(&self, kdl: &str) {
        fs::write(self.work_dir.path().join("popdocs.kdl"), kdl).unwrap();
    }

    /// Write the system config file.
    pub fn write_system_config(&self, kdl: &str) {
        fs::write(self.config_dir.path().join("config.kdl"), kdl).unwrap();
    }

    /// Get the path to the working directory.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a command expecting success and parse its stdout as JSON.
pub fn run_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("Failed to run command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap()
}

/// Ids of a JSON array of objects carrying an `id` field.
pub fn ids(nodes: &serde_json::Value) -> Vec<String> {
    nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap().to_string())
        .collect()
}
