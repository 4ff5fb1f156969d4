//! Shared fixtures for integration tests
//!
//! Fake CLIs are small `sh` scripts launched as `sh <script> ...`, so the script
//! file never needs the executable bit. Every script answers `--version` so the
//! availability preflight passes.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use kodegen_headless_cli::{CliProgram, EngineOptions, EngineOptionsBuilder, HeadlessEngine, ToolKind};
use tempfile::TempDir;

/// Prologue shared by every fake CLI
const PREFLIGHT: &str = r#"if [ "$1" = "--version" ]; then echo "fake-cli 1.0.0"; exit 0; fi"#;

/// A fixed UUID reported by fake CLIs
pub const SESSION_A: &str = "11111111-1111-1111-1111-111111111111";
/// A second UUID, distinct from [`SESSION_A`]
pub const SESSION_B: &str = "22222222-2222-2222-2222-222222222222";
/// A UUID used as a caller-supplied resume id
pub const SESSION_C: &str = "3f2c1a9e-5b7d-4e8f-9a0b-1c2d3e4f5a6b";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scratch directory that doubles as the only allowed root
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        init_logging();
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Canonical path of the sandbox
    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().expect("canonicalize sandbox")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Write a fake CLI whose body runs after the preflight prologue
    pub fn fake_cli(&self, name: &str, body: &str) -> CliProgram {
        let bin = self.path("bin");
        std::fs::create_dir_all(&bin).expect("create bin dir");
        let script = bin.join(name);
        std::fs::write(&script, format!("{PREFLIGHT}\n{body}\n")).expect("write fake cli");
        CliProgram::new("sh").arg(script.display().to_string())
    }

    /// Options confined to the sandbox with short timers
    pub fn options(&self) -> EngineOptionsBuilder {
        EngineOptions::builder()
            .allow_root(self.root())
            .default_working_dir(self.root())
            .session_timeout(Duration::from_secs(20))
            .preflight_timeout(Duration::from_secs(5))
            .kill_grace(Duration::from_millis(200))
    }

    /// Engine running `body` as `tool`
    pub fn engine(&self, tool: ToolKind, body: &str) -> HeadlessEngine {
        let program = self.fake_cli(tool.as_str(), body);
        HeadlessEngine::new(self.options().program(tool, program).build())
    }

    pub fn exists(&self, name: &str) -> bool {
        Path::new(&self.path(name)).exists()
    }
}
