#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use networth_migrate::{
    config::StyleConfig,
    io_utils,
    sheet::{Sheet, Workbook},
};
use tempfile::{TempDir, tempdir};

/// Command for the built `networth-migrate` binary.
pub fn bin() -> Command {
    Command::cargo_bin("networth-migrate").expect("binary exists")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.file(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Saves `workbook` as xlsx under the workspace and returns the path.
    pub fn workbook(&self, name: &str, workbook: &Workbook) -> PathBuf {
        let path = self.file(name);
        io_utils::write_workbook(workbook, &path, &StyleConfig::default())
            .expect("write workbook fixture");
        path
    }

    pub fn legacy_workbook(&self) -> PathBuf {
        self.workbook(
            "portfolio.xlsx",
            &networth_migrate::sample::legacy_workbook(),
        )
    }
}

pub fn read(path: &Path) -> Workbook {
    io_utils::read_workbook(path).expect("read workbook")
}

pub fn sheet<'a>(workbook: &'a Workbook, name: &str) -> &'a Sheet {
    workbook
        .get(name)
        .unwrap_or_else(|| panic!("sheet '{name}' missing"))
}
