//! Test fixtures - module trees on disk

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway project directory, removed on drop
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Create a project from `(relative path, contents)` pairs
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let project = Self::new();
        for (path, contents) in files {
            project.write(path, contents);
        }
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture directory");
        }
        fs::write(&path, contents).expect("failed to write fixture file");
        path
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.join(relative)).expect("failed to remove fixture file");
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}

/// `main.luau` importing `./util`, which imports nothing
pub fn simple_project() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "main.luau",
            "local util = import(\"./util\")\nprint(util.greet(\"world\"))\n",
        ),
        (
            "util.luau",
            "local M = {}\nfunction M.greet(name)\n    return \"hello \" .. name\nend\nreturn M\n",
        ),
    ]
}

/// main -> {b, c}, b -> d, c -> d
pub fn diamond_project() -> Vec<(&'static str, &'static str)> {
    vec![
        ("main.luau", "local b = import('./b')\nlocal c = import('./c')\n"),
        ("b.luau", "return { d = import('./shared/d') }\n"),
        ("c.luau", "return { d = import('./shared/d') }\n"),
        ("shared/d.luau", "local DIAMOND_BODY = 'd'\nreturn DIAMOND_BODY\n"),
    ]
}

/// main -> a -> b -> a
pub fn cyclic_project() -> Vec<(&'static str, &'static str)> {
    vec![
        ("main.luau", "import('./a')\n"),
        ("a.luau", "return import('./b')\n"),
        ("b.luau", "return import('./a')\n"),
    ]
}

/// A module whose body counts how often it runs
pub fn counter_project() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "main.luau",
            "local first = import('./counter')\nlocal second = import('./counter')\nassert(first == second)\n",
        ),
        (
            "counter.luau",
            "COUNTER_RUNS = (COUNTER_RUNS or 0) + 1\nreturn COUNTER_RUNS\n",
        ),
    ]
}
