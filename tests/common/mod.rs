#![allow(dead_code)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test helper for running sitedist commands with less boilerplate
pub struct SitedistTest {
    cmd: Command,
}

pub fn sitedist_command() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("sitedist"))
}

impl SitedistTest {
    pub fn new() -> Self {
        Self {
            cmd: sitedist_command(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn arg<S: AsRef<std::ffi::OsStr>>(mut self, arg: S) -> Self {
        self.cmd.arg(arg);
        self
    }

    /// Feed `input` to the command's stdin
    pub fn stdin(mut self, input: &str) -> Self {
        self.cmd.write_stdin(input.to_string());
        self
    }

    pub fn assert_success(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert().success()
    }

    pub fn assert_success_contains(mut self, text: &str) -> assert_cmd::assert::Assert {
        self.cmd
            .assert()
            .success()
            .stdout(predicate::str::contains(text))
    }

    pub fn assert_success_contains_all(mut self, texts: &[&str]) -> assert_cmd::assert::Assert {
        let mut assertion = self.cmd.assert().success();
        for text in texts {
            assertion = assertion.stdout(predicate::str::contains(*text));
        }
        assertion
    }

    pub fn assert_failure(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert().failure()
    }

    /// Assert the command fails with `text` somewhere in stderr
    pub fn assert_error_contains(mut self, text: &str) -> assert_cmd::assert::Assert {
        self.cmd
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains(text))
    }

    pub fn get_output(mut self) -> std::process::Output {
        self.cmd.output().unwrap()
    }

    /// Run the command and return stdout as lines
    pub fn stdout_lines(self) -> Vec<String> {
        let output = self.get_output();
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Origin used throughout the integration tests
pub const ORIGIN: [&str; 2] = ["52.0", "13.4"];

/// Quick helper for a single measurement, options go before positional args
pub fn measure_test(options: &[&str], target_lat: &str, target_lon: &str) -> SitedistTest {
    SitedistTest::new()
        .args(options)
        .args(ORIGIN)
        .args([target_lat, target_lon, "measure"])
}

/// Sites around [`ORIGIN`] at known distances:
/// Luckenwalde 18.649 km, Zossen 24.344 km, Königs Wusterhausen 36.877 km,
/// Potsdam 49.185 km, Berlin Mitte 57.841 km, Cottbus 69.212 km.
pub const SITES_CSV: &str = "\
# lat,lon,name,category
52.2167,13.45,Zossen,Waste
52.09,13.17,Luckenwalde,
52.39,13.06,Potsdam,Power Plants

52.3,13.63,Königs Wusterhausen,Power Plants,Waste
52.52,13.405,Berlin Mitte,Chemicals
51.76,14.33,Cottbus,Power Plants
";

/// A temporary input file that lives as long as the returned value
pub struct TempInput {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TempInput {
    pub fn new(name: &str, contents: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        Self { _dir: dir, path }
    }

    /// The `@path` argument for this file
    pub fn arg(&self) -> String {
        format!("@{}", self.path.display())
    }
}

/// Quick helper for the sites command on [`SITES_CSV`]
pub fn sites_test(sites: &TempInput, options: &[&str]) -> SitedistTest {
    SitedistTest::new()
        .args(ORIGIN)
        .arg(sites.arg())
        .arg("sites")
        .args(options)
}
