use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway project directory with a fake `site-packages` inside it.
pub struct TestProject {
    pub dir: TempDir,
    pub binary_path: String,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("site-packages")).expect("Failed to create site-packages");
        let binary_path = env!("CARGO_BIN_EXE_pip-license-audit").to_string();

        Self { dir, binary_path }
    }

    pub fn site_packages(&self) -> PathBuf {
        self.dir.path().join("site-packages")
    }

    /// Install a fake distribution with the given declared license and
    /// license classifiers. Returns its `.dist-info` directory.
    pub fn add_package(&self, name: &str, version: &str, license: &str, classifiers: &[&str]) -> PathBuf {
        let mut metadata = format!("Metadata-Version: 2.1\nName: {}\nVersion: {}\n", name, version);
        if !license.is_empty() {
            metadata.push_str(&format!("License: {}\n", license));
        }
        for classifier in classifiers {
            metadata.push_str(&format!("Classifier: License :: OSI Approved :: {}\n", classifier));
        }
        self.add_package_metadata(name, version, &metadata)
    }

    pub fn add_package_metadata(&self, name: &str, version: &str, metadata: &str) -> PathBuf {
        let dist_info = self
            .site_packages()
            .join(format!("{}-{}.dist-info", name.replace('-', "_"), version));
        fs::create_dir_all(&dist_info).expect("Failed to create dist-info");
        fs::write(dist_info.join("METADATA"), metadata).expect("Failed to write METADATA");
        dist_info
    }

    pub fn write_pyproject(&self, content: &str) {
        fs::write(self.dir.path().join("pyproject.toml"), content).expect("Failed to write pyproject.toml");
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run the binary inside the project, scanning only the fake site-packages.
    pub fn run_auditor(&self, args: &[&str]) -> Output {
        let site_packages = self.site_packages();
        Command::new(&self.binary_path)
            .arg("--path")
            .arg(&site_packages)
            .args(args)
            .current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run pip-license-audit")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
