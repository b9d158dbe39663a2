use anyhow::{Context, Result};
use glob::Pattern;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

use super::{find_license_from_classifier, PackageInfo, LICENSE_UNKNOWN};
use crate::audit::PackageSource;
use crate::filter::normalize_pkg_name;

const LICENSE_FILE_PATTERNS: &[&str] = &["LICEN[CS]E*", "COPYING*"];
const NOTICE_FILE_PATTERNS: &[&str] = &["NOTICE*"];

/// `Project-URL` labels tried, in order, when `Home-page` is absent.
const HOMEPAGE_LABELS: &[&str] = &["homepage", "source", "repository", "changelog", "bug tracker"];

/// Installed distributions found under a list of search paths.
#[derive(Debug, Clone)]
pub struct SitePackages {
    paths: Vec<PathBuf>,
}

impl SitePackages {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl PackageSource for SitePackages {
    /// Read every distribution, in search-path order. A name seen in an
    /// earlier path shadows the same name further down, as it does at import
    /// time.
    fn packages(&self) -> Result<Vec<PackageInfo>> {
        let mut dist_dirs = Vec::new();
        for path in &self.paths {
            if !path.is_dir() {
                debug!(path = %path.display(), "skipping missing search path");
                continue;
            }
            info!(path = %path.display(), "scanning for distributions");
            match list_distributions(path) {
                Ok(found) => dist_dirs.extend(found),
                Err(e) => warn!(path = %path.display(), "skipping unreadable search path: {:#}", e),
            }
        }

        let parsed: Vec<Option<PackageInfo>> = dist_dirs
            .par_iter()
            .map(|(root, dir)| match read_distribution(root, dir) {
                Ok(package) => package,
                Err(e) => {
                    warn!(path = %dir.display(), "unreadable distribution metadata: {:#}", e);
                    None
                }
            })
            .collect();

        let mut seen = HashSet::new();
        Ok(parsed
            .into_iter()
            .flatten()
            .filter(|package| {
                let first = seen.insert(normalize_pkg_name(&package.name));
                if !first {
                    debug!(package = %package.name, "shadowed by an earlier search path");
                }
                first
            })
            .collect())
    }
}

/// `(search path, metadata dir)` pairs for one search path, sorted by name.
fn list_distributions(root: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("Failed to list {}", root.display()))? {
        let entry = entry?;
        let file_name = entry.file_name();
        let name_str = file_name.to_string_lossy();
        if (name_str.ends_with(".dist-info") || name_str.ends_with(".egg-info")) && entry.path().is_dir() {
            dirs.push((root.to_path_buf(), entry.path()));
        }
    }
    dirs.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
    Ok(dirs)
}

/// Parse one `.dist-info` or `.egg-info` directory.
pub fn read_distribution(root: &Path, dist_dir: &Path) -> Result<Option<PackageInfo>> {
    let is_egg = dist_dir.extension().map_or(false, |ext| ext == "egg-info");
    let metadata_path = dist_dir.join(if is_egg { "PKG-INFO" } else { "METADATA" });
    if !metadata_path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(&metadata_path)
        .with_context(|| format!("Failed to read {}", metadata_path.display()))?;
    let metadata = Metadata::parse(&String::from_utf8_lossy(&bytes));

    let Some(name) = metadata.get("name") else {
        warn!(path = %metadata_path.display(), "metadata has no Name field");
        return Ok(None);
    };

    let mut package = PackageInfo::new(name, metadata.get("version").unwrap_or(LICENSE_UNKNOWN))
        .with_license(
            metadata
                .get("license-expression")
                .or_else(|| metadata.get("license"))
                .unwrap_or(LICENSE_UNKNOWN),
        )
        .with_classifiers(find_license_from_classifier(&metadata.get_all("classifier")));

    package.author = first_or_unknown(&[metadata.get("author"), metadata.get("author-email")]);
    package.maintainer = first_or_unknown(&[metadata.get("maintainer"), metadata.get("maintainer-email")]);
    package.home_page = extract_homepage(&metadata).unwrap_or_else(|| LICENSE_UNKNOWN.to_string());
    package.summary = first_or_unknown(&[metadata.get("summary")]);

    let files = installed_files(root, dist_dir, is_egg);
    (package.license_file, package.license_text) = find_included_file(&files, LICENSE_FILE_PATTERNS);
    (package.notice_file, package.notice_text) = find_included_file(&files, NOTICE_FILE_PATTERNS);

    Ok(Some(package))
}

fn first_or_unknown(candidates: &[Option<&str>]) -> String {
    candidates
        .iter()
        .flatten()
        .next()
        .map_or_else(|| LICENSE_UNKNOWN.to_string(), |value| value.to_string())
}

/// Core-metadata headers in declaration order. Keys are stored lower-cased.
#[derive(Debug, Default)]
pub struct Metadata {
    headers: Vec<(String, String)>,
}

impl Metadata {
    pub fn parse(content: &str) -> Self {
        let mut headers: Vec<(String, String)> = Vec::new();

        for line in content.lines() {
            // Whitespace-only lines still continue the previous header
            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = headers.last_mut() {
                    value.push('\n');
                    value.push_str(line.trim_start());
                }
                continue;
            }
            if line.is_empty() {
                break; // body starts
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.push((key.trim().to_lowercase(), value.trim().to_string()));
            }
        }

        Self { headers }
    }

    /// First value for `key`, even when it is empty.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// First non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, v)| k == key && !v.trim().is_empty())
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// `Home-page`, or the highest-priority `Project-URL` entry. A declared but
/// empty `Home-page` yields `None` without looking at `Project-URL`.
pub fn extract_homepage(metadata: &Metadata) -> Option<String> {
    if let Some(homepage) = metadata.first("home-page") {
        return (!homepage.trim().is_empty()).then(|| homepage.to_string());
    }

    let candidates: Vec<(String, &str)> = metadata
        .get_all("project-url")
        .into_iter()
        .filter_map(|entry| entry.split_once(','))
        .map(|(label, url)| (label.trim().to_lowercase(), url.trim()))
        .collect();

    HOMEPAGE_LABELS.iter().find_map(|wanted| {
        candidates
            .iter()
            .rev()
            .find(|(label, _)| label == wanted)
            .map(|(_, url)| url.to_string())
    })
}

/// Absolute paths of the files a distribution installed, in listed order.
fn installed_files(root: &Path, dist_dir: &Path, is_egg: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if is_egg {
        if let Ok(content) = fs::read_to_string(dist_dir.join("installed-files.txt")) {
            files.extend(content.lines().filter(|l| !l.trim().is_empty()).map(|l| dist_dir.join(l.trim())));
        } else if let Ok(content) = fs::read_to_string(dist_dir.join("SOURCES.txt")) {
            files.extend(content.lines().filter(|l| !l.trim().is_empty()).map(|l| root.join(l.trim())));
        }
    } else if let Ok(content) = fs::read_to_string(dist_dir.join("RECORD")) {
        files.extend(content.lines().filter_map(record_path).map(|p| root.join(p)));
    }

    // Metadata directories without a usable file list still bundle their
    // license files next to METADATA.
    if files.is_empty() {
        files.extend(list_files(dist_dir));
        files.extend(list_files(&dist_dir.join("licenses")));
    }

    files
}

fn list_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries.flatten().map(|e| e.path()).filter(|p| p.is_file()).collect();
    files.sort();
    files
}

/// First column of a RECORD line, unquoting it when needed.
fn record_path(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some(rest) = line.strip_prefix('"') {
        return rest.split_once('"').map(|(path, _)| path);
    }
    line.split(',').next()
}

/// Locate the first listed file whose base name matches one of `patterns`
/// and read it. Returns `(path, text)`, both `UNKNOWN` when nothing matches.
pub fn find_included_file(files: &[PathBuf], patterns: &[&str]) -> (String, String) {
    let patterns: Vec<Pattern> = patterns.iter().filter_map(|p| Pattern::new(p).ok()).collect();

    for file in files {
        let Some(base) = file.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !patterns.iter().any(|pattern| pattern.matches(base)) || !file.is_file() {
            continue;
        }
        match fs::read(file) {
            Ok(bytes) => {
                return (file.display().to_string(), String::from_utf8_lossy(&bytes).into_owned());
            }
            Err(e) => debug!(path = %file.display(), "cannot read included file: {}", e),
        }
    }

    (LICENSE_UNKNOWN.to_string(), LICENSE_UNKNOWN.to_string())
}

/// Resolve the site-packages directory for an explicit path, or the local
/// `.venv` when no path is given.
pub fn find_site_packages_path(path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("search path {} does not exist", path.display());
        }
        if path.join("site-packages").exists() {
            return Ok(path.join("site-packages"));
        }
        if path.file_name().map_or(false, |name| name == "site-packages") {
            return Ok(path);
        }
        if let Some(site_packages) = venv_site_packages(&path)? {
            return Ok(site_packages);
        }
        return Ok(path);
    }

    let venv_path = std::env::current_dir()?.join(".venv");
    if let Some(site_packages) = venv_site_packages(&venv_path)? {
        return Ok(site_packages);
    }

    anyhow::bail!("Could not find site-packages directory. Please specify with --path or --python")
}

fn venv_site_packages(venv_path: &Path) -> Result<Option<PathBuf>> {
    if !venv_path.exists() {
        return Ok(None);
    }

    // Unix-like systems
    let lib_path = venv_path.join("lib");
    if lib_path.is_dir() {
        for entry in fs::read_dir(&lib_path)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with("python") {
                let site_packages = entry.path().join("site-packages");
                if site_packages.exists() {
                    return Ok(Some(site_packages));
                }
            }
        }
    }

    // Windows
    let lib_path = venv_path.join("Lib").join("site-packages");
    if lib_path.exists() {
        return Ok(Some(lib_path));
    }

    Ok(None)
}

/// Directories to scan: explicit paths first, then the given interpreter's
/// `sys.path`, then `./.venv`, and finally whatever `python3` reports.
pub fn resolve_search_paths(paths: &[PathBuf], python: Option<&str>) -> Result<Vec<PathBuf>> {
    if !paths.is_empty() {
        return paths
            .iter()
            .map(|path| find_site_packages_path(Some(path.clone())))
            .collect();
    }

    if let Some(python) = python {
        return python_search_paths(python);
    }

    match find_site_packages_path(None) {
        Ok(site_packages) => Ok(vec![site_packages]),
        Err(e) => {
            debug!("no local virtualenv ({}), asking python3", e);
            python_search_paths("python3")
        }
    }
}

/// Ask a Python interpreter for its `sys.path`, isolated from the caller's
/// `PYTHONPATH` and `VIRTUAL_ENV`.
pub fn python_search_paths(executable: &str) -> Result<Vec<PathBuf>> {
    let script = "import sys; print(' '.join(filter(bool, sys.path)))";
    let output = Command::new(executable)
        .args(["-c", script])
        .env("PYTHONPATH", "")
        .env("VIRTUAL_ENV", "")
        .output()
        .with_context(|| format!("Failed to run python executable '{}'", executable))?;

    if !output.status.success() {
        anyhow::bail!(
            "'{}' exited with {}: {}",
            executable,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .map(PathBuf::from)
        .collect())
}
