use std::fs;

use super::helpers::{stderr, stdout, TestProject};

fn sample_project() -> TestProject {
    let project = TestProject::new();
    project.add_package("requests", "2.31.0", "Apache 2.0", &["Apache Software License"]);
    project.add_package("six", "1.16.0", "MIT", &[]);
    project.add_package("click", "8.1.7", "BSD-3-Clause", &[]);
    project
}

#[test]
fn test_plain_listing_sorted_by_name() {
    let project = sample_project();
    let output = project.run_auditor(&[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("Name") && lines[0].contains("License"));
    assert!(lines[1].contains("click") && lines[1].contains("BSD-3-Clause"));
    assert!(lines[2].contains("requests") && lines[2].contains("Apache Software License"));
    assert!(lines[3].contains("six") && lines[3].contains("1.16.0"));
}

#[test]
fn test_system_packages_hidden_by_default() {
    let project = sample_project();
    project.add_package("pip", "24.0", "MIT", &[]);
    project.add_package("setuptools", "69.0.0", "MIT", &[]);

    let output = project.run_auditor(&["--format", "csv"]);
    assert!(!stdout(&output).contains("\"pip\""));

    let output = project.run_auditor(&["--format", "csv", "--with-system"]);
    let stdout = stdout(&output);
    assert!(stdout.contains("\"pip\",\"24.0\",\"MIT\""));
    assert!(stdout.contains("\"setuptools\""));
}

#[test]
fn test_from_all_shows_both_sources() {
    let project = sample_project();
    let output = project.run_auditor(&["--from", "all", "--format", "json"]);
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let requests = parsed
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["Name"] == "requests")
        .unwrap();
    assert_eq!(requests["License-Metadata"], "Apache 2.0");
    assert_eq!(requests["License-Classifier"], "Apache Software License");
    assert!(requests.get("License").is_none());
}

#[test]
fn test_summary_counts_licenses() {
    let project = TestProject::new();
    project.add_package("a", "1.0", "MIT", &[]);
    project.add_package("b", "1.0", "mit", &[]);
    project.add_package("c", "1.0", "BSD", &[]);
    project.add_package("d", "1.0", "MIT", &[]);

    let output = project.run_auditor(&["--summary", "--format", "csv"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        "\"Count\",\"License\"\n\"1\",\"BSD\"\n\"2\",\"MIT\"\n\"1\",\"mit\""
    );
}

#[test]
fn test_fail_on_stops_with_single_diagnostic() {
    let project = sample_project();
    project.add_package("gplpkg", "3.0", "GPLv3", &["GNU General Public License v3 (GPLv3)"]);

    let output = project.run_auditor(&["--fail-on", "gnu general public license v3 (gplv3); AGPL"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert_eq!(
        stderr(&output).trim_end(),
        "fail-on license GNU General Public License v3 (GPLv3) was found for package gplpkg:3.0"
    );
}

#[test]
fn test_fail_on_partial_match() {
    let project = sample_project();
    project.add_package("gplpkg", "3.0", "GPLv3", &["GNU General Public License v3 (GPLv3)"]);

    let output = project.run_auditor(&["--fail-on", "General Public", "--partial-match"]);
    assert_eq!(output.status.code(), Some(1));

    let output = project.run_auditor(&["--fail-on", "General Public"]);
    assert!(output.status.success());
}

#[test]
fn test_allow_only_with_compound_license() {
    let project = TestProject::new();
    project.add_package("dual", "1.0", "", &["MIT License", "Apache Software License"]);

    let output = project.run_auditor(&["--allow-only", "MIT License;Apache Software License"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Apache Software License; MIT License"));

    // One allowed license is enough for a dual-licensed package
    let output = project.run_auditor(&["--allow-only", "MIT License"]);
    assert!(output.status.success());

    let output = project.run_auditor(&["--allow-only", "BSD License"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output).trim_end(),
        "license Apache Software License; MIT License not in allow-only licenses was found for package dual:1.0"
    );
}

#[test]
fn test_ignored_package_escapes_policy() {
    let project = sample_project();
    project.add_package("gplpkg", "3.0", "GPL", &[]);

    let output = project.run_auditor(&["--fail-on", "GPL", "--ignore-packages", "GPLPkg:3.0"]);
    assert!(output.status.success());
    assert!(!stdout(&output).contains("gplpkg"));

    // A version-qualified entry leaves other versions alone
    let output = project.run_auditor(&["--fail-on", "GPL", "--ignore-packages", "gplpkg:2.0"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_selected_packages_only() {
    let project = sample_project();
    let output = project.run_auditor(&["--format", "json", "--packages", "six", "Click"]);

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["Name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["click", "six"]);
}

#[test]
fn test_output_file() {
    let project = sample_project();
    let output = project.run_auditor(&["--format", "markdown", "--output-file", "licenses.md"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "created path: licenses.md");

    let written = fs::read_to_string(project.path().join("licenses.md")).unwrap();
    assert!(written.starts_with("| Name"));
    assert!(written.ends_with('\n'));
    assert!(written.contains("| six"));
}

#[test]
fn test_invalid_option_combination() {
    let project = sample_project();
    let output = project.run_auditor(&["--with-notice-file"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("--with-license-file"));

    let output = project.run_auditor(&["--filter-strings", "--filter-code-page", "klingon"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unknown_choice_in_pyproject_is_a_usage_error() {
    let project = sample_project();
    project.write_pyproject("[tool.pip-license-audit]\nfrom = \"spdx\"\n");

    let output = project.run_auditor(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("spdx"));
}

#[test]
fn test_missing_search_path_fails() {
    let project = sample_project();
    let output = project.run_auditor(&["--path", "typo/site-packages", "--fail-on", "MIT"]);

    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("typo/site-packages"));
}

#[test]
fn test_json_summary_counts_are_numbers() {
    let project = TestProject::new();
    project.add_package("a", "1.0", "MIT", &[]);
    project.add_package("b", "1.0", "MIT", &[]);

    let output = project.run_auditor(&["--summary", "--format", "json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed, serde_json::json!([{"Count": 2, "License": "MIT"}]));
}

#[test]
fn test_filter_strings_with_legacy_code_page() {
    let project = TestProject::new();
    project.add_package_metadata(
        "euro",
        "1.0",
        "Metadata-Version: 2.1\nName: euro\nVersion: 1.0\nLicense: MIT\nAuthor: Zoë € 日本\n",
    );

    let output = project.run_auditor(&["-a", "--format", "csv", "--filter-strings", "--filter-code-page", "cp1252"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("\"Zoë € \""));
}

#[test]
fn test_legacy_pkg_info_classifiers_drive_policy() {
    let project = TestProject::new();
    let egg_info = project.site_packages().join("legacy-0.9.egg-info");
    fs::create_dir_all(&egg_info).unwrap();
    fs::write(
        egg_info.join("PKG-INFO"),
        "Metadata-Version: 1.1\n\
         Name: legacy\n\
         Version: 0.9\n\
         License: UNKNOWN\n\
         Description: First paragraph\n        \n        Second paragraph\n\
         Classifier: License :: OSI Approved :: GNU General Public License (GPL)\n",
    )
    .unwrap();

    let output = project.run_auditor(&["--fail-on", "GNU General Public License (GPL)"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("legacy:0.9"));
}

#[test]
fn test_pyproject_defaults() {
    let project = sample_project();
    project.write_pyproject(
        r#"
[tool.pip-license-audit]
format = "jlf"
ignore-packages = ["requests"]
"#,
    );

    let output = project.run_auditor(&[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim_end(),
        r#"[{"licenses":["BSD-3-Clause"],"name":"click","version":"8.1.7"},{"licenses":["MIT"],"name":"six","version":"1.16.0"}]"#
    );

    // Command line wins over the file
    let output = project.run_auditor(&["--format", "csv"]);
    assert!(stdout(&output).starts_with("\"Name\",\"Version\",\"License\""));
}

#[test]
fn test_pyproject_policy_applies() {
    let project = sample_project();
    project.write_pyproject("[tool.pip-license-audit]\nfail-on = \"MIT\"\n");

    let output = project.run_auditor(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("for package six:1.16.0"));
}
