use std::fs;

use super::helpers::{stdout, TestProject};

#[test]
fn test_license_and_notice_files_from_record() {
    let project = TestProject::new();
    let dist_info = project.add_package("bundled", "1.0.0", "Apache-2.0", &[]);
    fs::create_dir(dist_info.join("licenses")).unwrap();
    fs::write(dist_info.join("licenses").join("LICENSE"), "Apache License text").unwrap();
    fs::write(dist_info.join("licenses").join("NOTICE"), "Notice text").unwrap();
    fs::write(
        dist_info.join("RECORD"),
        "bundled/__init__.py,sha256=x,1\n\
         bundled-1.0.0.dist-info/licenses/LICENSE,sha256=y,19\n\
         bundled-1.0.0.dist-info/licenses/NOTICE,sha256=z,11\n\
         bundled-1.0.0.dist-info/RECORD,,\n",
    )
    .unwrap();

    let output = project.run_auditor(&["--with-license-file", "--with-notice-file", "--format", "json"]);
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let row = &parsed[0];
    assert_eq!(row["Name"], "bundled");
    assert_eq!(row["LicenseText"], "Apache License text");
    assert_eq!(row["NoticeText"], "Notice text");
    assert!(row["LicenseFile"].as_str().unwrap().ends_with("LICENSE"));
}

#[test]
fn test_project_urls_and_authors() {
    let project = TestProject::new();
    project.add_package_metadata(
        "described",
        "0.3",
        "Metadata-Version: 2.1\n\
         Name: described\n\
         Version: 0.3\n\
         Summary: Does things\n\
         Author-email: Dev <dev@example.com>\n\
         Project-URL: Repository, https://example.com/repo\n\
         License-Expression: MIT\n",
    );

    let output = project.run_auditor(&["-a", "-u", "-d", "--format", "csv"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        "\"Name\",\"Version\",\"License\",\"Author\",\"URL\",\"Description\"\n\
         \"described\",\"0.3\",\"MIT\",\"Dev <dev@example.com>\",\"https://example.com/repo\",\"Does things\""
    );
}
