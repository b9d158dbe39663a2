/// Extract license names from trove classifiers.
///
/// "License :: OSI Approved :: MIT License" yields "MIT License". The bare
/// "License :: OSI Approved" declaration carries no license and is skipped.
pub fn find_license_from_classifier<S: AsRef<str>>(classifiers: &[S]) -> Vec<String> {
    classifiers
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|classifier| classifier.starts_with("License"))
        .filter_map(|classifier| classifier.split(" :: ").last())
        .filter(|license| *license != "OSI Approved")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_last_segment() {
        let classifiers = [
            "Development Status :: 5 - Production/Stable",
            "License :: OSI Approved :: MIT License",
            "License :: OSI Approved :: Apache Software License",
        ];
        assert_eq!(
            find_license_from_classifier(&classifiers),
            vec!["MIT License", "Apache Software License"]
        );
    }

    #[test]
    fn test_skips_bare_osi_approved() {
        let classifiers = ["License :: OSI Approved", "License :: Public Domain"];
        assert_eq!(find_license_from_classifier(&classifiers), vec!["Public Domain"]);
    }

    #[test]
    fn test_keeps_duplicates_in_order() {
        let classifiers = [
            "License :: OSI Approved :: BSD License",
            "License :: OSI Approved :: BSD License",
        ];
        assert_eq!(find_license_from_classifier(&classifiers).len(), 2);
    }

    #[test]
    fn test_no_license_classifiers() {
        let classifiers: [&str; 1] = ["Programming Language :: Python :: 3"];
        assert!(find_license_from_classifier(&classifiers).is_empty());
    }
}
