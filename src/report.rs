use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::audit::{ResolvedPackage, RowSink};
use crate::config::Settings;
use crate::error::ConfigError;
use crate::license::{join_licenses, LicenseSet, ResolutionStrategy};
use crate::output::OutputFormat;

/// A column of the license table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Version,
    License,
    LicenseMetadata,
    LicenseClassifier,
    LicenseFile,
    LicenseText,
    NoticeFile,
    NoticeText,
    Author,
    Maintainer,
    Description,
    Url,
    Count,
}

impl Field {
    pub fn header(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Version => "Version",
            Field::License => "License",
            Field::LicenseMetadata => "License-Metadata",
            Field::LicenseClassifier => "License-Classifier",
            Field::LicenseFile => "LicenseFile",
            Field::LicenseText => "LicenseText",
            Field::NoticeFile => "NoticeFile",
            Field::NoticeText => "NoticeText",
            Field::Author => "Author",
            Field::Maintainer => "Maintainer",
            Field::Description => "Description",
            Field::Url => "URL",
            Field::Count => "Count",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One output row: field values keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: IndexMap<Field, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    /// Value of `field`, empty when the row does not carry it.
    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }
}

impl RowSink for Vec<Row> {
    fn accept(&mut self, package: ResolvedPackage) {
        self.push(package.to_row());
    }
}

/// Number of packages per distinct license set, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseCounter {
    counts: IndexMap<String, usize>,
}

impl LicenseCounter {
    /// Count one package under the canonical rendering of its license set.
    pub fn add(&mut self, licenses: &LicenseSet) {
        *self.counts.entry(join_licenses(licenses)).or_insert(0) += 1;
    }

    pub fn counts(&self) -> &IndexMap<String, usize> {
        &self.counts
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.counts
            .into_iter()
            .map(|(license, count)| {
                Row::new()
                    .with(Field::Count, count.to_string())
                    .with(Field::License, license)
            })
            .collect()
    }
}

impl RowSink for LicenseCounter {
    fn accept(&mut self, package: ResolvedPackage) {
        self.add(&package.licenses);
    }
}

/// Column chosen with `--order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    Count,
    License,
    #[default]
    Name,
    Author,
    Maintainer,
    Url,
}

impl OrderBy {
    pub const CHOICES: &'static str = "count, license, name, author, maintainer, url";
}

impl FromStr for OrderBy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count" | "c" => Ok(OrderBy::Count),
            "license" | "l" => Ok(OrderBy::License),
            "name" | "n" => Ok(OrderBy::Name),
            "author" | "a" => Ok(OrderBy::Author),
            "maintainer" | "m" => Ok(OrderBy::Maintainer),
            "url" | "u" => Ok(OrderBy::Url),
            _ => Err(ConfigError::UnknownChoice {
                option: "order",
                value: s.to_string(),
                choices: Self::CHOICES,
            }),
        }
    }
}

/// Columns to print, in order.
pub fn output_fields(settings: &Settings) -> Vec<Field> {
    if settings.summary {
        return vec![Field::Count, Field::License];
    }

    let mut fields = vec![Field::Name];
    if !settings.no_version {
        fields.push(Field::Version);
    }

    if settings.from == ResolutionStrategy::All {
        fields.push(Field::LicenseMetadata);
        fields.push(Field::LicenseClassifier);
    } else {
        fields.push(Field::License);
    }

    if settings.with_authors {
        fields.push(Field::Author);
    }
    if settings.with_maintainers {
        fields.push(Field::Maintainer);
    }
    if settings.with_urls {
        fields.push(Field::Url);
    }
    if settings.with_description {
        fields.push(Field::Description);
    }

    if settings.with_license_file {
        if !settings.no_license_path {
            fields.push(Field::LicenseFile);
        }
        fields.push(Field::LicenseText);

        if settings.with_notice_file {
            fields.push(Field::NoticeText);
            if !settings.no_license_path {
                fields.push(Field::NoticeFile);
            }
        }
    }

    fields
}

/// Column the rows are sorted by. Author, maintainer and URL ordering only
/// apply when that column is printed.
pub fn sort_field(settings: &Settings) -> Field {
    match settings.order {
        OrderBy::Count if settings.summary => Field::Count,
        _ if settings.summary => Field::License,
        OrderBy::License => Field::License,
        OrderBy::Author if settings.with_authors => Field::Author,
        OrderBy::Maintainer if settings.with_maintainers => Field::Maintainer,
        OrderBy::Url if settings.with_urls => Field::Url,
        _ => Field::Name,
    }
}

/// Sort by `field`, breaking ties on the remaining columns in `fields` order.
pub fn sort_rows(rows: &mut [Row], field: Field, fields: &[Field]) {
    rows.sort_by(|a, b| {
        compare_field(a, b, field).then_with(|| {
            fields
                .iter()
                .map(|f| compare_field(a, b, *f))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    });
}

fn compare_field(a: &Row, b: &Row, field: Field) -> Ordering {
    if field == Field::Count {
        let count = |row: &Row| row.get(Field::Count).parse::<usize>().unwrap_or(0);
        return count(a).cmp(&count(b));
    }
    a.get(field).cmp(b.get(field))
}

/// Advice about option combinations that produce unhelpful output.
pub fn usage_warnings(settings: &Settings) -> Vec<String> {
    let mut warnings = Vec::new();

    if settings.with_license_file && settings.format != OutputFormat::Json {
        warnings.push("Due to the length of these fields, this option is best paired with --format=json.".to_string());
    }

    if settings.summary && (settings.with_authors || settings.with_urls) {
        warnings.push(
            "When using this option, only --order=count or --order=license has an effect for the --order option. \
             And using --with-authors and --with-urls will be ignored."
                .to_string(),
        );
    }

    warnings
}
