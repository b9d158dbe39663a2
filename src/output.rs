use std::collections::BTreeMap;
use std::str::FromStr;

use crate::audit::{AuditError, Auditor, PackageSource};
use crate::config::Settings;
use crate::error::ConfigError;
use crate::report::{output_fields, sort_field, sort_rows, Field, LicenseCounter, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    PlainVertical,
    Markdown,
    Rst,
    Confluence,
    Html,
    Json,
    JsonLicenseFinder,
    Csv,
}

impl OutputFormat {
    pub const CHOICES: &'static str =
        "plain, plain-vertical, markdown, rst, confluence, html, json, json-license-finder, csv";

    pub fn render(self, fields: &[Field], rows: &[Row]) -> String {
        match self {
            OutputFormat::Plain => format_grid(fields, rows, &GridStyle::PLAIN),
            OutputFormat::Markdown => format_grid(fields, rows, &GridStyle::MARKDOWN),
            OutputFormat::Rst => format_grid(fields, rows, &GridStyle::RST),
            OutputFormat::Confluence => format_grid(fields, rows, &GridStyle::CONFLUENCE),
            OutputFormat::PlainVertical => format_plain_vertical(fields, rows),
            OutputFormat::Html => format_html(fields, rows),
            OutputFormat::Json => format_json(fields, rows),
            OutputFormat::JsonLicenseFinder => format_json_license_finder(fields, rows),
            OutputFormat::Csv => format_csv(fields, rows),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "plain" | "p" => Ok(OutputFormat::Plain),
            "plain-vertical" => Ok(OutputFormat::PlainVertical),
            "markdown" | "md" | "m" => Ok(OutputFormat::Markdown),
            "rst" | "rest" | "r" => Ok(OutputFormat::Rst),
            "confluence" | "c" => Ok(OutputFormat::Confluence),
            "html" | "h" => Ok(OutputFormat::Html),
            "json" | "j" => Ok(OutputFormat::Json),
            "json-license-finder" | "jlf" => Ok(OutputFormat::JsonLicenseFinder),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(ConfigError::UnknownChoice {
                option: "format",
                value: s.to_string(),
                choices: Self::CHOICES,
            }),
        }
    }
}

/// Run the audit over `source` and render the result the way `settings` ask.
pub fn create_output_string(settings: &Settings, source: &dyn PackageSource) -> Result<String, AuditError> {
    let auditor = Auditor::from_settings(settings);
    let fields = output_fields(settings);

    let mut rows = if settings.summary {
        let mut counter = LicenseCounter::default();
        auditor.run(source, &mut counter)?;
        counter.into_rows()
    } else {
        let mut rows = Vec::new();
        auditor.run(source, &mut rows)?;
        rows
    };

    sort_rows(&mut rows, sort_field(settings), &fields);
    Ok(settings.format.render(&fields, &rows))
}

struct GridStyle {
    border: bool,
    junction: char,
    /// Rule under the header row.
    header_rule: bool,
    /// Rule above the header and after every row.
    all_rules: bool,
}

impl GridStyle {
    const PLAIN: GridStyle = GridStyle {
        border: false,
        junction: '+',
        header_rule: false,
        all_rules: false,
    };
    const MARKDOWN: GridStyle = GridStyle {
        border: true,
        junction: '|',
        header_rule: true,
        all_rules: false,
    };
    const RST: GridStyle = GridStyle {
        border: true,
        junction: '+',
        header_rule: true,
        all_rules: true,
    };
    const CONFLUENCE: GridStyle = GridStyle {
        border: true,
        junction: '|',
        header_rule: false,
        all_rules: false,
    };
}

/// Left-aligned table with one space of padding, in the style of the
/// classic `prettytable` layouts. Multi-line cells span several lines.
fn format_grid(fields: &[Field], rows: &[Row], style: &GridStyle) -> String {
    let header: Vec<String> = fields.iter().map(|f| f.header().to_string()).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| fields.iter().map(|f| row.get(*f).to_string()).collect())
        .collect();

    let widths: Vec<usize> = (0..fields.len())
        .map(|i| {
            std::iter::once(&header[i])
                .chain(body.iter().map(|cells| &cells[i]))
                .flat_map(|cell| cell.lines().map(|line| line.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = {
        let segments: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        let junction = style.junction.to_string();
        format!("{}{}{}", junction, segments.join(&junction), junction)
    };

    let mut lines = Vec::new();
    if style.all_rules {
        lines.push(rule.clone());
    }
    lines.extend(format_grid_row(&header, &widths, style.border));
    if style.header_rule {
        lines.push(rule.clone());
    }
    for cells in &body {
        lines.extend(format_grid_row(cells, &widths, style.border));
        if style.all_rules {
            lines.push(rule.clone());
        }
    }

    lines.join("\n")
}

fn format_grid_row(cells: &[String], widths: &[usize], border: bool) -> Vec<String> {
    let split: Vec<Vec<&str>> = cells
        .iter()
        .map(|cell| {
            let lines: Vec<&str> = cell.lines().collect();
            if lines.is_empty() {
                vec![""]
            } else {
                lines
            }
        })
        .collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(1);

    (0..height)
        .map(|n| {
            let padded: Vec<String> = split
                .iter()
                .zip(widths)
                .map(|(lines, width)| {
                    let text = lines.get(n).copied().unwrap_or("");
                    let fill = width.saturating_sub(text.chars().count());
                    format!(" {}{} ", text, " ".repeat(fill))
                })
                .collect();

            if border {
                format!("|{}|", padded.join("|"))
            } else {
                padded.concat()
            }
        })
        .collect()
}

fn format_plain_vertical(fields: &[Field], rows: &[Row]) -> String {
    let mut output = String::new();
    for row in rows {
        for field in fields {
            output.push_str(row.get(*field));
            output.push('\n');
        }
        output.push('\n');
    }
    output
}

fn format_html(fields: &[Field], rows: &[Row]) -> String {
    let mut output = String::from("<table>\n    <thead>\n        <tr>\n");
    for field in fields {
        output.push_str(&format!("            <th>{}</th>\n", escape_html(field.header())));
    }
    output.push_str("        </tr>\n    </thead>\n    <tbody>\n");
    for row in rows {
        output.push_str("        <tr>\n");
        for field in fields {
            let cell = escape_html(row.get(*field)).replace('\n', "<br>");
            output.push_str(&format!("            <td>{}</td>\n", cell));
        }
        output.push_str("        </tr>\n");
    }
    output.push_str("    </tbody>\n</table>");
    output
}

/// Escape markup and turn everything outside ASCII into numeric character
/// references.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c if c.is_ascii() => escaped.push(c),
            c => escaped.push_str(&format!("&#{};", c as u32)),
        }
    }
    escaped
}

fn format_json(fields: &[Field], rows: &[Row]) -> String {
    let objects: Vec<BTreeMap<&str, serde_json::Value>> = rows
        .iter()
        .map(|row| fields.iter().map(|f| (f.header(), json_cell(row, *f))).collect())
        .collect();
    serde_json::to_string_pretty(&objects).unwrap_or_else(|_| "[]".to_string())
}

/// Summary counts are numbers; every other cell is a string.
fn json_cell(row: &Row, field: Field) -> serde_json::Value {
    let value = row.get(field);
    match field {
        Field::Count => value
            .parse::<u64>()
            .map_or_else(|_| serde_json::Value::from(value), serde_json::Value::from),
        _ => serde_json::Value::from(value),
    }
}

/// The layout understood by LicenseFinder's decision files.
fn format_json_license_finder(fields: &[Field], rows: &[Row]) -> String {
    let objects: Vec<BTreeMap<&str, serde_json::Value>> = rows
        .iter()
        .map(|row| {
            let mut object = BTreeMap::new();
            for field in fields {
                match field {
                    Field::Name => {
                        object.insert("name", serde_json::Value::from(row.get(*field)));
                    }
                    Field::Version => {
                        object.insert("version", serde_json::Value::from(row.get(*field)));
                    }
                    Field::License => {
                        object.insert("licenses", serde_json::json!([row.get(*field)]));
                    }
                    _ => {}
                }
            }
            object
        })
        .collect();
    serde_json::to_string(&objects).unwrap_or_else(|_| "[]".to_string())
}

/// RFC 4180 CSV with every cell quoted.
fn format_csv(fields: &[Field], rows: &[Row]) -> String {
    let quote = |value: &str| format!("\"{}\"", value.replace('"', "\"\""));

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(fields.iter().map(|f| quote(f.header())).collect::<Vec<_>>().join(","));
    for row in rows {
        lines.push(fields.iter().map(|f| quote(row.get(*f))).collect::<Vec<_>>().join(","));
    }
    lines.join("\n")
}
