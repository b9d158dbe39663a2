use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::fs;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pip_license_audit::audit::AuditError;
use pip_license_audit::config::load_config;
use pip_license_audit::license::{resolve_search_paths, SitePackages};
use pip_license_audit::output::create_output_string;
use pip_license_audit::report::usage_warnings;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config()?;
    // Invalid option values and combinations are usage errors (exit 2)
    let settings = match cli.into_settings(&config) {
        Ok(settings) => settings,
        Err(e) => Cli::command().error(ErrorKind::ArgumentConflict, e).exit(),
    };

    let search_paths = resolve_search_paths(&settings.paths, settings.python.as_deref())?;
    let source = SitePackages::new(search_paths);

    let output = match create_output_string(&settings, &source) {
        Ok(output) => output,
        Err(AuditError::Policy(violation)) => {
            eprintln!("{}", violation);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(path) = &settings.output_file {
        save_output(path, &output);
    }

    println!("{}", output);
    for warning in usage_warnings(&settings) {
        warn!("{}", warning);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Write the rendered output to `path` and exit; the listing is not printed.
fn save_output(path: &Path, output: &str) -> ! {
    let mut content = output.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }

    match fs::write(path, content) {
        Ok(()) => {
            println!("created path: {}", path.display());
            std::process::exit(0);
        }
        Err(e) => {
            warn!(path = %path.display(), "cannot write output file: {}", e);
            eprintln!("check path: --output-file");
            std::process::exit(1);
        }
    }
}
