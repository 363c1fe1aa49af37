use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pkgscope::config::Config;
use pkgscope::error::ScanError;
use pkgscope::ir::Feature;
use pkgscope::output::OutputFormat;
use pkgscope::{ScanOptions, CONFIG_FILE_NAME};

#[derive(Parser)]
#[command(
    name = "pkgscope",
    about = "Static feature extractor for Python packages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the feature vector of an unpacked Python package
    Scan {
        /// Path to the package directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c', env = "PKGSCOPE_CONFIG")]
        config: Option<PathBuf>,

        /// Output format (console, csv, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Also write the positions document (feature -> source spans) here
        #[arg(long)]
        positions: Option<PathBuf>,
    },

    /// List every feature in table order
    ListFeatures {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter pkgscope.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            path,
            config,
            format,
            output,
            positions,
        } => cmd_scan(path, config, format, output, positions),
        Commands::ListFeatures { format } => cmd_list_features(format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn cmd_scan(
    path: PathBuf,
    config: Option<PathBuf>,
    format_str: String,
    output_path: Option<PathBuf>,
    positions_path: Option<PathBuf>,
) -> Result<i32, ScanError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let options = ScanOptions {
        config_path: config,
        format,
    };

    let report = pkgscope::scan(&path, &options)?;
    let rendered = pkgscope::render_report(&report, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    if let Some(out) = positions_path {
        let positions = pkgscope::render_positions(&report)?;
        std::fs::write(&out, positions)
            .map_err(|e| ScanError::Output(format!("{}: {}", out.display(), e)))?;
    }

    Ok(0)
}

#[derive(Serialize)]
struct FeatureInfo {
    name: String,
    indicator: &'static str,
    context: String,
    description: &'static str,
}

fn cmd_list_features(format_str: String) -> Result<i32, ScanError> {
    let features: Vec<FeatureInfo> = Feature::all()
        .map(|f| FeatureInfo {
            name: f.name(),
            indicator: f.indicator.as_str(),
            context: f.context.suffix().trim_start_matches("in_").to_string(),
            description: f.indicator.description(),
        })
        .collect();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&features)?;
            println!("{}", json);
        }
        _ => {
            println!("{:<44} {:<16} DESCRIPTION", "FEATURE", "CONTEXT");
            println!("{}", "-".repeat(96));
            for feature in &features {
                println!(
                    "{:<44} {:<16} {}",
                    feature.name, feature.context, feature.description
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, ScanError> {
    let path = PathBuf::from(CONFIG_FILE_NAME);

    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", CONFIG_FILE_NAME);
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {}", CONFIG_FILE_NAME);

    Ok(0)
}
