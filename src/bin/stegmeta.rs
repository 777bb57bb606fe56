//! # stegmeta Binary Entry Point
//!
//! Thin command-line wrapper around [`MetadataEngine`] and [`BatchRunner`].
//!
//! ## Usage
//!
//! ```bash
//! stegmeta embed photo.png --data '{"author":"John Doe","year":2025}'
//! stegmeta extract photo_embedded.png
//! stegmeta verify photo_embedded.png --channel red
//! stegmeta update photo_embedded.png --data '{"year":2026}'
//! stegmeta batch ./images --op embed --data-file meta.json --output-dir ./out
//! ```
//!
//! Every command prints its result as JSON and exits with status 1 when the
//! operation did not succeed.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::path::{Path, PathBuf};

use stego_meta::batch::{collect_images, BatchOperation, BatchRunner};
use stego_meta::common::config::{load_config, StegoConfig};
use stego_meta::common::logging::init_logger;
use stego_meta::json::{self, Object};
use stego_meta::metadata::{MetadataEngine, OperationResult};
use stego_meta::processing::{BitPlane, ChannelSelection, TextEncoding};

/// Hide and recover key/value metadata in image pixels
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bit plane carrying the payload (1 = least significant)
    #[arg(long, global = true)]
    bit_plane: Option<u8>,

    /// Carrier channel: all, red, green, blue (or 0, 1, 2)
    #[arg(long, global = true)]
    channel: Option<String>,

    /// Text encoding of the payload: utf-8 or latin-1
    #[arg(long, global = true)]
    encoding: Option<String>,

    /// Frame magic number, decimal or 0x-prefixed hex
    #[arg(long, global = true, value_parser = parse_magic)]
    magic: Option<u32>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide metadata in an image (default output: <name>_embedded.png)
    Embed {
        image: PathBuf,
        #[command(flatten)]
        data: DataArgs,
        /// Output image path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the metadata hidden in an image
    Extract {
        image: PathBuf,
        /// Only return these keys
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,
    },
    /// Check whether an image carries metadata
    Verify { image: PathBuf },
    /// Merge keys into the hidden metadata (default output: overwrite)
    Update {
        image: PathBuf,
        #[command(flatten)]
        data: DataArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace hidden metadata with an empty document (default output: overwrite)
    Clear {
        image: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Copy hidden metadata from one image to another (default output: overwrite destination)
    Copy {
        source: PathBuf,
        destination: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add copyright, author and creation date entries
    Stamp {
        image: PathBuf,
        #[arg(long)]
        copyright: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long, requires = "author")]
        email: Option<String>,
        /// Creation date (YYYY-MM-DD) or "today"
        #[arg(long)]
        date: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show dimensions, capacity and hidden metadata
    Info { image: PathBuf },
    /// Apply one operation to many images
    Batch {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long, value_enum)]
        op: BatchOp,
        #[command(flatten)]
        data: OptionalDataArgs,
        /// Output directory for written images
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Number of images processed concurrently
        #[arg(long)]
        workers: Option<usize>,
        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct DataArgs {
    /// Metadata as JSON object text
    #[arg(long)]
    data: Option<String>,
    /// File containing the metadata JSON object
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
struct OptionalDataArgs {
    /// Metadata as JSON object text (embed / update)
    #[arg(long)]
    data: Option<String>,
    /// File containing the metadata JSON object (embed / update)
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BatchOp {
    Embed,
    Update,
    Clear,
    Verify,
    Extract,
}

fn parse_magic(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid magic '{s}': {e}"))
}

/// Read metadata text from `--data` or `--data-file` and parse it.
///
/// A parse failure becomes a failed [`OperationResult`] so it is reported the
/// same way as every other operation error.
fn load_metadata(data: Option<&str>, data_file: Option<&Path>) -> Result<Result<Object, OperationResult>> {
    let text = match (data, data_file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read metadata file {}", path.display()))?,
        (None, None) => return Ok(Ok(Object::new())),
    };
    Ok(json::parse(&text).map_err(|e| OperationResult::failed(e.into())))
}

fn parse_date(date: &str) -> Result<Option<NaiveDate>> {
    if date.eq_ignore_ascii_case("today") {
        return Ok(None);
    }
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{date}', expected YYYY-MM-DD"))?;
    Ok(Some(parsed))
}

fn build_config(cli: &Cli) -> Result<StegoConfig> {
    let mut config: StegoConfig = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StegoConfig::default(),
    };

    if let Some(plane) = cli.bit_plane {
        config.embedding.bit_plane = BitPlane::new(plane)?;
    }
    if let Some(channel) = &cli.channel {
        config.embedding.channel = channel.parse::<ChannelSelection>()?;
    }
    if let Some(encoding) = &cli.encoding {
        config.embedding.encoding = encoding.parse::<TextEncoding>()?;
    }
    if let Some(magic) = cli.magic {
        config.embedding.magic = magic;
    }
    Ok(config)
}

fn print_result(result: &OperationResult) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(result.success)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    init_logger(level);

    let config = build_config(&cli)?;
    let engine = MetadataEngine::new(config.embedding);

    let success = match cli.command {
        Command::Embed { image, data, output } => {
            match load_metadata(data.data.as_deref(), data.data_file.as_deref())? {
                Ok(metadata) => print_result(&engine.embed(&image, &metadata, output.as_deref()))?,
                Err(failed) => print_result(&failed)?,
            }
        }
        Command::Extract { image, keys } => {
            let result = if keys.is_empty() {
                engine.extract(&image)
            } else {
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                engine.extract_keys(&image, &keys)
            };
            print_result(&result)?
        }
        Command::Verify { image } => print_result(&engine.verify(&image))?,
        Command::Update { image, data, output } => {
            match load_metadata(data.data.as_deref(), data.data_file.as_deref())? {
                Ok(overrides) => print_result(&engine.update(&image, &overrides, output.as_deref()))?,
                Err(failed) => print_result(&failed)?,
            }
        }
        Command::Clear { image, output } => print_result(&engine.clear(&image, output.as_deref()))?,
        Command::Copy {
            source,
            destination,
            output,
        } => print_result(&engine.copy(&source, &destination, output.as_deref()))?,
        Command::Stamp {
            image,
            copyright,
            author,
            email,
            date,
            output,
        } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            let target = output.unwrap_or_else(|| image.clone());
            let mut current = image;
            let mut last = None;

            if let Some(copyright) = copyright {
                let result = engine.add_copyright(&current, &copyright, Some(&target));
                current = target.clone();
                last = Some(result);
            }
            if let Some(author) = author {
                if last.as_ref().map_or(true, |r| r.success) {
                    let result = engine.add_author_info(&current, &author, email.as_deref(), Some(&target));
                    current = target.clone();
                    last = Some(result);
                }
            }
            if let Some(date) = date {
                if last.as_ref().map_or(true, |r| r.success) {
                    last = Some(engine.add_creation_date(&current, date, Some(&target)));
                }
            }

            match last {
                Some(result) => print_result(&result)?,
                None => anyhow::bail!("stamp needs at least one of --copyright, --author, --date"),
            }
        }
        Command::Info { image } => match engine.image_info(&image) {
            Ok(info) => {
                println!("{}", serde_json::to_string_pretty(&info)?);
                true
            }
            Err(e) => print_result(&OperationResult::failed(e))?,
        },
        Command::Batch {
            inputs,
            op,
            data,
            output_dir,
            workers,
            report,
        } => {
            let mut batch_config = config.batch.clone();
            if let Some(dir) = output_dir {
                batch_config.output_dir = dir;
            }
            if let Some(workers) = workers {
                batch_config.workers = workers;
            }
            let report_path = report.or_else(|| batch_config.report.clone());

            let metadata = match load_metadata(data.data.as_deref(), data.data_file.as_deref())? {
                Ok(metadata) => metadata,
                Err(failed) => {
                    print_result(&failed)?;
                    std::process::exit(1);
                }
            };
            let operation = match op {
                BatchOp::Embed => BatchOperation::Embed(metadata),
                BatchOp::Update => BatchOperation::Update(metadata),
                BatchOp::Clear => BatchOperation::Clear,
                BatchOp::Verify => BatchOperation::Verify,
                BatchOp::Extract => BatchOperation::Extract,
            };

            let paths = collect_images(&inputs)?;
            let runner = BatchRunner::new(engine, batch_config);
            let batch_report = runner.run(paths, operation).await?;

            if let Some(path) = report_path {
                batch_report.export_to_json(&path)?;
                println!("Report exported to: {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(batch_report.entries())?);
            batch_report.all_succeeded()
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
