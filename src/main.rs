//! Command-line interface for the NeXus to text converter.
//!
//! `convert` processes a folder, `file` a single scan, `log` writes the
//! experiment log.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::{error, info, LevelFilter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use nxs2txt::{
    BatchRunner, Converter, Error, HeaderPolicy, Hdf5Opener, LogConfig, ScanLogBuilder,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Convert B07 .nxs scan files to tab-separated text",
    long_about = "Converts B07 NeXus scan files into tab-separated .dat tables written next to each \
                  source file, and builds tab-separated experiment logs.\n\n\
                  Legacy (/entry1) files get column titles unless --titles-off is given; \
                  current (/entry) files only get them with --titles-on."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every .nxs file in a folder
    Convert {
        /// Folder containing .nxs files
        #[arg(value_name = "FOLDER")]
        folder: PathBuf,

        #[command(flatten)]
        titles: TitleFlags,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a single .nxs file
    File {
        /// Path of the .nxs file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        titles: TitleFlags,
    },
    /// Write an experiment log summarizing every .nxs file in a folder
    Log {
        /// Experiment folder (or subfolder) containing .nxs files
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,

        /// Where to save the log; defaults to the experiment folder
        #[arg(short, long, value_name = "OUT")]
        out: Option<PathBuf>,

        /// TOML file listing the log columns
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(ClapArgs, Debug, Clone, Copy)]
struct TitleFlags {
    /// Switch on column titles for current-layout files
    #[arg(long)]
    titles_on: bool,

    /// Switch off column titles for legacy-layout files
    #[arg(long)]
    titles_off: bool,
}

impl From<TitleFlags> for HeaderPolicy {
    fn from(flags: TitleFlags) -> Self {
        HeaderPolicy {
            titles_on: flags.titles_on,
            titles_off: flags.titles_off,
        }
    }
}

fn convert_folder(folder: &Path, header: HeaderPolicy, json: bool) -> Result<()> {
    info!("📂 Converting .nxs files in {}", folder.display());
    let start_time = Instant::now();

    let runner = BatchRunner::new(Hdf5Opener, Converter::new(header));
    let report = match runner.run(folder) {
        Ok(report) => report,
        Err(Error::InvalidInput(msg)) => {
            error!("{}", msg);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    info!("🏁 All files processed in {:.2?}", start_time.elapsed());
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
        println!("ALL ERRORS:");
        for line in &report.errors {
            println!("{}", line);
        }
    }

    Ok(())
}

fn convert_single(file: &Path, header: HeaderPolicy) -> Result<()> {
    if !file.is_file() {
        anyhow::bail!("'{}' is not a valid file", file.display());
    }
    info!("📄 Processing: {}", file.display());

    let report = Converter::new(header).convert_file(&Hdf5Opener, file)?;
    for reason in &report.skipped {
        info!("   ├─ Skipped: {}", reason);
    }
    info!("   └─ ✓ {} file(s) written", report.written.len());

    Ok(())
}

fn write_log(dir: &Path, out: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let config = match config {
        Some(path) => LogConfig::from_file(path)?,
        None => LogConfig::default(),
    };
    let out_dir = out.unwrap_or(dir);

    let report = ScanLogBuilder::new(Hdf5Opener, config).build(dir, out_dir)?;
    info!("📊 {} scan(s) logged to {}", report.rows, report.output.display());
    for line in &report.skipped {
        error!("   ✗ {}", line);
    }

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let args = Args::parse();

    match args.command {
        Command::Convert {
            folder,
            titles,
            json,
        } => convert_folder(&folder, titles.into(), json),
        Command::File { file, titles } => convert_single(&file, titles.into()),
        Command::Log { dir, out, config } => write_log(&dir, out.as_deref(), config.as_deref()),
    }
}
