// Command line interface module
// Parses arguments and runs each subcommand against a session

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand, ValueEnum};

use visual_compare::config::{AppSettings, ConfigStore, LogLevel, Namespaced};
use visual_compare::constants::DEFAULT_THUMBNAIL_SIZE;
use visual_compare::session::{CompareSession, SessionError};
use visual_compare::state::AnalysisOutcome;

/// visual-compare - compare images side by side, or two folders of same-named images
#[derive(Parser, Debug)]
#[command(name = "visual-compare")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log verbosity (overrides the saved setting; RUST_LOG overrides both)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Do not read or write the settings files
    #[arg(long, global = true)]
    pub no_config: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Match two folders by file name and list the pairs
    Compare {
        #[arg(value_name = "FOLDER_A")]
        folder_a: PathBuf,

        #[arg(value_name = "FOLDER_B")]
        folder_b: PathBuf,

        /// Number of pairs to list
        #[arg(long, default_value_t = 20)]
        show: usize,

        /// Load every pair, not just the first
        #[arg(long)]
        load_all: bool,

        /// Run the analysis on a worker thread and report its progress
        #[arg(long)]
        progress: bool,
    },

    /// Load individual image files and print their properties
    Files {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Generate a PNG thumbnail
    Thumbnail {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Longest edge in pixels
        #[arg(long, default_value_t = DEFAULT_THUMBNAIL_SIZE)]
        size: u32,

        /// Write the PNG here instead of printing the encoded length
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or reset the saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the current settings as JSON
    Show,
    /// Restore the default settings and save them
    Reset,
    /// Print the settings directory
    Path,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

/// Error type for the command runners
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to decode thumbnail: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Log level from the flag, else from the saved settings.
pub fn log_level(cli: &Cli, store: Option<&ConfigStore>) -> LogLevel {
    cli.log_level.map(LogLevel::from).unwrap_or_else(|| {
        store
            .map(|s| s.load_or_default::<AppSettings>().log_level)
            .unwrap_or_default()
    })
}

pub fn run(command: Command, session: &mut CompareSession) -> Result<(), CliError> {
    match command {
        Command::Compare {
            folder_a,
            folder_b,
            show,
            load_all,
            progress,
        } => compare(session, folder_a, folder_b, show, load_all, progress),
        Command::Files { files } => open_files(session, &files),
        Command::Thumbnail { file, size, output } => thumbnail(session, file, size, output),
        Command::Settings { action } => settings(session, action),
    }
}

fn compare(
    session: &mut CompareSession,
    folder_a: PathBuf,
    folder_b: PathBuf,
    show: usize,
    load_all: bool,
    progress: bool,
) -> Result<(), CliError> {
    session.set_folders(folder_a, folder_b);

    let outcome = if progress {
        analyze_with_progress(session)?
    } else {
        session.analyze_folders()?
    };

    let count = match outcome {
        AnalysisOutcome::Matched(count) => count,
        AnalysisOutcome::NoMatches => {
            println!("{}", session.folders().notice().unwrap_or_default());
            return Ok(());
        }
        AnalysisOutcome::Cancelled => {
            println!("Analysis cancelled");
            return Ok(());
        }
    };
    println!("{} matching files", count);

    if load_all {
        let mut failures = 0;
        for index in 0..count {
            if let Some(report) = session.go_to_pair(index as isize) {
                failures += report.failures.len();
            }
        }
        session.go_to_pair(0);
        let stats = session.cache_stats();
        println!(
            "Loaded {} pairs ({} failed sides), cache {} entries / {} bytes",
            count, failures, stats.count, stats.size
        );
    }

    for (index, pair) in session.folders().matches().iter().take(show).enumerate() {
        let dims = |file: &visual_compare::model::ImageFile| {
            if file.is_loaded() {
                format!("{}x{}", file.width, file.height)
            } else {
                "-".to_string()
            }
        };
        println!(
            "{:>5}  {}  [{} | {}]",
            index + 1,
            pair.file_name,
            dims(&pair.file_a),
            dims(&pair.file_b)
        );
    }
    if count > show {
        println!("  ... {} more", count - show);
    }

    if let Some(error) = session.folders().error() {
        eprintln!("{}", error);
    }
    Ok(())
}

fn analyze_with_progress(session: &mut CompareSession) -> Result<AnalysisOutcome, CliError> {
    session.start_analysis()?;

    let mut last_progress = None;
    loop {
        if let Some(result) = session.poll_analysis() {
            return Ok(result?);
        }

        let folders = session.folders();
        if last_progress != Some(folders.progress()) {
            last_progress = Some(folders.progress());
            println!("[{:>3}%] {}", folders.progress(), folders.loading_message());
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn open_files(session: &mut CompareSession, files: &[PathBuf]) -> Result<(), CliError> {
    let ids = session.open_files(files)?;

    for id in &ids {
        if let Some(file) = session.files().get(id) {
            println!(
                "{}  {}x{}  {} bytes  {}",
                file.name, file.width, file.height, file.size, file.mime_type
            );
        }
    }
    Ok(())
}

fn thumbnail(
    session: &mut CompareSession,
    file: PathBuf,
    size: u32,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let data = session.thumbnail(&file, size)?;

    match output {
        Some(path) => {
            let bytes = STANDARD.decode(data.as_bytes())?;
            fs::write(&path, &bytes).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            println!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => println!("{} base64 characters", data.len()),
    }
    Ok(())
}

fn settings(session: &mut CompareSession, action: SettingsAction) -> Result<(), CliError> {
    match action {
        SettingsAction::Show => println!("{}", session.settings().to_json()?),
        SettingsAction::Reset => {
            session.reset_settings();
            session.save()?;
            println!("Settings reset");
        }
        SettingsAction::Path => match session.config_store() {
            Some(store) => println!("{}", store.dir().display()),
            None => println!("Settings are not persisted"),
        },
    }
    Ok(())
}
