#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use subtimeline::app_config::{self, Config};
use subtimeline::file_utils::FileManager;
use subtimeline::media_name;
use subtimeline::{SubtitleEntry, SubtitleTrack, TimelineCursor, TranslatedOverlay};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a subtitle file and print a summary or the normalized SRT
    Parse {
        /// Subtitle file to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the parsed track as SRT instead of a summary
        #[arg(long)]
        srt: bool,
    },

    /// Print the subtitle showing at a position
    At {
        /// Subtitle file to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Position in milliseconds or as HH:MM:SS,mmm
        #[arg(value_name = "TIME")]
        time: String,
    },

    /// Step through positions like a player polling loop, printing text changes
    Follow {
        /// Subtitle file to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// First position (ms or HH:MM:SS,mmm)
        #[arg(long)]
        from: Option<String>,

        /// Last position (ms or HH:MM:SS,mmm), defaults to the end of the track
        #[arg(long)]
        to: Option<String>,

        /// Step between positions in ms, defaults to the configured poll interval
        #[arg(long)]
        step: Option<u64>,

        /// Translated overlay (JSON object of index to text) to show instead
        #[arg(long)]
        overlay: Option<PathBuf>,
    },

    /// Apply a translated overlay and write the result as SRT
    Overlay {
        /// Original subtitle file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Overlay JSON object mapping entry index to translated text
        #[arg(value_name = "OVERLAY")]
        overlay: PathBuf,

        /// Output file; defaults to <movie>_translated.srt in the output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Movie name used for the default output file name
        #[arg(long)]
        movie_name: Option<String>,
    },

    /// Print the subtitle search query derived from a video file name
    Name {
        /// Video file name, e.g. The.Matrix.1999.1080p.BluRay.mkv
        #[arg(value_name = "FILE_NAME")]
        file_name: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subtimeline - SRT parsing and playback-position lookups
#[derive(Parser, Debug)]
#[command(name = "subtimeline")]
#[command(version)]
#[command(about = "Parse SRT subtitles and find the caption showing at any position")]
#[command(long_about = "subtimeline parses SRT subtitle files and resolves which caption is
showing at a playback position.

EXAMPLES:
    subtimeline parse movie.srt                      # Summary of the parsed track
    subtimeline parse --srt movie.srt                # Normalized SRT on stdout
    subtimeline at movie.srt 00:01:02,500            # Caption at a position
    subtimeline follow movie.srt --step 100          # Simulate a player polling loop
    subtimeline overlay movie.srt ro.json -o out.srt # Apply translated text
    subtimeline name The.Matrix.1999.1080p.mkv       # Subtitle search query

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtimeline", &mut std::io::stdout());
            Ok(())
        }
        Commands::Name { file_name } => {
            run_name(&file_name);
            Ok(())
        }
        command => {
            let config = load_config(&cli.config_path, cli.log_level)?;
            run_with_config(command, &config)
        }
    }
}

fn load_config(config_path: &str, cli_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = Config::load_or_create(config_path)?;

    if let Some(level) = cli_level {
        config.log_level = level.into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn run_with_config(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Parse { file, srt } => run_parse(&file, srt, config),
        Commands::At { file, time } => run_at(&file, &time, config),
        Commands::Follow { file, from, to, step, overlay } => {
            run_follow(&file, from.as_deref(), to.as_deref(), step, overlay.as_deref(), config)
        }
        Commands::Overlay { file, overlay, output, movie_name } => {
            run_overlay(&file, &overlay, output, movie_name, config)
        }
        Commands::Name { .. } | Commands::Completions { .. } => Ok(()),
    }
}

fn load_track(file: &Path, config: &Config) -> Result<SubtitleTrack> {
    let track = FileManager::try_read_subtitle_file(file, &config.subtitle.parse_options())?;
    if track.is_empty() {
        warn!("No subtitles found in {}", file.display());
    }
    Ok(track)
}

// Accepts plain milliseconds or an SRT timestamp
fn parse_position(value: &str) -> Result<u64> {
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse().map_err(|e| anyhow!("Invalid position '{}': {}", value, e));
    }
    SubtitleEntry::parse_timestamp(value).with_context(|| format!("Invalid position '{}'", value))
}

fn run_parse(file: &Path, srt: bool, config: &Config) -> Result<()> {
    let track = load_track(file, config)?;

    if srt {
        print!("{}", track.to_srt());
    } else {
        print!("{}", track);
        println!("Overlaps: {}", track.overlap_count());
    }

    Ok(())
}

fn run_at(file: &Path, time: &str, config: &Config) -> Result<()> {
    let track = load_track(file, config)?;
    let position = parse_position(time)?;

    match track.current_entry(position) {
        Some(entry) => print!("{}", entry),
        None => info!("No subtitle at {}", SubtitleEntry::format_timestamp(position)),
    }

    Ok(())
}

fn run_follow(
    file: &Path,
    from: Option<&str>,
    to: Option<&str>,
    step: Option<u64>,
    overlay_path: Option<&Path>,
    config: &Config,
) -> Result<()> {
    let track = load_track(file, config)?;
    let overlay = match overlay_path {
        Some(path) => TranslatedOverlay::from_file(path)?,
        None => TranslatedOverlay::new(),
    };

    let start = from.map(parse_position).transpose()?.unwrap_or(0);
    let end = match to {
        Some(value) => parse_position(value)?,
        None => track.iter().map(|entry| entry.end_time_ms).max().unwrap_or(0),
    };
    let step = step.unwrap_or(config.poll_interval_ms).max(1);

    debug!("Following {} from {} to {} every {} ms", file.display(), start, end, step);

    let mut cursor = TimelineCursor::new();
    let mut showing: Option<&str> = None;
    let mut position = start;

    while position <= end {
        let text = cursor
            .current_entry(&track, position)
            .map(|entry| overlay.text_for(entry));

        if text != showing {
            let stamp = SubtitleEntry::format_timestamp(position);
            match text {
                Some(text) => println!("[{}] {}", stamp, text.replace('\n', " / ")),
                None => println!("[{}] -", stamp),
            }
            showing = text;
        }

        position = match position.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(())
}

fn run_overlay(
    file: &Path,
    overlay_path: &Path,
    output: Option<PathBuf>,
    movie_name: Option<String>,
    config: &Config,
) -> Result<()> {
    let track = load_track(file, config)?;
    let overlay = TranslatedOverlay::from_file(overlay_path)?;
    let translated = track.with_overlay(&overlay);

    info!("Applied {} translations to {} entries", overlay.len(), track.len());

    let path = match output {
        Some(path) => {
            translated.write_to_srt(&path)?;
            path
        }
        None => {
            let movie_name = movie_name.unwrap_or_else(|| {
                let stem = file.file_stem().unwrap_or_default().to_string_lossy();
                media_name::clean_movie_name(&stem)
            });
            FileManager::save_translated(&translated, &movie_name, config.output_directory())?
        }
    };

    info!("Success: {}", path.display());
    Ok(())
}

fn run_name(file_name: &str) {
    let query = media_name::search_query(file_name);
    let title = media_name::clean_movie_name(file_name);
    println!("Search query: {}", query);
    println!("Translated file: {}", media_name::translated_file_name(&title));
}
