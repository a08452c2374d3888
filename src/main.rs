//! rlpager - terminal pager for growing files

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use rlpager::render::ScrollMode;
use rlpager::session::SessionRecord;
use rlpager::{Application, FileTarget, PagerConfig, SessionOptions};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

fn cli() -> Command {
    Command::new("rlpager")
        .version(rlpager::VERSION)
        .about("An interactive pager for growing log files")
        .long_about(
            "rlpager shows text files one page at a time while following whatever is \
             appended to them, with regex search, marks, tail/follow modes and filters.",
        )
        .arg(
            Arg::new("files")
                .help("Files to view; standard input is read when none are given")
                .num_args(0..)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("line-numbers")
                .short('n')
                .long("line-numbers")
                .help("Show line numbers")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ignore-case")
                .short('i')
                .long("ignore-case")
                .help("Case-insensitive search")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tail")
                .short('t')
                .long("tail")
                .help("Start in tail mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("follow"),
        )
        .arg(
            Arg::new("follow")
                .short('f')
                .long("follow")
                .help("Start in follow mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tail-poll")
                .long("tail-poll")
                .value_name("MS")
                .help("Tailer poll interval in milliseconds")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("max-line-length")
                .long("max-line-length")
                .value_name("BYTES")
                .help("Longest line kept for display")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("monochrome")
                .long("monochrome")
                .help("Use reverse video only")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Configuration file (TOML)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("session")
                .long("session")
                .value_name("PATH")
                .help("Write the session record here on exit")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("restore")
                .long("restore")
                .value_name("PATH")
                .help("Resume from a saved session record")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Write logs here (RUST_LOG selects the level)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

/// Logs must never reach the terminal the pager is drawing on
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}

fn load_config(matches: &ArgMatches) -> Result<PagerConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PagerConfig::load_from(path)?,
        None => PagerConfig::load_default()?,
    };

    if matches.get_flag("line-numbers") {
        config.show_line_numbers = true;
    }
    if matches.get_flag("ignore-case") {
        config.case_insensitive = true;
    }
    if matches.get_flag("monochrome") {
        config.monochrome = true;
    }
    if let Some(ms) = matches.get_one::<u64>("tail-poll") {
        config.tail_poll_ms = *ms;
    }
    if let Some(bytes) = matches.get_one::<usize>("max-line-length") {
        config.max_line_length = *bytes;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_one::<PathBuf>("log-file").map(PathBuf::as_path))?;
    let config = load_config(&matches)?;

    let restore = match matches.get_one::<PathBuf>("restore") {
        Some(path) => Some(
            SessionRecord::load(path)
                .with_context(|| format!("cannot restore session from {}", path.display()))?,
        ),
        None => None,
    };

    let mut targets: Vec<FileTarget> = matches
        .get_many::<PathBuf>("files")
        .map(|files| files.cloned().map(FileTarget::Path).collect())
        .unwrap_or_default();

    if targets.is_empty() {
        match &restore {
            Some(record) if !record.path.as_os_str().is_empty() => {
                targets.push(FileTarget::Path(record.path.clone()));
            }
            _ if !std::io::stdin().is_terminal() => targets.push(FileTarget::Stdin),
            _ => anyhow::bail!("no input files (see --help)"),
        }
    }
    if !std::io::stdout().is_terminal() {
        anyhow::bail!("standard output is not a terminal");
    }

    let session = SessionOptions {
        session_path: matches.get_one::<PathBuf>("session").cloned(),
        restore,
    };

    let start_mode = if matches.get_flag("tail") {
        ScrollMode::Tail
    } else if matches.get_flag("follow") {
        ScrollMode::Follow
    } else {
        ScrollMode::None
    };

    Application::new(config, targets, session)
        .with_start_mode(start_mode)
        .run()
        .await
        .context("pager failed")?;

    Ok(())
}
