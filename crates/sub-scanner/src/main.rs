mod config;
mod dns;
mod error;
mod files;
mod http;
mod model;
mod ports;
mod results;
mod scan;
mod wordlist;

pub use error::{Error, Result};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::{ScanConfig, DEFAULT_THREADS};
use scan::scan;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::results::ensure_dir;

fn main() -> Result<()> {
    let config = config_from_args(&cli().get_matches());

    // create filename
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let filename = format!("{}", timestamp);

    let log_dir = config.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    if config.save_logs {
        ensure_dir(&log_dir)?;
    }
    init_tracing_subscriber(config.verbose, config.save_logs, &log_dir, &filename);

    info!("Scanning {} (run_{})", config.target, timestamp);
    let (summary, saved) = scan(&config)?;
    println!("\n{}", summary);

    saved
}

fn cli() -> Command {
    Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .about("Discover subdomains from a wordlist, then probe their services and files")
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .value_name("TARGET")
                .help("Target domain, or a file with one domain per line")
                .required(true),
        )
        .arg(
            Arg::new("wordlist")
                .short('w')
                .long("wordlist")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to wordlist file"),
        )
        .arg(
            Arg::new("threads")
                .short('c')
                .long("threads")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("50")
                .help("Number of concurrent workers"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("File receiving found subdomains"),
        )
        .arg(
            Arg::new("output-dir")
                .short('d')
                .long("output-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Directory receiving services, files and extracted content"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show debug output and unresolved candidates"),
        )
        .arg(
            Arg::new("logs")
                .short('s')
                .long("logs")
                .action(ArgAction::SetTrue)
                .help("Save logs into a .log file"),
        )
        .arg_required_else_help(true)
}

fn config_from_args(args: &ArgMatches) -> ScanConfig {
    let mut config = ScanConfig::new(
        args.get_one::<String>("target")
            .cloned()
            .unwrap_or_default(),
    );
    config.wordlist = args.get_one::<PathBuf>("wordlist").cloned();
    config.threads = *args.get_one::<usize>("threads").unwrap_or(&DEFAULT_THREADS);
    config.output_file = args.get_one::<PathBuf>("output").cloned();
    config.output_dir = args.get_one::<PathBuf>("output-dir").cloned();
    config.verbose = args.get_flag("verbose");
    config.save_logs = args.get_flag("logs");
    config
}

// without RUST_LOG only this crate's events pass
fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
}

fn init_tracing_subscriber(verbose: bool, save_logs_file: bool, output_dir: &Path, filename: &str) {
    // RUST_LOG wins over the verbose flag
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    // base for the subscriber
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::CLOSE);

    if save_logs_file {
        let filename = format!("{}.log", filename);
        let file_appender = RollingFileAppender::new(Rotation::NEVER, output_dir, filename);
        let subscriber = subscriber
            .with_ansi(false)
            .with_file(false)
            .with_target(false)
            .with_writer(file_appender)
            .finish();

        // add log in terminal as an additional layer
        let stdout_layer = layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(true)
            .with_file(false)
            .with_target(false);

        tracing::subscriber::set_global_default(subscriber.with(stdout_layer))
            .expect("Unable to set global subscriber with 2 layer");
    } else {
        let subscriber = subscriber
            .with_ansi(true)
            .with_file(false)
            .with_target(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("Unable to set global subscriber");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ScanConfig {
        config_from_args(&cli().get_matches_from(args))
    }

    #[test]
    fn maps_arguments_to_config() {
        let config = parse(&["sub-scanner", "-t", "example.com", "-c", "8", "-d", "out", "-v"]);
        assert_eq!(config.target, "example.com");
        assert_eq!(config.threads, 8);
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert!(config.output_file.is_none());
        assert!(config.verbose);
        assert!(!config.save_logs);
    }

    #[test]
    fn missing_target_is_rejected() {
        assert!(cli().try_get_matches_from(["sub-scanner", "-w", "words.txt"]).is_err());
    }

    #[test]
    fn default_threads() {
        let config = parse(&["sub-scanner", "-t", "example.com"]);
        assert_eq!(config.threads, DEFAULT_THREADS);
        assert!(config.wordlist.is_none());
    }

    #[test]
    fn log_filter_is_scoped_to_this_crate() {
        assert_eq!(default_filter(true), "sub_scanner=debug");
        assert_eq!(default_filter(false), "sub_scanner=info");
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
    }
}
