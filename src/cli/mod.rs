//! CLI argument parsing and validation module
//!
//! Handles command-line interface using clap, including:
//! - Polling interval
//! - Process name filters
//! - Output format selection (human/JSON)
//! - Quiet and verbose modes
//! - Optional configuration file

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use anyhow::{Context, Result};
use procwatch::config::MonitorConfiguration;
use procwatch::models::PollingConfiguration;

/// Fully resolved settings for one run of the tool
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub polling: PollingConfiguration,
    pub verbose: bool,
}

fn build_command() -> Command {
    Command::new("procwatch")
        .version(env!("PROCWATCH_VERSION"))
        .long_version(concat!(env!("PROCWATCH_VERSION"), " (", env!("GIT_HASH"), ")"))
        .about("Report processes as they start and terminate")
        .long_about(
            "Polls the local process table and prints a line for every process that starts or \
             terminates. Processes already running when monitoring begins are reported as started \
             on the first poll.",
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("SECONDS")
                .help("Delay between polls in seconds (0.1-300.0) [default: 1.0]")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .value_name("PATTERN")
                .help("Only report processes whose name matches (exact or glob, repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .help("Output one JSON object per line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress the startup banner and shutdown message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file [default: <config dir>/procwatch/config.toml if present]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log each polling cycle")
                .action(ArgAction::SetTrue),
        )
}

/// Parse command line arguments and return configuration
pub fn parse_args() -> Result<RunConfig> {
    resolve(&build_command().get_matches())
}

/// Merge the configuration file with command-line overrides
fn resolve(matches: &ArgMatches) -> Result<RunConfig> {
    let mut file_config = match matches.get_one::<PathBuf>("config") {
        Some(path) => MonitorConfiguration::load_from_file(path)?,
        None => MonitorConfiguration::load_default()
            .context("Failed to load default configuration")?,
    };

    if let Some(interval) = matches.get_one::<f64>("interval") {
        file_config.monitor.poll_interval = *interval;
    }
    if let Some(names) = matches.get_many::<String>("name") {
        file_config.output.name_filters = names.cloned().collect();
    }
    if matches.get_flag("json") {
        file_config.output.json = true;
    }
    if matches.get_flag("quiet") {
        file_config.output.quiet = true;
    }

    file_config.validate()?;

    Ok(RunConfig {
        polling: file_config.to_polling_configuration()?,
        verbose: matches.get_flag("verbose"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Resolve against an empty config file so the user's own config is ignored
    fn resolve_args(args: &[&str]) -> Result<RunConfig> {
        let empty = tempfile::NamedTempFile::new()?;
        let path = empty.path().to_string_lossy().to_string();
        let mut argv = vec!["procwatch", "--config", path.as_str()];
        argv.extend_from_slice(args);
        resolve(&build_command().try_get_matches_from(argv)?)
    }

    #[test]
    fn test_defaults() {
        let config = resolve_args(&[]).unwrap();
        assert_eq!(config.polling.interval, Duration::from_secs(1));
        assert!(config.polling.name_filters.is_empty());
        assert!(!config.polling.output_json);
        assert!(!config.polling.quiet_mode);
        assert!(!config.verbose);
    }

    #[test]
    fn test_flags_override() {
        let config = resolve_args(&["--interval", "0.5", "-n", "sleep", "-n", "py*", "--json", "-q", "-v"]).unwrap();
        assert_eq!(config.polling.interval, Duration::from_millis(500));
        assert_eq!(config.polling.name_filters, vec!["sleep", "py*"]);
        assert!(config.polling.output_json);
        assert!(config.polling.quiet_mode);
        assert!(config.verbose);
    }

    #[test]
    fn test_interval_bounds() {
        assert!(resolve_args(&["--interval", "0.05"]).is_err());
        assert!(resolve_args(&["--interval", "300.5"]).is_err());
        assert!(resolve_args(&["--interval", "0.1"]).is_ok());
        assert!(resolve_args(&["--interval", "300"]).is_ok());
    }

    #[test]
    fn test_invalid_name_pattern() {
        assert!(resolve_args(&["--name", "bash["]).is_err());
    }
}
