use std::time::Duration;

use clap::Parser;
use concur_core::{Concurrency, RunConfig, StopPolicy, config::DEFAULT_TOKEN};
use concur_model::parse_duration;
use concur_observe::{LoggerConfig, LoggerFormat};

/// Run a command template once per target, concurrently, and report the outcomes as JSON.
#[derive(Parser, Debug)]
#[command(name = "concur")]
#[command(version)]
#[command(after_help = "Targets are read from stdin (whitespace separated) when none are given.")]
pub struct Cli {
    /// Command template; every occurrence of the token is replaced by a target
    pub command: String,

    /// Values substituted into the template, one job each
    pub targets: Vec<String>,

    /// Stop at the first job that exits 0
    #[arg(long, short = 'a')]
    pub any: bool,

    /// Stop at the first job that completes, whatever its exit code (wins over --any)
    #[arg(long, short = 'f')]
    pub first: bool,

    /// Concurrent jobs: cpu|1x, 2x, 0 for one per target, or a number
    #[arg(long, short = 'c', default_value = "0")]
    pub concurrent: Concurrency,

    /// Global timeout (e.g. 30s, 1m30s); 0 for none
    #[arg(long, short = 't', default_value = "0", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Per-job timeout; 0 means the global timeout
    #[arg(long, short = 'j', default_value = "0", value_parser = parse_duration)]
    pub job_timeout: Duration,

    /// Placeholder replaced by each target
    #[arg(long, short = 'T', default_value = DEFAULT_TOKEN)]
    pub token: String,

    /// List commands with a non-zero exit code on stderr after the report
    #[arg(long, short = 'e')]
    pub flag_errors: bool,

    /// Log progress as jobs complete
    #[arg(long, short = 'p')]
    pub pbar: bool,

    /// Log filter directive (e.g. warn, debug, concur.exec=trace)
    #[arg(long, short = 'l', default_value = "warn")]
    pub log_level: String,

    /// Log output: text|json|journald
    #[arg(long, default_value = "text")]
    pub log_format: LoggerFormat,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        RunConfig::default()
            .with_concurrency(self.concurrent)
            .with_timeouts(self.timeout, self.job_timeout)
            .with_token(self.token.clone())
            .with_stop(StopPolicy::from_flags(self.any, self.first))
            .with_flag_errors(self.flag_errors)
    }

    pub fn logger_config(&self) -> LoggerConfig {
        let level = if self.pbar {
            format!("{},concur.progress=info", self.log_level)
        } else {
            self.log_level.clone()
        };
        LoggerConfig::default()
            .with_format(self.log_format)
            .with_level(level)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("concur").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&["ping -c 1 {{1}}", "a", "b"]);
        assert_eq!(cli.command, "ping -c 1 {{1}}");
        assert_eq!(cli.targets, vec!["a", "b"]);

        let cfg = cli.run_config();
        assert_eq!(cfg.concurrency, Concurrency::Unbounded);
        assert_eq!(cfg.stop, StopPolicy::All);
        assert_eq!(cfg.timeout, Duration::ZERO);
        assert_eq!(cfg.token, "{{1}}");
        assert!(!cfg.flag_errors);
    }

    #[test]
    fn short_flags() {
        let cli = parse(&[
            "-a", "-c", "4", "-t", "1m30s", "-j", "500ms", "-T", "HOST", "-e", "curl HOST", "x",
        ]);
        let cfg = cli.run_config();
        assert_eq!(cfg.stop, StopPolicy::FirstSuccess);
        assert_eq!(cfg.concurrency, Concurrency::Fixed(NonZeroUsize::new(4).unwrap()));
        assert_eq!(cfg.timeout, Duration::from_secs(90));
        assert_eq!(cfg.job_timeout, Duration::from_millis(500));
        assert_eq!(cfg.token, "HOST");
        assert!(cfg.flag_errors);
    }

    #[test]
    fn first_wins_over_any() {
        let cli = parse(&["--any", "--first", "true"]);
        assert_eq!(cli.run_config().stop, StopPolicy::FirstCompletion);
    }

    #[test]
    fn cpu_keywords() {
        assert_eq!(parse(&["-c", "cpu", "x"]).concurrent, Concurrency::Cpu);
        assert_eq!(parse(&["-c", "2x", "x"]).concurrent, Concurrency::DoubleCpu);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Cli::try_parse_from(["concur", "-t", "10", "x"]).is_err());
        assert!(Cli::try_parse_from(["concur", "-c", "many", "x"]).is_err());
        assert!(Cli::try_parse_from(["concur", "--log-format", "xml", "x"]).is_err());
        assert!(Cli::try_parse_from(["concur"]).is_err());
    }

    #[test]
    fn pbar_enables_progress_logging() {
        let cfg = parse(&["-p", "-l", "error", "x"]).logger_config();
        assert_eq!(cfg.level, "error,concur.progress=info");
        assert_eq!(cfg.format, LoggerFormat::Text);

        let cfg = parse(&["--log-format", "json", "x"]).logger_config();
        assert_eq!(cfg.level, "warn");
        assert_eq!(cfg.format, LoggerFormat::Json);
    }
}
