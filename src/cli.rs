//! CLI argument definitions using clap derive macros.

use clap::Parser;

use fast_core::DEFAULT_ENDPOINT;

/// Estimate download bandwidth the way fast.com does.
///
/// Fast streams several download URLs at once and prints the cumulative
/// average throughput every second until the measurement window closes.
#[derive(Parser, Debug)]
#[command(name = "fast")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Minimum measurement time in seconds before streams may stop (1-600)
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub min: u64,

    /// Maximum measurement time in seconds (1-3600)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub max: u64,

    /// Read buffer size in bytes (1-1048576)
    #[arg(short = 'b', long, default_value_t = 512, value_parser = clap::value_parser!(u64).range(1..=1_048_576))]
    pub buffer_size: u64,

    /// Print one JSON object per sample instead of text
    #[arg(long)]
    pub json: bool,

    /// Discovery bootstrap page
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Download URLs to measure (skips discovery when given)
    pub urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["fast"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.min, 10);
        assert_eq!(args.max, 30);
        assert_eq!(args.buffer_size, 512);
        assert!(!args.json);
        assert_eq!(args.endpoint, "https://fast.com");
        assert!(args.urls.is_empty());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["fast", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["fast", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["fast", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["fast", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["fast", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["fast", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    // ==================== Window Tests ====================

    #[test]
    fn test_cli_min_and_max_flags() {
        let args = Args::try_parse_from(["fast", "--min", "3", "--max", "8"]).unwrap();
        assert_eq!(args.min, 3);
        assert_eq!(args.max, 8);
    }

    #[test]
    fn test_cli_min_zero_rejected() {
        let err = Args::try_parse_from(["fast", "--min", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_max_over_limit_rejected() {
        let err = Args::try_parse_from(["fast", "--max", "3601"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    // ==================== Buffer Tests ====================

    #[test]
    fn test_cli_buffer_size_short_flag() {
        let args = Args::try_parse_from(["fast", "-b", "4096"]).unwrap();
        assert_eq!(args.buffer_size, 4096);
    }

    #[test]
    fn test_cli_buffer_size_zero_rejected() {
        let err = Args::try_parse_from(["fast", "-b", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_buffer_size_over_limit_rejected() {
        let err = Args::try_parse_from(["fast", "--buffer-size", "1048577"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    // ==================== Target Tests ====================

    #[test]
    fn test_cli_positional_urls_collected_in_order() {
        let args =
            Args::try_parse_from(["fast", "--json", "https://a.example/x", "https://b.example/y"])
                .unwrap();
        assert!(args.json);
        assert_eq!(args.urls, vec!["https://a.example/x", "https://b.example/y"]);
    }

    #[test]
    fn test_cli_endpoint_override() {
        let args = Args::try_parse_from(["fast", "--endpoint", "http://127.0.0.1:8080"]).unwrap();
        assert_eq!(args.endpoint, "http://127.0.0.1:8080");
    }
}
