//! Shared helpers for the hush binary

use hush_debounce::DebounceConfig;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Parse a quiet period: a bare number is milliseconds, anything else goes
/// through humantime ("250ms", "1s", "2m 30s")
pub fn parse_duration(input: &str) -> Result<Duration, humantime::DurationError> {
    let input = input.trim();
    match input.parse::<u64>() {
        Ok(ms) => Ok(Duration::from_millis(ms)),
        Err(_) => humantime::parse_duration(input),
    }
}

/// Parse a `--due` value, rejecting periods the config cannot store
/// exactly (fractions of a millisecond, or overflowing milliseconds)
pub fn parse_due_time(input: &str) -> anyhow::Result<Duration> {
    let due = parse_duration(input)?;
    DebounceConfig::checked_millis(due)?;
    Ok(due)
}

/// Install the fmt subscriber on stderr
///
/// `RUST_LOG` wins when set; otherwise only warnings, or debug output for
/// the hush crates with `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,hush=debug,hush_cli=debug,hush_debounce=debug,hush_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_number_is_milliseconds() {
        assert_eq!(parse_duration("250").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration(" 0 ").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_humantime_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("1m 30s").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn test_due_time_must_be_whole_milliseconds() {
        assert_eq!(parse_due_time("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_due_time("0").unwrap(), Duration::ZERO);

        // humantime accepts these, but they cannot be stored in due_time_ms
        assert_eq!(parse_duration("500us").unwrap(), Duration::from_micros(500));
        let err = parse_due_time("500us").unwrap_err();
        assert!(err.to_string().contains("whole number of milliseconds"), "{}", err);
        assert!(parse_due_time("1ms 500us").is_err());
        assert!(parse_due_time("soon").is_err());
    }

    #[test]
    fn test_due_time_overflow_is_rejected() {
        let err = parse_due_time("500000000000000000000years").unwrap_err();
        assert!(!err.to_string().is_empty());

        let err = parse_due_time("1000000000years").unwrap_err();
        assert!(err.to_string().contains("too long"), "{}", err);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5").is_err());
        assert!(parse_duration("").is_err());
    }
}
