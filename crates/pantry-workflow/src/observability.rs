use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILE: &str = "pantry-workflow.logs.jsonl";

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

/// Crate events at `info`, everything else (reqwest, hyper) at `warn`.
const DEFAULT_FILTER: &str = "warn,pantry_workflow=info";

fn observability_enabled() -> bool {
    enabled_from(std::env::var("PANTRY_OBSERVABILITY_ENABLED").ok().as_deref())
}

fn enabled_from(flag: Option<&str>) -> bool {
    flag.and_then(parse_bool_env).unwrap_or(true)
}

fn resolve_env_filter() -> tracing_subscriber::EnvFilter {
    let directives = filter_directives(
        std::env::var("PANTRY_LOG_LEVEL").ok().as_deref(),
        std::env::var("RUST_LOG").ok().as_deref(),
    );
    tracing_subscriber::EnvFilter::try_new(&directives)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER))
}

/// Picks the first parseable filter: `PANTRY_LOG_LEVEL`, then `RUST_LOG`,
/// then the crate default.
fn filter_directives(pantry_level: Option<&str>, rust_log: Option<&str>) -> String {
    [pantry_level, rust_log]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .find(|value| tracing_subscriber::EnvFilter::try_new(value).is_ok())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Initialize logging once per process.
///
/// Environment variables:
/// - `PANTRY_OBSERVABILITY_ENABLED`: optional enable/disable flag (default enabled).
/// - `PANTRY_LOG_LEVEL`: optional level/filter override (`info`, `debug`, etc.).
/// - `PANTRY_JSON_LOG_PATH`: optional log file path. If set, logs are JSONL in that file.
///   If unset, logs are emitted to stdout in a compact console format.
/// - `RUST_LOG`: fallback filter. Without either, crate events log at `info`
///   and dependencies at `warn`.
pub fn init_observability() {
    INIT.get_or_init(|| {
        if !observability_enabled() {
            return;
        }

        let env_filter = resolve_env_filter();
        if let Ok(path_raw) = std::env::var("PANTRY_JSON_LOG_PATH") {
            let path = std::path::PathBuf::from(path_raw);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                let _ = std::fs::create_dir_all(parent);
            }
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_LOG_FILE);
            let writer = tracing_appender::rolling::never(dir, file_name);
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(false)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init();
        } else {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stdout);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_env_accepts_common_spellings() {
        assert_eq!(parse_bool_env(" On "), Some(true));
        assert_eq!(parse_bool_env("disabled"), Some(false));
        assert_eq!(parse_bool_env("maybe"), None);
    }

    #[test]
    fn enabled_unless_explicitly_disabled() {
        assert!(enabled_from(None));
        assert!(enabled_from(Some("garbage")));
        assert!(!enabled_from(Some("off")));
    }

    #[test]
    fn filter_prefers_pantry_level_then_rust_log() {
        assert_eq!(filter_directives(Some("debug"), Some("trace")), "debug");
        assert_eq!(filter_directives(Some(" "), Some("trace")), "trace");
        assert_eq!(filter_directives(None, None), DEFAULT_FILTER);
    }

    #[test]
    fn default_filter_parses() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
