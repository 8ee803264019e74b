//! Log setup for the service.
//!
//! `LOG_LEVEL` takes any `EnvFilter` directive string; `LOG_FORMAT=json` switches
//! to one JSON object per line, anything else prints human-readable lines.
//! Targets: `fieldcall_backend` (service), `round` (composition and option
//! synthesis), `scenario` (loading and validation).

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info,round=info,scenario=info,fieldcall_backend=debug,tower_http=info,axum=info";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.init(),
    }
    tracing::debug!(target: "fieldcall_backend", ?format, "Tracing initialized");
}
