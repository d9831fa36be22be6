use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Crates whose events the CLI surfaces. Everything else stays silent.
const XFRAME_TARGETS: [&str; 4] = ["xframe", "xframe_wire", "xframe_host", "xframe_router"];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// Host and router events read as one stream, so at debug and below the
    /// emitting crate is printed with each line.
    fn shows_target(self) -> bool {
        matches!(self, LogLevel::Debug | LogLevel::Trace)
    }
}

fn transport_targets(level: LogLevel) -> Targets {
    XFRAME_TARGETS
        .iter()
        .fold(Targets::new(), |targets, name| {
            targets.with_target(*name, level.as_filter())
        })
}

/// Install the stderr subscriber. Stdout is reserved for command output.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = transport_targets(level);
    let registry = tracing_subscriber::registry().with(filter);
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(level.shows_target());

    let _ = match format {
        LogFormat::Text => registry.with(fmt).try_init(),
        LogFormat::Json => registry.with(fmt.json()).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn transport_crates_follow_the_requested_level() {
        let targets = transport_targets(LogLevel::Info);
        assert!(targets.would_enable("xframe_router::router", &Level::INFO));
        assert!(targets.would_enable("xframe_host::queue", &Level::WARN));
        assert!(!targets.would_enable("xframe_host::queue", &Level::DEBUG));
    }

    #[test]
    fn foreign_crates_are_silenced() {
        let targets = transport_targets(LogLevel::Trace);
        assert!(!targets.would_enable("tokio::runtime", &Level::ERROR));
        assert!(targets.would_enable("xframe_wire::envelope", &Level::TRACE));
    }

    #[test]
    fn targets_printed_only_when_debugging() {
        assert!(!LogLevel::Info.shows_target());
        assert!(LogLevel::Debug.shows_target());
        assert!(LogLevel::Trace.shows_target());
    }
}
