//! # Plugin Logging
//!
//! Installs the global `tracing` subscriber for the player plugin and,
//! optionally, mirrors what it admits into the host's own log pipeline
//! (Logcat, os_log, a desktop console).
//!
//! The control plane logs focus and player-count transitions at `debug`,
//! player lifecycle at `info`, and a capability call that failed and
//! degraded to its neutral default at `warn`. The default filter admits the
//! plugin crates at the configured [`LogLevel`] and everything else at warn.
//!
//! ```no_run
//! use bridge_traits::{ConsoleLogger, LogLevel};
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use std::sync::Arc;
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_level(LogLevel::Debug)
//!     .with_host_logger(Arc::new(ConsoleLogger::default()));
//!
//! init_logging(config).expect("logging already initialized");
//! tracing::info!("Player plugin loaded");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{LogEntry, LogLevel, LoggerSink};
use std::fmt;
use std::io;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::format::FmtSpan,
    layer::{Context, Layered, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer, Registry,
};

/// Crates the default filter admits at the configured level.
const PLUGIN_TARGETS: &[&str] = &[
    "player_bridge_workspace",
    "bridge_traits",
    "bridge_desktop",
    "core_runtime",
    "core_playback",
    "core_service",
];

/// How the stdout layer renders events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, for a developer terminal.
    Pretty,
    /// One JSON object per line.
    Json,
    /// One line per event.
    Compact,
}

impl Default for LogFormat {
    /// Pretty in debug builds, JSON in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level of the plugin crates under the default filter.
    pub level: LogLevel,
    /// `EnvFilter` directives used instead of the default filter.
    pub filter: Option<String>,
    /// Host pipeline that receives a copy of every admitted event.
    pub host_logger: Option<Arc<dyn LoggerSink>>,
    pub spans: bool,
    pub show_target: bool,
    pub show_threads: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            host_logger: None,
            spans: false,
            show_target: true,
            show_threads: false,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("filter", &self.filter)
            .field("host_logger", &self.host_logger.is_some())
            .field("spans", &self.spans)
            .field("show_target", &self.show_target)
            .field("show_threads", &self.show_threads)
            .finish()
    }
}

impl LoggingConfig {
    pub fn with_format(self, format: LogFormat) -> Self {
        Self { format, ..self }
    }

    pub fn with_level(self, level: LogLevel) -> Self {
        Self { level, ..self }
    }

    pub fn with_filter(self, directives: impl Into<String>) -> Self {
        Self {
            filter: Some(directives.into()),
            ..self
        }
    }

    pub fn with_host_logger(self, logger: Arc<dyn LoggerSink>) -> Self {
        Self {
            host_logger: Some(logger),
            ..self
        }
    }

    /// Render span enter/exit (pretty) or the span stack (JSON).
    pub fn with_spans(self, spans: bool) -> Self {
        Self { spans, ..self }
    }

    pub fn with_target(self, show_target: bool) -> Self {
        Self {
            show_target,
            ..self
        }
    }

    pub fn with_thread_info(self, show_threads: bool) -> Self {
        Self {
            show_threads,
            ..self
        }
    }
}

type FilteredRegistry = Layered<EnvFilter, Registry>;

/// Install the global subscriber. Only the first call in a process succeeds.
///
/// # Errors
///
/// - [`Error::Config`] when the filter directives do not parse
/// - [`Error::Logging`] when a global subscriber is already installed
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;
    let stdout = stdout_layer(&config);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(config.host_logger.map(HostLogLayer::new))
        .try_init()
        .map_err(|e| Error::Logging(format!("Failed to initialize logging: {}", e)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = config
        .filter
        .clone()
        .unwrap_or_else(|| default_filter(config.level));

    EnvFilter::try_new(&directives)
        .map_err(|e| Error::Config(format!("Invalid log filter '{}': {}", directives, e)))
}

fn default_filter(level: LogLevel) -> String {
    let level = level.as_str().to_ascii_lowercase();
    std::iter::once("warn".to_string())
        .chain(
            PLUGIN_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, level)),
        )
        .collect::<Vec<_>>()
        .join(",")
}

fn stdout_layer(config: &LoggingConfig) -> Box<dyn Layer<FilteredRegistry> + Send + Sync> {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(config.show_target)
        .with_thread_ids(config.show_threads)
        .with_thread_names(config.show_threads);

    match config.format {
        LogFormat::Pretty => {
            let span_events = if config.spans {
                FmtSpan::ACTIVE
            } else {
                FmtSpan::NONE
            };
            layer.pretty().with_span_events(span_events).boxed()
        }
        LogFormat::Json => layer
            .json()
            .flatten_event(true)
            .with_current_span(config.spans)
            .with_span_list(config.spans)
            .boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

/// Copies admitted events into the host's log pipeline.
///
/// Entries below the logger's [`min_level`](LoggerSink::min_level) are
/// skipped. The write is spawned when a tokio runtime is current and run
/// inline otherwise.
pub struct HostLogLayer {
    logger: Arc<dyn LoggerSink>,
}

impl HostLogLayer {
    pub fn new(logger: Arc<dyn LoggerSink>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for HostLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = host_level(metadata.level());
        if level < self.logger.min_level() {
            return;
        }

        let mut fields = EntryFields::default();
        event.record(&mut fields);

        let message = fields.message.unwrap_or_else(|| metadata.name().to_string());
        let mut entry = fields
            .extra
            .into_iter()
            .fold(LogEntry::new(level, metadata.target(), message), |entry, (k, v)| {
                entry.with_field(k, v)
            });
        if let Some(span) = ctx.lookup_current() {
            entry = entry.with_span(span.name());
        }

        forward(Arc::clone(&self.logger), entry);
    }
}

// Errors go to stderr: logging them through tracing would re-enter this layer.
fn forward(logger: Arc<dyn LoggerSink>, entry: LogEntry) {
    match Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                if let Err(err) = logger.log(entry).await {
                    eprintln!("host logger rejected entry: {}", err);
                }
            });
        }
        Err(_) => {
            if let Err(err) = futures::executor::block_on(logger.log(entry)) {
                eprintln!("host logger rejected entry: {}", err);
            }
        }
    }
}

/// The `message` field plus every other field rendered as text.
#[derive(Default)]
struct EntryFields {
    message: Option<String>,
    extra: Vec<(String, String)>,
}

impl EntryFields {
    fn push(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            name => self.extra.push((name.to_string(), value)),
        }
    }
}

impl Visit for EntryFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{:?}", value));
    }
}

fn host_level(level: &Level) -> LogLevel {
    match *level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as SinkResult;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct HostPipeline {
        written: Mutex<Vec<LogEntry>>,
        floor: Option<LogLevel>,
    }

    #[async_trait]
    impl LoggerSink for HostPipeline {
        async fn log(&self, entry: LogEntry) -> SinkResult<()> {
            self.written.lock().push(entry);
            Ok(())
        }

        fn min_level(&self) -> LogLevel {
            self.floor.unwrap_or(LogLevel::Trace)
        }
    }

    #[test]
    fn builder_sets_every_knob() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_level(LogLevel::Debug)
            .with_filter("core_playback=trace")
            .with_spans(true)
            .with_target(false)
            .with_thread_info(true);

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.filter.as_deref(), Some("core_playback=trace"));
        assert!(config.spans);
        assert!(!config.show_target);
        assert!(config.show_threads);
        assert!(format!("{:?}", config).contains("host_logger: false"));
    }

    #[test]
    fn release_builds_default_to_json() {
        let expected = if cfg!(debug_assertions) {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        };
        assert_eq!(LogFormat::default(), expected);
    }

    #[test]
    fn default_filter_admits_plugin_crates_at_level() {
        let filter = default_filter(LogLevel::Debug);
        assert!(filter.starts_with("warn,"));
        for target in PLUGIN_TARGETS {
            assert!(filter.contains(&format!("{}=debug", target)));
        }

        let built = build_filter(&LoggingConfig::default().with_level(LogLevel::Debug)).unwrap();
        assert!(built.to_string().contains("core_playback=debug"));
    }

    #[test]
    fn custom_filter_replaces_default() {
        let config = LoggingConfig::default().with_filter("core_playback=trace,core_runtime=warn");
        let rendered = build_filter(&config).unwrap().to_string();
        assert!(rendered.contains("core_playback=trace"));
        assert!(!rendered.contains("core_service"));
    }

    #[test]
    fn invalid_filter_is_a_config_error() {
        let config = LoggingConfig::default().with_filter("core_playback=loud");
        let err = build_filter(&config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn host_layer_copies_message_and_fields() {
        let host = Arc::new(HostPipeline::default());
        let subscriber = tracing_subscriber::registry().with(HostLogLayer::new(host.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        tracing::warn!(target: "core_playback::volume", step = 7, muted = false, "set_step failed");

        let written = host.written.lock();
        assert_eq!(written.len(), 1);
        let entry = &written[0];
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.target, "core_playback::volume");
        assert_eq!(entry.message, "set_step failed");
        assert_eq!(entry.fields.get("step").map(String::as_str), Some("7"));
        assert_eq!(entry.fields.get("muted").map(String::as_str), Some("false"));
    }

    #[test]
    fn host_layer_skips_below_floor_and_tags_span() {
        let host = Arc::new(HostPipeline {
            floor: Some(LogLevel::Info),
            ..Default::default()
        });
        let subscriber = tracing_subscriber::registry().with(HostLogLayer::new(host.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        tracing::debug!("dropped below min level");
        let span = tracing::info_span!("request_focus");
        let _entered = span.enter();
        tracing::info!("focus granted");

        let written = host.written.lock();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].message, "focus granted");
        assert_eq!(written[0].span.as_deref(), Some("request_focus"));
    }

    #[test]
    fn string_fields_are_not_quoted() {
        let host = Arc::new(HostPipeline::default());
        let subscriber = tracing_subscriber::registry().with(HostLogLayer::new(host.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        tracing::info!(capability = "FocusProvider", "capability missing");

        let written = host.written.lock();
        assert_eq!(
            written[0].fields.get("capability").map(String::as_str),
            Some("FocusProvider")
        );
    }
}
