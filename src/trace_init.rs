//! Opt-in JSON-lines tracing for game sessions, enabled by the `trace` feature.

use std::path::Path;

/// File created under the trace directory.
pub const TRACE_FILE: &str = "type-engine-trace.jsonl";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "type_engine=debug,type_session=debug,type_core=debug";

/// Keeps the background trace writer running. Buffered lines are flushed
/// when it drops, so hold it until the process is done.
#[must_use = "trace output stops when the guard is dropped"]
pub struct TraceGuard {
    #[cfg(feature = "trace")]
    _writer: Option<tracing_appender::non_blocking::WorkerGuard>,
}

#[cfg(feature = "trace")]
static INIT: std::sync::Once = std::sync::Once::new();

/// Install a JSON subscriber writing to `<log_dir>/type-engine-trace.jsonl`.
///
/// Only the first call installs anything. If another global subscriber is
/// already set the returned guard is empty.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &Path) -> TraceGuard {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let mut writer = None;
    INIT.call_once(|| {
        let appender = tracing_appender::rolling::never(log_dir, TRACE_FILE);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // Pool and ranking workers are named threads; keep the names in the output.
        let installed = tracing_subscriber::fmt()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_env_filter(filter)
            .try_init();
        if installed.is_ok() {
            writer = Some(guard);
        }
    });
    TraceGuard { _writer: writer }
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &Path) -> TraceGuard {
    TraceGuard {}
}
