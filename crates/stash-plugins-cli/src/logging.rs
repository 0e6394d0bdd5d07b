use anyhow::Result;
use stash_sync_sources::PROGRESS_TARGET;
use std::fmt;
use std::io;
use std::path::PathBuf;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const SOH: char = '\x01';
const STX: char = '\x02';

pub fn init_logging(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let filter = build_filter(verbose_level, quiet)?;

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or(false);

    // Stash reads the plugin protocol from stderr unless JSON was asked for
    let stash_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(StashLogFormat)
            .with_ansi(false)
            .with_writer(io::stderr)
    });
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr)
    });

    let file_layer = match log_file {
        Some(log_path) => {
            let log_dir = match log_path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&log_dir)?;
            let log_filename = log_path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;
            // "stash-plugins.log" rotates as "stash-plugins.2026-10-19" etc.
            let log_prefix = log_filename.rsplitn(2, '.').nth(1).unwrap_or(log_filename);

            let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(file_appender),
            )
        }
        None => None,
    };

    Registry::default()
        .with(filter)
        .with(stash_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// 0 = info, 1 = debug (hyper noise suppressed), 2+ = trace. `RUST_LOG` wins
/// when set, except in quiet mode. Progress events always pass.
fn build_filter(verbose_level: u8, quiet: bool) -> Result<EnvFilter> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let default = match verbose_level {
            0 => "info",
            1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    Ok(filter.add_directive(format!("{}=info", PROGRESS_TARGET).parse()?))
}

fn level_code(level: &Level) -> char {
    match *level {
        Level::TRACE => 't',
        Level::DEBUG => 'd',
        Level::INFO => 'i',
        Level::WARN => 'w',
        Level::ERROR => 'e',
    }
}

/// Formats events in Stash's plugin log protocol: `\x01<level>\x02<message>`,
/// with progress events rendered as `\x01p\x02<fraction>`.
pub struct StashLogFormat;

impl<S, N> FormatEvent<S, N> for StashLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        if metadata.target() == PROGRESS_TARGET {
            let mut visitor = ProgressVisitor::default();
            event.record(&mut visitor);
            if let Some(progress) = visitor.progress {
                return writeln!(writer, "{}p{}{}", SOH, STX, progress);
            }
        }

        write!(writer, "{}{}{}", SOH, level_code(metadata.level()), STX)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[derive(Default)]
struct ProgressVisitor {
    progress: Option<f64>,
}

impl Visit for ProgressVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        if field.name() == "progress" {
            self.progress = Some(value);
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn fmt::Debug) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .event_format(StashLogFormat)
            .with_max_level(Level::TRACE)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_log_lines_use_stash_protocol() {
        let text = capture(|| {
            tracing::info!("Already in sync!");
            tracing::warn!("Stashbox performer abc not found");
        });
        assert_eq!(
            text,
            "\x01i\x02Already in sync!\n\x01w\x02Stashbox performer abc not found\n"
        );
    }

    #[test]
    fn test_progress_event_becomes_progress_line() {
        let text = capture(|| {
            tracing::info!(target: PROGRESS_TARGET, progress = 0.75);
        });
        assert_eq!(text, "\x01p\x020.75\n");
    }

    #[test]
    fn test_level_codes() {
        assert_eq!(level_code(&Level::TRACE), 't');
        assert_eq!(level_code(&Level::DEBUG), 'd');
        assert_eq!(level_code(&Level::ERROR), 'e');
    }

    #[test]
    fn test_quiet_filter_still_builds() {
        assert!(build_filter(0, true).is_ok());
        assert!(build_filter(2, false).is_ok());
    }
}
