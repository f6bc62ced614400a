//! Console plus event-log logging; the sink is chosen once in `main`.

use std::{fmt::Write as _, path::Path, process::Command};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    EnvFilter, Layer, layer::Context, layer::SubscriberExt, util::SubscriberInitExt,
};

pub const LOG_ENV: &str = "DNSPREP_LOG";

pub trait EventSink: Send + Sync + 'static {
    fn write(&self, level: Level, message: &str);
}

/// Discards everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn write(&self, _level: Level, _message: &str) {}
}

/// Writes to the Windows Application log through `eventcreate`.
pub struct WindowsEventLog {
    source: String,
}

impl WindowsEventLog {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl EventSink for WindowsEventLog {
    fn write(&self, level: Level, message: &str) {
        let kind = match level {
            Level::ERROR => "ERROR",
            Level::WARN => "WARNING",
            _ => "INFORMATION",
        };
        // Failing to reach the event log must never fail the run.
        let _ = Command::new("eventcreate")
            .args(["/L", "APPLICATION", "/ID", "1", "/T", kind, "/SO"])
            .arg(&self.source)
            .arg("/D")
            .arg(message)
            .output();
    }
}

/// Event source named after the running executable.
pub fn event_source_name(argv0: Option<&str>, fallback: &str) -> String {
    argv0
        .and_then(|a| Path::new(a).file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub struct EventLogLayer<S> {
    sink: S,
}

impl<S: EventSink> EventLogLayer<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<S, C> Layer<C> for EventLogLayer<S>
where
    S: EventSink,
    C: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, C>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.sink.write(*event.metadata().level(), &visitor.finish());
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Installs the global subscriber. Call once, first thing in `main`.
pub fn init<S: EventSink>(sink: S) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false),
        )
        .with(EventLogLayer::new(sink))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(Level, String)>>>);

    impl EventSink for Recorder {
        fn write(&self, level: Level, message: &str) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    #[test]
    fn forwards_message_and_fields() {
        let rec = Recorder::default();
        let subscriber = tracing_subscriber::registry().with(EventLogLayer::new(rec.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(adapter = "Ethernet", "selected adapter");
            tracing::error!("flush resolver cache failed");
        });

        let seen = rec.0.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (Level::INFO, "selected adapter adapter=Ethernet".to_string()),
                (Level::ERROR, "flush resolver cache failed".to_string()),
            ]
        );
    }

    #[test]
    fn source_name_from_executable() {
        assert_eq!(
            event_source_name(Some(r"C:\tools\dns-setup.exe"), "dnsprep"),
            if cfg!(windows) { "dns-setup" } else { r"C:\tools\dns-setup" }
        );
        assert_eq!(event_source_name(Some("/usr/local/bin/dnsprep"), "x"), "dnsprep");
        assert_eq!(event_source_name(None, "dnsprep"), "dnsprep");
        assert_eq!(event_source_name(Some(""), "dnsprep"), "dnsprep");
    }
}
