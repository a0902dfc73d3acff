//! Logging through the host
//!
//! Code in this workspace logs with the usual `tracing` macros. Inside the
//! guest those events are forwarded to the host's `log` import by
//! [`HostLogLayer`], which is installed for the duration of one call.

use crate::abi::LogLevel;
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

/// Most verbose level forwarded to the host
pub const HOST_LEVEL: LevelFilter = LevelFilter::DEBUG;

/// Layer forwarding every event to a host sink
pub struct HostLogLayer<F> {
    sink: F,
}

impl<F> HostLogLayer<F>
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    /// Create a layer writing to `sink`
    pub fn new(sink: F) -> Self {
        Self { sink }
    }
}

impl<F> fmt::Debug for HostLogLayer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostLogLayer").finish_non_exhaustive()
    }
}

impl<S, F> Layer<S> for HostLogLayer<F>
where
    S: Subscriber,
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let level = LogLevel::from(*event.metadata().level());
        (self.sink)(level, &visitor.finish());
    }
}

/// Build a subscriber that forwards events at [`HOST_LEVEL`] and above
pub fn host_subscriber<F>(sink: F) -> impl Subscriber + Send + Sync + 'static
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    Registry::default().with(HostLogLayer::new(sink).with_filter(HOST_LEVEL))
}

/// Run `f` with events forwarded to `sink`
pub fn with_host_logging<F, T>(sink: F, f: impl FnOnce() -> T) -> T
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    tracing::subscriber::with_default(host_subscriber(sink), f)
}

/// Flattens an event into `message key=value ...`
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
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
            return;
        }
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={:?}", field.name(), value);
    }
}
