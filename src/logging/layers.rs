//! Custom tracing subscriber layers
//!
//! `ActivityLogLayer` keeps recent events in a ring buffer so the console
//! can show what happened to each MCP server without tailing the log file.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{field::Visit, Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Event field that names the MCP server an event is about
pub const SOURCE_FIELD: &str = "source";

/// An event stored in the activity log
#[derive(Clone, Debug)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    /// Target module path
    pub target: String,
    pub message: String,
    /// Value of the `source` field, if the event had one
    pub source: Option<String>,
    /// Remaining fields
    pub fields: Vec<(String, String)>,
}

impl ActivityEntry {
    pub fn level_str(&self) -> &'static str {
        match self.level {
            Level::TRACE => "TRACE",
            Level::DEBUG => "DEBUG",
            Level::INFO => "INFO",
            Level::WARN => "WARN",
            Level::ERROR => "ERROR",
        }
    }
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<5}",
            self.timestamp.format("%H:%M:%S"),
            self.level_str()
        )?;
        if let Some(source) = &self.source {
            write!(f, " [{source}]")?;
        }
        write!(f, " {}", self.message)?;
        for (name, value) in &self.fields {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}

/// Visitor to extract message, source and fields from tracing events
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    source: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn record(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = Some(value),
            SOURCE_FIELD => self.source = Some(value),
            _ => self.fields.push((name.to_string(), value)),
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        self.record(field.name(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.record(field.name(), value.to_string());
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.record(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.record(field.name(), value.to_string());
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.record(field.name(), value.to_string());
    }
}

/// Ring buffer layer behind `ActivityLog`
pub struct ActivityLogLayer {
    buffer: Arc<Mutex<VecDeque<ActivityEntry>>>,
    max_size: usize,
}

impl ActivityLogLayer {
    /// Create a layer keeping at most `max_size` entries, plus its read handle
    pub fn new(max_size: usize) -> (Self, ActivityLog) {
        let max_size = max_size.max(1);
        let buffer = Arc::new(Mutex::new(VecDeque::with_capacity(max_size)));
        let handle = ActivityLog {
            buffer: Arc::clone(&buffer),
        };
        (Self { buffer, max_size }, handle)
    }

    fn push(&self, entry: ActivityEntry) {
        if let Ok(mut buffer) = self.buffer.lock() {
            if buffer.len() >= self.max_size {
                buffer.pop_front();
            }
            buffer.push_back(entry);
        }
    }
}

impl<S> Layer<S> for ActivityLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.push(ActivityEntry {
            timestamp: Utc::now(),
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message.unwrap_or_default(),
            source: visitor.source,
            fields: visitor.fields,
        });
    }
}

/// Handle to read the activity log
#[derive(Clone)]
pub struct ActivityLog {
    buffer: Arc<Mutex<VecDeque<ActivityEntry>>>,
}

impl fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityLog")
            .field("entries", &self.len())
            .finish()
    }
}

impl ActivityLog {
    fn filtered(&self, keep: impl Fn(&ActivityEntry) -> bool) -> Vec<ActivityEntry> {
        self.buffer
            .lock()
            .map(|guard| guard.iter().filter(|e| keep(e)).cloned().collect())
            .unwrap_or_default()
    }

    /// The most recent `count` entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<ActivityEntry> {
        self.buffer
            .lock()
            .map(|guard| {
                let skip = guard.len().saturating_sub(count);
                guard.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    /// Entries about one MCP server
    pub fn for_source(&self, source: &str) -> Vec<ActivityEntry> {
        self.filtered(|e| e.source.as_deref() == Some(source))
    }

    /// Entries whose message or target contains `query` (case-insensitive)
    pub fn search(&self, query: &str) -> Vec<ActivityEntry> {
        let query = query.to_lowercase();
        self.filtered(|e| {
            e.message.to_lowercase().contains(&query) || e.target.to_lowercase().contains(&query)
        })
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.buffer.lock() {
            guard.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
