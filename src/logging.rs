use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

static SILENT: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Serialize)]
struct LogEvent<'a> {
    level: Level,
    event: &'a str,
    message: &'a str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Value>,
}

/// Suppress all log output, used by benches and noisy tests.
pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

fn render(level: Level, event: &str, message: &str, metadata: Option<Value>) -> String {
    let entry = LogEvent {
        level,
        event,
        message,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        metadata,
    };
    serde_json::to_string(&entry).unwrap_or_else(|err| {
        format!(
            "{{\"level\":\"error\",\"event\":\"logging.failure\",\"message\":\"failed to serialise log\",\"error\":\"{err}\"}}"
        )
    })
}

fn emit(level: Level, event: &str, message: &str, metadata: Option<Value>) {
    if SILENT.load(Ordering::Relaxed) {
        return;
    }
    let line = render(level, event, message, metadata);
    // stdout carries the frame stream; problems go to stderr
    match level {
        Level::Info => println!("{line}"),
        Level::Warn | Level::Error => eprintln!("{line}"),
    }
}

pub fn info(event: &str, message: &str, metadata: Value) {
    emit(Level::Info, event, message, Some(metadata));
}

pub fn warn(event: &str, message: &str, metadata: Value) {
    emit(Level::Warn, event, message, Some(metadata));
}

pub fn error(event: &str, message: &str, metadata: Value) {
    emit(Level::Error, event, message, Some(metadata));
}

pub fn info_simple(event: &str, message: &str) {
    emit(Level::Info, event, message, None);
}

pub fn warn_simple(event: &str, message: &str) {
    emit(Level::Warn, event, message, None);
}
