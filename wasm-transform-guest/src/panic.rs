//! Panic reporting
//!
//! A panic anywhere in the guest, including inside `allocate` before any
//! `transform` call, is reported to the host log before the trap.

use std::sync::Once;
use wasm_transform_core::abi::LogLevel;
use wasm_transform_core::diagnostics::{AbortReport, SourceLocation, ABORT_LEVEL};

/// Destination of panic reports
pub type LogSink = fn(LogLevel, &str);

static PANIC_HOOK: Once = Once::new();

/// Route panics to `sink`
///
/// Only the first call installs the hook; later calls are no-ops, so every
/// export can call this on entry.
pub fn install_panic_hook(sink: LogSink) {
    PANIC_HOOK.call_once(|| {
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|l| SourceLocation::new(l.file(), l.line(), l.column()));
            let report = AbortReport::from_panic(info.payload(), location);
            sink(ABORT_LEVEL, &report.to_string());
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static FIRST: Mutex<Vec<(LogLevel, String)>> = Mutex::new(Vec::new());
    static SECOND: Mutex<Vec<(LogLevel, String)>> = Mutex::new(Vec::new());

    fn record_first(level: LogLevel, message: &str) {
        if let Ok(mut lines) = FIRST.lock() {
            lines.push((level, message.to_string()));
        }
    }

    fn record_second(level: LogLevel, message: &str) {
        if let Ok(mut lines) = SECOND.lock() {
            lines.push((level, message.to_string()));
        }
    }

    #[test]
    fn test_panic_reported_before_any_transform() {
        install_panic_hook(record_first);
        // an allocation that cannot be satisfied panics with capacity overflow
        let result = std::panic::catch_unwind(|| Vec::<u64>::with_capacity(usize::MAX).len());
        assert!(result.is_err());

        install_panic_hook(record_second);
        let _ = std::panic::catch_unwind(|| panic!("second {}", 2));

        let first = FIRST.lock().unwrap();
        assert!(first.iter().all(|(level, _)| *level == LogLevel::Error));
        assert!(
            first.iter().any(|(_, line)| line.starts_with("abort: capacity overflow at: ")),
            "{:?}",
            first
        );
        let second = first
            .iter()
            .find(|(_, line)| line.starts_with("abort: second 2 at: "))
            .expect("second panic not reported through the first sink");
        assert!(second.1.contains("panic.rs("), "{}", second.1);
        assert!(SECOND.lock().unwrap().is_empty());
    }
}
