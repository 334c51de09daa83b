//! Per-file event collection and cargo-style reporting

use super::codes;
use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Context information for file processing
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Totals across every file seen by the collector
#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

/// Thread-safe store of errors and warnings keyed by source file
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    file_contexts: Mutex<BTreeMap<PathBuf, FileProcessingContext>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            file_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event; past the per-file limit a single overflow warning is kept
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let Ok(mut events) = self.file_events.lock() else {
            return;
        };

        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn record_file_context(&self, context: FileProcessingContext) {
        if let Ok(mut contexts) = self.file_contexts.lock() {
            contexts.insert(context.file_path.clone(), context);
        }
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.file_events
            .lock()
            .ok()
            .and_then(|events| events.get(file_path).cloned())
            .unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        self.get_file_events(file_path)
            .into_iter()
            .filter(|e| e.is_error())
            .collect()
    }

    pub fn get_file_warnings(&self, file_path: &Path) -> Vec<LogEvent> {
        self.get_file_events(file_path)
            .into_iter()
            .filter(|e| e.is_warning())
            .collect()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        !self.get_file_errors(file_path).is_empty()
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.file_events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let all_events = self.get_all_file_events();

        let mut summary = ProcessingSummary {
            total_processing_time: self.processing_start.elapsed(),
            ..ProcessingSummary::default()
        };

        let mut all_files: Vec<&PathBuf> = all_events.keys().collect();
        let contexts = self
            .file_contexts
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default();
        for path in contexts.keys() {
            if !all_events.contains_key(path) {
                all_files.push(path);
            }
        }
        summary.total_files = all_files.len();

        for path in all_files {
            let file_events = all_events.get(path).map(Vec::as_slice).unwrap_or(&[]);
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
                summary.successful_files += 1;
            } else {
                summary.successful_files += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.file_events.lock() {
            events.clear();
        }
        if let Ok(mut contexts) = self.file_contexts.lock() {
            contexts.clear();
        }
    }

    pub fn total_event_count(&self) -> usize {
        self.file_events
            .lock()
            .map(|events| events.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// (current events, buffer size, fill ratio)
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let percentage = if LOG_BUFFER_SIZE > 0 {
            current as f64 / LOG_BUFFER_SIZE as f64
        } else {
            0.0
        };
        (current, LOG_BUFFER_SIZE, percentage)
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn push_context_lines(output: &mut String, event: &LogEvent) {
    for (key, value) in &event.context {
        if key != "file" && key != "file_id" {
            output.push_str(&format!("  = {}: {}\n", key, value));
        }
    }
}

fn location(file_path: &Path, event: &LogEvent) -> String {
    event
        .span
        .as_ref()
        .map(|s| {
            format!(
                " --> {}:{}:{}",
                file_path.display(),
                s.start().line,
                s.start().column
            )
        })
        .unwrap_or_default()
}

/// Render collected errors and warnings grouped by file
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));

        for event in errors {
            output.push_str(&format!(
                "error[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                location(file_path, event)
            ));
            output.push_str(&format!(
                "  = severity: {}, category: {}\n",
                event.severity(),
                event.category()
            ));
            push_context_lines(&mut output, event);

            let action = codes::get_action(event.code.as_str());
            if action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
        }

        for event in warnings {
            output.push_str(&format!(
                "warning[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                location(file_path, event)
            ));
            push_context_lines(&mut output, event);
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{Position, Span};

    #[test]
    fn test_record_and_query() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("halo.pas");

        collector.record_event(
            &file_path,
            LogEvent::error(codes::lexical::UNKNOWN_CHARACTER, "Unknown character"),
        );

        assert_eq!(collector.get_file_events(&file_path).len(), 1);
        assert!(collector.file_has_errors(&file_path));
        assert!(collector.get_file_warnings(&file_path).is_empty());
    }

    #[test]
    fn test_summary_counts_context_only_files() {
        let collector = ErrorCollector::new();
        collector.record_file_context(FileProcessingContext::new(PathBuf::from("clean.pas"), 0));
        collector.record_event(
            Path::new("broken.pas"),
            LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "expected ';'"),
        );
        collector.record_event(Path::new("noisy.pas"), LogEvent::warning("redeclared"));

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.successful_files, 2);
        assert_eq!(summary.files_with_warnings, 1);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_per_file_limit_adds_single_overflow_warning() {
        let collector = ErrorCollector::new();
        let path = Path::new("flood.pas");
        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(
                path,
                LogEvent::error(codes::lexical::UNKNOWN_CHARACTER, "Unknown character"),
            );
        }
        assert_eq!(collector.get_file_events(path).len(), MAX_LOG_EVENTS_PER_FILE + 1);
        assert_eq!(collector.get_file_warnings(path).len(), 1);
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let span = Span::covering(Position::new(20, 2, 5), "@");
        collector.record_event(
            Path::new("halo.pas"),
            LogEvent::error(codes::lexical::UNKNOWN_CHARACTER, "Unknown character '@'")
                .with_span(span)
                .with_context("char", "@")
                .with_context("file", "halo.pas"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking halo.pas..."));
        assert!(output.contains("error[E020]: Unknown character '@' --> halo.pas:2:5"));
        assert!(output.contains("  = severity: Medium, category: Lexical"));
        assert!(output.contains("  = char: @"));
        assert!(!output.contains("  = file:"));
        let help = format!("  = help: {}\n", codes::get_action("E020"));
        assert!(output.contains(&help));
        assert!(output.contains("Total errors: 1"));
    }
}
