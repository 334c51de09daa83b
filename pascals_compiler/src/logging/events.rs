//! Log events emitted by every compiler stage

use super::codes::{self, Code};
use crate::utils::Span;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Log severity levels, ordered from least to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Lowercase label used in diagnostic lines (`error[E020]: ...`)
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// One diagnostic or progress record raised by a compiler stage
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    /// Key/value pairs, kept sorted so renderings are stable
    pub context: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    level: &'static str,
    code: &'a str,
    message: &'a str,
    category: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnosis: Option<JsonDiagnosis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<JsonLocation>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    context: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct JsonDiagnosis {
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
}

#[derive(Serialize)]
struct JsonLocation {
    line: usize,
    column: usize,
    end_line: usize,
    end_column: usize,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: message.to_string(),
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, error_code, message)
    }

    /// Warning without a specific code
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, Code::new("W000"), message)
    }

    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, warning_code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Info event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    /// Registry metadata, present only for registered codes
    fn diagnosis(&self) -> Option<JsonDiagnosis> {
        codes::get_error_metadata(self.code.as_str()).map(|meta| JsonDiagnosis {
            recoverable: meta.recoverable,
            requires_halt: meta.requires_halt,
            description: meta.description,
            recommended_action: meta.recommended_action,
        })
    }

    /// `error[E020]: unknown character '@' (3:7)`
    pub fn format(&self) -> String {
        let mut line = format!(
            "{}[{}]: {}",
            self.level.label(),
            self.code.as_str(),
            self.message
        );
        if let Some(span) = &self.span {
            line.push_str(&format!(" ({}:{})", span.start().line, span.start().column));
        }
        line
    }

    /// One JSON object per event for the structured sink
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let record = JsonRecord {
            timestamp: self.timestamp.to_rfc3339(),
            level: self.level.as_str(),
            code: self.code.as_str(),
            message: &self.message,
            category: self.category(),
            severity: self.severity(),
            diagnosis: if self.is_error() { self.diagnosis() } else { None },
            location: self.span.as_ref().map(|span| JsonLocation {
                line: span.start().line,
                column: span.start().column,
                end_line: span.end().line,
                end_column: span.end().column,
            }),
            context: &self.context,
        };
        serde_json::to_string(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::Position;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "File not found");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E005");
        assert_eq!(event.category(), "FileProcessing");
    }

    #[test]
    fn test_success_event_is_info() {
        let event = LogEvent::success(codes::success::TOKENIZATION_COMPLETE, "Scanned");
        assert!(event.is_info());
        assert_eq!(event.code.as_str(), "I020");
    }

    #[test]
    fn test_format_includes_span() {
        let span = Span::covering(Position::new(12, 3, 7), "@");
        let event =
            LogEvent::error(codes::lexical::UNKNOWN_CHARACTER, "Unknown character '@'").with_span(span);
        let formatted = event.format();

        assert!(formatted.starts_with("error[E020]: Unknown character"));
        assert!(formatted.ends_with("(3:7)"));
    }

    #[test]
    fn test_generic_warning_code() {
        let warning = LogEvent::warning("Something odd");
        assert!(warning.is_warning());
        assert_eq!(warning.code.as_str(), "W000");
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::file_processing::PERMISSION_DENIED, "Access denied")
            .with_context("file", "halo.pas");

        let json = event.format_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["code"], "E009");
        assert_eq!(value["context"]["file"], "halo.pas");
        assert_eq!(value["diagnosis"]["requires_halt"], true);
        assert!(value.get("location").is_none());
    }
}
