//! Bounded source file reading for Pascal-S programs

use crate::config::constants::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT,
};
use crate::config::constants::language::SOURCE_EXTENSION;
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .pas, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("File has too many lines: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => codes::file_processing::INVALID_EXTENSION,
            Self::FileTooLarge { .. } | Self::TooManyLines { .. } => {
                codes::file_processing::FILE_TOO_LARGE
            }
            Self::EmptyFile => codes::file_processing::EMPTY_FILE,
            Self::PermissionDenied { .. } => codes::file_processing::PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    fn from_io(error: &std::io::Error, path: &Path, action: &str) -> Self {
        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.display().to_string(),
            },
            ErrorKind::InvalidData => Self::InvalidEncoding {
                path: path.display().to_string(),
            },
            ErrorKind::NotFound => Self::FileNotFound {
                path: path.display().to_string(),
            },
            _ => Self::IoError {
                message: format!("failed to {} '{}': {}", action, path.display(), error),
            },
        }
    }
}

/// What the processor learned about a source file before handing it on
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical path of the source file
    pub path: PathBuf,
    pub size: u64,
    /// Lowercased extension, if any
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_pas_file: bool,
    pub modified: Option<SystemTime>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        human_size(self.size)
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }

    /// File name without its extension, used to name the output file
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("output")
            .to_string()
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    /// True when the file holds nothing but whitespace
    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }
}

/// Reads Pascal-S sources within the compile-time size and line limits.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_pas_extension: bool,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_pas_extension: false,
            enable_performance_logging: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_pas_extension: prefs.require_pas_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_pas_extension_required(mut self, required: bool) -> Self {
        self.require_pas_extension = required;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    /// Validate, read and measure one source file.
    pub fn process_file(
        &self,
        file_path: &str,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start = Instant::now();
        log_debug!("Starting file processing", "file" => file_path);

        let path = self.validate_path(file_path)?;
        let mut metadata = self.collect_metadata(&path)?;
        self.validate_file(&metadata, file_path)?;

        let source = fs::read_to_string(&path).map_err(|e| {
            let error = FileProcessorError::from_io(&e, &path, "read");
            let io_error = e.to_string();
            log_error!(error.error_code(), "Failed to read source file",
                "file" => file_path,
                "io_error" => io_error.as_str(),
                "severity" => error.severity());
            error
        })?;

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT {
            let error = FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            };
            let lines = line_count.to_string();
            let max_lines = MAX_LINE_COUNT.to_string();
            log_error!(error.error_code(), "Source file exceeds maximum line count",
                "file" => file_path,
                "lines" => lines.as_str(),
                "max_lines" => max_lines.as_str());
            return Err(error);
        }
        metadata.line_count = line_count;

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start.elapsed(),
        };
        self.log_processing_success(&result, file_path);
        Ok(result)
    }

    fn log_processing_success(&self, result: &FileProcessingResult, file_path: &str) {
        let size = result.metadata.size.to_string();
        let lines = result.metadata.line_count.to_string();

        if self.enable_performance_logging {
            let human = result.metadata.human_readable_size();
            let chars = result.char_count().to_string();
            let duration = format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0);
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "Source file read",
                "file" => file_path,
                "size_bytes" => size.as_str(),
                "size_human" => human.as_str(),
                "lines" => lines.as_str(),
                "chars" => chars.as_str(),
                "duration_ms" => duration.as_str()
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "Source file read",
                "file" => file_path,
                "size_bytes" => size.as_str(),
                "lines" => lines.as_str()
            );
        }
    }

    fn validate_path(&self, file_path: &str) -> Result<PathBuf, FileProcessorError> {
        if file_path.trim().is_empty() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        let path = Path::new(file_path);
        if !path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File not found",
                "path" => file_path,
                "severity" => error.severity());
            return Err(error);
        }
        if !path.is_file() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Path is not a regular file", "path" => file_path);
            return Err(error);
        }

        path.canonicalize().map_err(|e| {
            let error = FileProcessorError::from_io(&e, path, "resolve");
            let io_error = e.to_string();
            log_error!(error.error_code(), "Failed to canonicalize path",
                "path" => file_path,
                "io_error" => io_error.as_str());
            error
        })
    }

    fn collect_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let meta = fs::metadata(path).map_err(|e| {
            let error = FileProcessorError::from_io(&e, path, "stat");
            let path_str = path.display().to_string();
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path_str.as_str());
            error
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());
        let is_pas_file = extension.as_deref() == Some(SOURCE_EXTENSION);

        let metadata = FileMetadata {
            path: path.to_path_buf(),
            size: meta.len(),
            extension,
            line_count: 0,
            is_pas_file,
            modified: meta.modified().ok(),
        };

        let size = metadata.size.to_string();
        let ext = metadata.extension.as_deref().unwrap_or("none");
        log_debug!("File metadata collected",
            "size_bytes" => size.as_str(),
            "extension" => ext);

        Ok(metadata)
    }

    fn validate_file(
        &self,
        metadata: &FileMetadata,
        file_path: &str,
    ) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            let human = metadata.human_readable_size();
            let limit = human_size(MAX_FILE_SIZE);
            log_error!(error.error_code(), "Source file exceeds compile-time size limit",
                "file" => file_path,
                "size_human" => human.as_str(),
                "limit_human" => limit.as_str());
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile;
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }

        if self.require_pas_extension && !metadata.is_pas_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            let ext = metadata.extension.as_deref().unwrap_or("none");
            log_error!(error.error_code(), "File does not have the .pas extension",
                "file" => file_path,
                "extension" => ext);
            return Err(error);
        }

        if metadata.is_large_file() {
            let human = metadata.human_readable_size();
            crate::logging::log_warning_with_context(
                codes::warnings::LARGE_FILE,
                "Source file is larger than the large-file threshold",
                None,
                vec![("file", file_path), ("size_human", human.as_str())],
            );
        }

        Ok(())
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    const HELLO: &str = "program hello;\nmulai\n  writeln('hi')\nselesai.\n";

    #[test]
    fn reads_pascal_source_with_metadata() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("hello.pas");
        fs::write(&file_path, HELLO).unwrap();

        let result = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap();

        assert_eq!(result.source, HELLO);
        assert_eq!(result.metadata.line_count, 4);
        assert!(result.metadata.is_pas_file);
        assert_eq!(result.metadata.extension.as_deref(), Some("pas"));
        assert_eq!(result.metadata.stem(), "hello");
        assert!(!result.metadata.is_large_file());
        assert!(!result.is_effectively_empty());
    }

    #[test]
    fn missing_file_is_reported() {
        let result = FileProcessor::new().process_file("does_not_exist.pas");
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn empty_path_is_invalid() {
        let result = FileProcessor::new().process_file("  ");
        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
    }

    #[test]
    fn directory_is_not_a_source_file() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(dir.path().to_str().unwrap());
        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.pas");
        fs::write(&file_path, "").unwrap();

        let result = FileProcessor::new().process_file(file_path.to_str().unwrap());
        assert_matches!(result, Err(FileProcessorError::EmptyFile));
    }

    #[test]
    fn extension_is_enforced_only_when_required() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("hello.txt");
        fs::write(&file_path, HELLO).unwrap();
        let path = file_path.to_str().unwrap();

        assert!(FileProcessor::new().process_file(path).is_ok());

        let strict = FileProcessor::new().with_pas_extension_required(true);
        assert_matches!(
            strict.process_file(path),
            Err(FileProcessorError::InvalidExtension { extension: Some(ext) }) if ext == "txt"
        );
    }

    #[test]
    fn uppercase_extension_counts_as_pascal() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("HELLO.PAS");
        fs::write(&file_path, HELLO).unwrap();

        let result = FileProcessor::new()
            .with_pas_extension_required(true)
            .process_file(file_path.to_str().unwrap())
            .unwrap();
        assert!(result.metadata.is_pas_file);
    }

    #[test]
    fn oversized_file_is_rejected() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.pas");
        fs::write(&file_path, "a".repeat((MAX_FILE_SIZE + 1) as usize)).unwrap();

        let result = FileProcessor::new().process_file(file_path.to_str().unwrap());
        assert_matches!(
            result,
            Err(FileProcessorError::FileTooLarge { max_size, .. }) if max_size == MAX_FILE_SIZE
        );
    }

    #[test]
    fn line_limit_is_enforced() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("long.pas");
        fs::write(&file_path, "\n".repeat(MAX_LINE_COUNT + 1)).unwrap();

        let result = FileProcessor::new().process_file(file_path.to_str().unwrap());
        assert_matches!(
            result,
            Err(FileProcessorError::TooManyLines { max_lines, .. }) if max_lines == MAX_LINE_COUNT
        );
    }

    #[test]
    fn error_codes_and_severity() {
        let error = FileProcessorError::FileNotFound {
            path: "x.pas".to_string(),
        };
        assert_eq!(error.error_code().as_str(), "E005");
        assert_eq!(error.severity(), "High");
        assert!(codes::requires_halt(error.error_code().as_str()));

        let lines = FileProcessorError::TooManyLines {
            lines: 10,
            max_lines: 5,
        };
        assert_eq!(lines.error_code().as_str(), "E007");
    }

    #[test]
    fn preferences_carry_over() {
        let prefs = FileProcessorPreferences {
            require_pas_extension: true,
            enable_performance_logging: false,
        };
        let processor = FileProcessor::from_preferences(&prefs);
        assert!(processor.require_pas_extension);
        assert!(!processor.enable_performance_logging);
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.00 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.00 MB");
    }
}
