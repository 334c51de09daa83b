use super::PipelineError;
use crate::config::constants::language::OUTPUT_EXTENSION;
use crate::logging::codes;
use crate::{log_debug, log_error};
use std::fs;
use std::path::{Path, PathBuf};

/// `<dir>/<stem>.out` next to the source file
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}

pub fn write_output(path: &Path, contents: &str) -> Result<(), PipelineError> {
    let path_str = path.display().to_string();
    fs::write(path, contents).map_err(|source| {
        log_error!(codes::file_processing::IO_ERROR, "Failed to write output file",
            "path" => path_str.as_str(),
            "io_error" => source.to_string()
        );
        PipelineError::OutputWrite {
            path: path_str.clone(),
            source,
        }
    })?;
    log_debug!("Output written", "path" => path_str.as_str(), "bytes" => contents.len());
    Ok(())
}
