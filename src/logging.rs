// src/logging.rs

use crate::errors::{CoinchatError, CoinchatResult};
use crate::models::ApiCallLog;
use flexi_logger::{FileSpec, Logger, LoggerHandle};
use log::info;

/// Starts the file logger. The terminal belongs to the TUI, so everything goes
/// to `coinchat.log` in the working directory. The returned handle must stay
/// alive for the lifetime of the program.
pub fn init_logging(level: &str) -> CoinchatResult<LoggerHandle> {
    let handle = Logger::try_with_str(level)
        .map_err(|e| CoinchatError::config_error(format!("invalid log level: {}", e)))?
        .log_to_file(FileSpec::default().basename("coinchat").suppress_timestamp())
        .append()
        .start()
        .map_err(|e| CoinchatError::config_error(format!("failed to start logger: {}", e)))?;
    Ok(handle)
}

/// Logs one API call in a fixed single-line format.
pub fn log_api_call(call: &ApiCallLog) {
    info!(
        target: "api",
        "[{}] {} - {} - Status: {} - Time: {}ms",
        call.timestamp.to_rfc3339(),
        call.endpoint,
        call.request_summary,
        call.response_status,
        call.response_time_ms
    );
}
