use env_logger::{Builder, Env, WriteStyle};
use log::{error, info, warn};

/// Initialize the logging system, honouring `RUST_LOG` and defaulting to `info`
pub fn initialize_logging() -> Result<(), Box<dyn std::error::Error>> {
    Builder::from_env(Env::default().default_filter_or("info"))
        // Enable timestamps
        .format_timestamp_secs()
        // Enable module path in logs
        .format_module_path(true)
        // Set colored output for console
        .write_style(WriteStyle::Auto)
        .target(env_logger::Target::Stderr)
        .try_init()?;

    info!("Logging system initialized");
    Ok(())
}

/// Helper function to format sensitive data for logging
pub fn format_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Structured logging for authentication events
pub fn log_auth_event(event_type: &str, username: &str, success: bool, details: Option<&str>) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    if success {
        info!(
            "Auth event: type={}, user={}, success=true, timestamp={}, details={:?}",
            event_type,
            format_sensitive(username),
            timestamp,
            details
        );
    } else {
        warn!(
            "Auth event: type={}, user={}, success=false, timestamp={}, details={:?}",
            event_type,
            format_sensitive(username),
            timestamp,
            details
        );
    }
}

/// Structured logging for outbound API calls
pub fn log_request(method: &str, path: &str, status: Option<u16>, success: bool) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let status = status.map_or_else(|| "none".to_string(), |s| s.to_string());
    if success {
        info!(
            "API request: method={}, path={}, status={}, success=true, timestamp={}",
            method, path, status, timestamp
        );
    } else {
        error!(
            "API request: method={}, path={}, status={}, success=false, timestamp={}",
            method, path, status, timestamp
        );
    }
}
