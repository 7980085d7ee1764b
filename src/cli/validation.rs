//! Value parsers for CLI arguments that clap cannot check on its own.

use std::net::IpAddr;
use std::path::PathBuf;

const MAX_ROLLBACK_STEPS: u32 = 100;

pub fn validate_port(raw: &str) -> Result<u16, String> {
    match raw.parse::<u16>() {
        Ok(0) => Err("port must be between 1 and 65535".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!("port must be a number between 1 and 65535, got '{raw}'")),
    }
}

/// The file must exist and be a regular file.
pub fn validate_config_file_path(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if !path.exists() {
        return Err(format!("configuration file does not exist: '{raw}'"));
    }
    if !path.is_file() {
        return Err(format!("configuration path is not a file: '{raw}'"));
    }
    Ok(path)
}

pub fn validate_rollback_steps(raw: &str) -> Result<u32, String> {
    let steps: u32 = raw
        .parse()
        .map_err(|_| format!("rollback steps must be a positive number, got '{raw}'"))?;
    if steps == 0 {
        return Err("rollback steps must be greater than 0".to_string());
    }
    if steps > MAX_ROLLBACK_STEPS {
        return Err(format!("rollback steps cannot exceed {MAX_ROLLBACK_STEPS}"));
    }
    Ok(steps)
}

/// Accepts IP literals, `localhost`, and RFC 1123 host names.
pub fn validate_host_address(raw: &str) -> Result<String, String> {
    let host = raw.trim();
    if host.is_empty() {
        return Err("host address cannot be empty".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }
    let valid_hostname = host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && !host.chars().all(|c| c.is_ascii_digit() || c == '.');
    if valid_hostname {
        Ok(host.to_string())
    } else {
        Err(format!("invalid host address '{raw}'"))
    }
}
