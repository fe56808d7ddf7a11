//! config-rs/lib.rs
//! Process-level settings for the SRE assistant service: `.env` loading and
//! where the HTTP listener binds.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Name used to derive `<NAME>_SERVICE_PORT` / `<NAME>_SERVICE_ADDR`
pub const SERVICE_NAME: &str = "SRE_ASSISTANT";

/// Port the assistant listens on when nothing else is configured
pub const DEFAULT_PORT: u16 = 8383;

/// Load variables from a `.env` file if one exists.
///
/// Returns whether a file was loaded; a missing file is not an error.
pub fn load_env() -> bool {
    match dotenv::dotenv() {
        Ok(path) => {
            log::debug!("Loaded environment from {}", path.display());
            true
        }
        Err(_) => false,
    }
}

/// Get service port from environment variables with proper fallback
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "SRE_ASSISTANT")
/// * `default_port` - The default port to use if not specified in environment
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    match env::var(&var_name) {
        Ok(value) => value.trim().parse::<u16>().unwrap_or_else(|_| {
            log::warn!("Invalid port in {}, using default {}", var_name, default_port);
            default_port
        }),
        Err(_) => default_port,
    }
}

/// Socket address the service should bind.
///
/// `<NAME>_SERVICE_ADDR` wins when it holds `host:port`, optionally with an
/// `http://` or `https://` scheme; otherwise all interfaces on the port from
/// [`get_service_port`].
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        let trimmed = addr_str.trim();
        let without_scheme = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
            .unwrap_or(trimmed)
            .trim_end_matches('/');

        match without_scheme.parse::<SocketAddr>() {
            Ok(addr) => return addr,
            Err(_) => log::warn!("Invalid address format in {}, using default", var_name),
        }
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)
}

/// Service name for logging, e.g. `sre-assistant-service`
pub fn get_formatted_service_name(service_name: &str) -> String {
    format!("{}-service", service_name.to_lowercase().replace('_', "-"))
}
