use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::config::BusType;
use crate::errors::*;

pub const APP_NAME: &str = "bluechi-monitor";
pub const USR_SHARE_PATH: &str = "/usr/share/bluechi-monitor";

/// Tries to find a file in standard locations:
/// - First try to find a file by full path (only if path is absolute)
/// - Then try XDG_CONFIG_HOME (e.g. `~/.config`)
/// - Then try `/usr/share/`
pub fn find_file(file: &str) -> Option<PathBuf> {
    let file = Path::new(file);

    if file.is_absolute() && file.exists() {
        return Some(file.to_path_buf());
    }

    // Try XDG_CONFIG_HOME (e.g. `~/.config`)
    if let Some(xdg_config) = dirs::config_dir() {
        let path = xdg_config.join(APP_NAME).join(file);
        if path.exists() {
            return Some(path);
        }
    }

    // Try `/usr/share/`
    let usr_share_path = Path::new(USR_SHARE_PATH).join(file);
    if usr_share_path.exists() {
        return Some(usr_share_path);
    }

    None
}

pub fn deserialize_toml_file<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let contents = std::fs::read_to_string(path)
        .configuration_error(format!("Failed to read file: {}", path.display()))?;

    toml::from_str(&contents)
        .configuration_error(format!("Failed to deserialize TOML file {}", path.display()))
}

/// Opens a connection to the requested bus.
///
/// An explicit `address` wins over `bus`.
pub async fn new_dbus_connection(bus: BusType, address: Option<&str>) -> Result<zbus::Connection> {
    if let Some(address) = address {
        return zbus::connection::Builder::address(address)
            .connection_error(format!("Invalid bus address '{address}'"))?
            .build()
            .await
            .connection_error(format!("Failed to connect to bus at {address}"));
    }
    match bus {
        BusType::System => zbus::Connection::system()
            .await
            .connection_error("Failed to connect to system bus"),
        BusType::Session => zbus::Connection::session()
            .await
            .connection_error("Failed to connect to session bus"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_file_absolute() {
        let dir = std::env::temp_dir();
        let path = dir.join("bluechi-monitor-find-file-test.toml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(find_file(path.to_str().unwrap()), Some(path.clone()));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn find_file_missing() {
        assert_eq!(find_file("/nonexistent/bluechi-monitor.toml"), None);
    }

    #[test]
    fn deserialize_missing_file() {
        let err = deserialize_toml_file::<toml::Table, _>("/nonexistent/config.toml").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
