//! Runtime configuration.
//!
//! Every key is optional; an absent file means the BlueChi defaults. A `[agent]` or `[nodes]`
//! table replaces the whole section, so it needs at least `interface` and `format`.
//!
//! ```toml
//! bus = "system"
//! service = "org.eclipse.bluechi"
//! object_path = "/org/eclipse/bluechi"
//! queue_size = 10
//!
//! [agent]
//! interface = "org.eclipse.bluechi.Agent"
//! property = "Status"
//! format = "Agent status: $status"
//!
//! [nodes]
//! interface = "org.eclipse.bluechi.Node"
//! property = "Status"
//! format = "Node $node: $status"
//! ```

use serde::Deserialize;
use smart_default::SmartDefault;

use crate::errors::*;
use crate::formatting::Format;
use crate::util;

pub const DEFAULT_SERVICE: &str = "org.eclipse.bluechi";
pub const DEFAULT_OBJECT_PATH: &str = "/org/eclipse/bluechi";
pub const AGENT_INTERFACE: &str = "org.eclipse.bluechi.Agent";
pub const NODE_INTERFACE: &str = "org.eclipse.bluechi.Node";
pub const STATUS_PROPERTY: &str = "Status";

pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";
pub const PROPERTIES_CHANGED: &str = "PropertiesChanged";

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, SmartDefault)]
#[serde(rename_all = "snake_case")]
pub enum BusType {
    #[default]
    System,
    Session,
}

#[derive(Deserialize, Debug, Clone, SmartDefault)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub bus: BusType,
    /// Explicit D-Bus address, overrides `bus`
    pub address: Option<String>,
    #[default(DEFAULT_SERVICE.into())]
    pub service: String,
    #[default(DEFAULT_OBJECT_PATH.into())]
    pub object_path: String,
    /// How many unprocessed messages zbus buffers before dropping
    #[default(10)]
    pub queue_size: usize,
    #[default(WatchConfig::agent())]
    pub agent: WatchConfig,
    #[default(WatchConfig::nodes())]
    pub nodes: WatchConfig,
}

/// What to watch and how to print it.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    pub interface: String,
    #[serde(default = "default_property")]
    pub property: String,
    pub format: Format,
}

fn default_property() -> String {
    STATUS_PROPERTY.into()
}

impl WatchConfig {
    pub fn agent() -> Self {
        Self {
            interface: AGENT_INTERFACE.into(),
            property: default_property(),
            format: builtin_format("Agent status: $status"),
        }
    }

    pub fn nodes() -> Self {
        Self {
            interface: NODE_INTERFACE.into(),
            property: default_property(),
            format: builtin_format("Node $node: $status"),
        }
    }
}

fn builtin_format(s: &str) -> Format {
    match s.parse() {
        Ok(format) => format,
        Err(e) => unreachable!("builtin format '{s}' is invalid: {e}"),
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicitly requested file must exist. Otherwise `config.toml` is looked up in the
    /// standard locations and the defaults are used if it is not found.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(path) => util::deserialize_toml_file(path),
            None => match util::find_file("config.toml") {
                Some(path) => {
                    log::debug!("using config file {}", path.display());
                    util::deserialize_toml_file(path)
                }
                None => Ok(Self::default()),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_size == 0 {
            return Err(Error::configuration("queue_size must be at least 1"));
        }
        if !self.object_path.starts_with('/') {
            return Err(Error::configuration(format!(
                "object_path '{}' must start with '/'",
                self.object_path
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.bus, BusType::System);
        assert_eq!(config.service, "org.eclipse.bluechi");
        assert_eq!(config.object_path, "/org/eclipse/bluechi");
        assert_eq!(config.agent.interface, "org.eclipse.bluechi.Agent");
        assert_eq!(config.agent.property, "Status");
        assert_eq!(config.nodes.interface, "org.eclipse.bluechi.Node");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.agent, WatchConfig::agent());
        assert_eq!(config.nodes, WatchConfig::nodes());
        assert_eq!(config.queue_size, 10);
    }

    #[test]
    fn overrides() {
        let config: Config = toml::from_str(
            r#"
            bus = "session"
            queue_size = 32

            [agent]
            interface = "org.example.Agent"
            format = "state=$status"
            "#,
        )
        .unwrap();
        assert_eq!(config.bus, BusType::Session);
        assert_eq!(config.queue_size, 32);
        assert_eq!(config.agent.interface, "org.example.Agent");
        assert_eq!(config.agent.property, "Status");
        assert_eq!(config.agent.format, "state=$status".parse::<Format>().unwrap());
        assert_eq!(config.nodes, WatchConfig::nodes());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<Config>("colour = true").is_err());
    }

    #[test]
    fn rejects_bad_format() {
        let res = toml::from_str::<Config>(
            r#"
            [agent]
            interface = "org.eclipse.bluechi.Agent"
            format = "$unknown"
            "#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn validate_object_path() {
        let config = Config {
            object_path: "org/eclipse".into(),
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().kind, ErrorKind::Configuration);
    }
}
