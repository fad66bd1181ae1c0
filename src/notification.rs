//! Decoding of `org.freedesktop.DBus.Properties.PropertiesChanged` signals.
//!
//! The wire shape is `(s interface, a{sv} changed, as invalidated)`. Only the first two fields
//! are used. Decoding is lenient: anything that does not even carry an interface name is
//! dropped, and a second field of the wrong shape is kept as [`ChangedProperties::Malformed`] so
//! the listener can warn about it.

use std::collections::HashMap;

use zbus::message::Message;
use zbus::zvariant::{OwnedValue, Structure, Value};

#[derive(Debug, PartialEq)]
pub enum ChangedProperties {
    Properties(HashMap<String, OwnedValue>),
    /// The second field was not an `a{sv}`; holds a description of what was received
    Malformed(String),
}

impl ChangedProperties {
    fn decode(value: Value<'_>) -> Self {
        let signature = value.value_signature().to_string();
        match value {
            Value::Dict(dict) if signature == "a{sv}" => {
                match HashMap::<String, OwnedValue>::try_from(dict) {
                    Ok(properties) => Self::Properties(properties),
                    Err(e) => Self::Malformed(format!("undecodable a{{sv}}: {e}")),
                }
            }
            _ => Self::Malformed(format!("expected a{{sv}}, got {signature}")),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Notification {
    /// Name of the node this notification was received for, if any
    pub source: Option<String>,
    pub interface: String,
    pub changed: ChangedProperties,
}

impl Notification {
    pub fn new(interface: impl Into<String>, changed: ChangedProperties) -> Self {
        Self {
            source: None,
            interface: interface.into(),
            changed,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Builds a notification carrying a single changed property.
    pub fn single(interface: impl Into<String>, property: &str, value: OwnedValue) -> Self {
        let mut properties = HashMap::new();
        properties.insert(property.to_owned(), value);
        Self::new(interface, ChangedProperties::Properties(properties))
    }

    /// Returns `None` if the message body does not start with an interface name.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let body = msg.body();
        let structure: Structure<'_> = match body.deserialize() {
            Ok(structure) => structure,
            Err(e) => {
                log::debug!("ignoring signal with undecodable body: {e}");
                return None;
            }
        };

        let mut fields = structure.into_fields().into_iter();
        let interface = match fields.next()? {
            Value::Str(s) => s.to_string(),
            _ => return None,
        };
        let changed = match fields.next() {
            Some(value) => ChangedProperties::decode(value),
            None => ChangedProperties::Malformed("missing changed properties".into()),
        };

        Some(Self::new(interface, changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: &str = "org.eclipse.bluechi.Agent";

    fn signal<B>(body: &B) -> Message
    where
        B: serde::Serialize + zbus::zvariant::DynamicType,
    {
        Message::signal(
            "/org/eclipse/bluechi",
            "org.freedesktop.DBus.Properties",
            "PropertiesChanged",
        )
        .unwrap()
        .build(body)
        .unwrap()
    }

    #[test]
    fn decode_properties_changed() {
        let mut changed = HashMap::new();
        changed.insert("Status", Value::from("online"));
        let msg = signal(&(AGENT, changed, Vec::<&str>::new()));

        let notification = Notification::from_message(&msg).unwrap();
        assert_eq!(notification.interface, AGENT);
        assert_eq!(notification.source, None);
        let ChangedProperties::Properties(properties) = notification.changed else {
            panic!("expected properties");
        };
        assert_eq!(
            crate::formatting::value::render(&properties["Status"]),
            "online"
        );
    }

    #[test]
    fn decode_wrong_mapping_shape() {
        let mut changed = HashMap::new();
        changed.insert("Status", "online");
        let msg = signal(&(AGENT, changed, Vec::<&str>::new()));

        let notification = Notification::from_message(&msg).unwrap();
        assert_eq!(notification.interface, AGENT);
        assert!(matches!(
            notification.changed,
            ChangedProperties::Malformed(ref reason) if reason.contains("a{ss}")
        ));
    }

    #[test]
    fn decode_without_interface_name() {
        let msg = signal(&(42u32, 7u32));
        assert_eq!(Notification::from_message(&msg), None);
    }

    #[test]
    fn builders() {
        let n = Notification::single(
            AGENT,
            "Status",
            OwnedValue::try_from(Value::from("offline")).unwrap(),
        )
        .with_source("node-foo");
        assert_eq!(n.source.as_deref(), Some("node-foo"));
        assert!(matches!(n.changed, ChangedProperties::Properties(ref p) if p.len() == 1));
    }
}
