//! Bus-facing side: match-rule subscriptions and the BlueChi controller proxy.

use futures::{Stream, StreamExt};
use zbus::message::Message;
use zbus::names::InterfaceName;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};
use zbus::{Connection, MatchRule, MessageStream};

use crate::BoxedStream;
use crate::config::{NODE_INTERFACE, STATUS_PROPERTY, WatchConfig};
use crate::errors::*;
use crate::notification::Notification;

/// The rule matching `interface.signal` signals emitted under `object_path`, from any sender.
pub fn match_rule<'m>(
    object_path: &'m str,
    interface: &'m str,
    signal: &'m str,
) -> Result<MatchRule<'m>> {
    Ok(MatchRule::builder()
        .msg_type(zbus::message::Type::Signal)
        .path(object_path)
        .and_then(|x| x.interface(interface))
        .and_then(|x| x.member(signal))
        .subscription_error(format!(
            "Invalid match rule for {interface}.{signal} on {object_path}"
        ))?
        .build())
}

/// Registers a match rule for `interface.signal` emitted under `object_path` and returns the
/// stream of matching messages.
///
/// The rule is installed on the bus daemon for as long as the stream is alive.
pub async fn subscribe(
    conn: &Connection,
    object_path: &str,
    interface: &str,
    signal: &str,
    queue_size: usize,
) -> Result<MessageStream> {
    let rule = match_rule(object_path, interface, signal)?;
    log::debug!("adding match rule {rule}");

    MessageStream::for_match_rule(rule, conn, Some(queue_size))
        .await
        .subscription_error(format!(
            "Failed to subscribe to {interface}.{signal} on {object_path}"
        ))
}

/// Turns raw messages into notifications, dropping transport errors and undecodable bodies.
pub fn notifications<S>(stream: S) -> BoxedStream<Notification>
where
    S: Stream<Item = zbus::Result<Message>> + 'static,
{
    stream
        .filter_map(|msg| async move {
            match msg {
                Ok(msg) => Notification::from_message(&msg),
                Err(e) => {
                    log::warn!("Failed to receive message: {e}");
                    None
                }
            }
        })
        .boxed_local()
}

#[zbus::proxy(
    interface = "org.eclipse.bluechi.Controller",
    default_service = "org.eclipse.bluechi",
    default_path = "/org/eclipse/bluechi"
)]
trait Controller {
    fn list_nodes(&self) -> zbus::Result<Vec<(String, OwnedObjectPath, String)>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub name: String,
    pub path: OwnedObjectPath,
    pub status: String,
}

impl NodeInfo {
    /// The status `ListNodes` reported, as a notification for `watch`.
    ///
    /// `ListNodes` only carries the node's `Status`, so this is `None` when `watch` looks at any
    /// other interface or property.
    pub fn listed_status(&self, watch: &WatchConfig) -> Result<Option<Notification>> {
        if watch.interface != NODE_INTERFACE || watch.property != STATUS_PROPERTY {
            return Ok(None);
        }
        let value = OwnedValue::try_from(Value::from(self.status.as_str()))
            .error("Failed to convert node status")?;
        let notification = Notification::single(NODE_INTERFACE, STATUS_PROPERTY, value);
        Ok(Some(notification.with_source(self.name.clone())))
    }
}

/// Asks the controller at `service`/`object_path` for all nodes it knows about.
pub async fn list_nodes(conn: &Connection, service: &str, object_path: &str) -> Result<Vec<NodeInfo>> {
    let proxy = ControllerProxy::builder(conn)
        .destination(service.to_owned())
        .and_then(|x| x.path(object_path.to_owned()))
        .subscription_error("Invalid controller service or object path")?
        .build()
        .await
        .subscription_error("Failed to create ControllerProxy")?;

    let nodes = proxy
        .list_nodes()
        .await
        .subscription_error(format!("Failed to list nodes of {service}"))?;

    Ok(nodes
        .into_iter()
        .map(|(name, path, status)| NodeInfo { name, path, status })
        .collect())
}

/// Subscribes to property changes of every node and merges them into one stream, each
/// notification tagged with its node's name.
pub async fn node_notifications(
    conn: &Connection,
    nodes: &[NodeInfo],
    interface: &str,
    signal: &str,
    queue_size: usize,
) -> Result<BoxedStream<Notification>> {
    let mut streams = Vec::with_capacity(nodes.len());
    for node in nodes {
        let stream = subscribe(conn, node.path.as_str(), interface, signal, queue_size).await?;
        let name = node.name.clone();
        streams.push(
            notifications(stream)
                .map(move |n| n.with_source(name.clone()))
                .boxed_local(),
        );
    }
    Ok(futures::stream::select_all(streams).boxed_local())
}

/// The current value of the watched property of `node`.
///
/// The status from `ListNodes` is used when it is what `watch` looks at. Anything else is read
/// with `org.freedesktop.DBus.Properties.Get` on the node's object path.
pub async fn node_snapshot(
    conn: &Connection,
    service: &str,
    watch: &WatchConfig,
    node: &NodeInfo,
) -> Result<Notification> {
    if let Some(notification) = node.listed_status(watch)? {
        return Ok(notification);
    }

    let interface = InterfaceName::try_from(watch.interface.as_str())
        .configuration_error(format!("Invalid interface name '{}'", watch.interface))?;
    let proxy = zbus::fdo::PropertiesProxy::builder(conn)
        .destination(service.to_owned())
        .and_then(|x| x.path(node.path.as_str()))
        .subscription_error(format!("Invalid object path of node {}", node.name))?
        .build()
        .await
        .subscription_error("Failed to create PropertiesProxy")?;

    let value = proxy
        .get(interface, &watch.property)
        .await
        .subscription_error(format!(
            "Failed to read {}.{} of node {}",
            watch.interface, watch.property, node.name
        ))?;

    let notification = Notification::single(watch.interface.as_str(), &watch.property, value);
    Ok(notification.with_source(node.name.clone()))
}
