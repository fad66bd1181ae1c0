//! The status listener: connect, subscribe, receive, filter and print.

use std::io::Write;

use futures::{Stream, StreamExt};
use zbus::Connection;

use crate::BoxedStream;
use crate::config::{Config, PROPERTIES_CHANGED, PROPERTIES_INTERFACE, WatchConfig};
use crate::errors::*;
use crate::formatting::{Format, Values, value};
use crate::notification::{ChangedProperties, Notification};
use crate::signals::Signal;
use crate::subscription;

/// What the listener decided to do with a single notification.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Some other interface changed
    Ignored,
    /// The watched interface changed, but not the watched property
    Unchanged,
    /// The changed properties were not a name to variant mapping
    Malformed(String),
    Status(String),
}

impl Outcome {
    /// The warning to log for this outcome, if any. `source` names the node it came from.
    pub fn warning(&self, source: Option<&str>) -> Option<String> {
        let Outcome::Malformed(reason) = self else {
            return None;
        };
        Some(match source {
            Some(node) => format!("Received invalid property changed signal for {node}: {reason}"),
            None => format!("Received invalid property changed signal: {reason}"),
        })
    }
}

/// Watches a single property of a single interface.
#[derive(Debug, Clone)]
pub struct Watch {
    interface: String,
    property: String,
    format: Format,
}

impl Watch {
    pub fn new(config: &WatchConfig) -> Self {
        Self {
            interface: config.interface.clone(),
            property: config.property.clone(),
            format: config.format.clone(),
        }
    }

    pub fn handle(&self, notification: &Notification) -> Outcome {
        if notification.interface != self.interface {
            return Outcome::Ignored;
        }
        match &notification.changed {
            ChangedProperties::Malformed(reason) => Outcome::Malformed(reason.clone()),
            ChangedProperties::Properties(properties) => match properties.get(&self.property) {
                Some(status) => Outcome::Status(value::render(status)),
                None => Outcome::Unchanged,
            },
        }
    }

    pub fn line(&self, notification: &Notification, status: &str) -> String {
        let mut values = Values::new();
        values.insert("status", status);
        values.insert("node", notification.source.as_deref().unwrap_or(""));
        values.insert("interface", &notification.interface);
        values.insert("property", &self.property);
        self.format.render(&values)
    }

    /// Handles one notification, writing at most one line to `out`.
    pub fn process<W: Write>(&self, notification: &Notification, out: &mut W) -> Result<()> {
        let outcome = self.handle(notification);
        if let Some(warning) = outcome.warning(notification.source.as_deref()) {
            log::warn!("{warning}");
        }
        match outcome {
            Outcome::Ignored => log::trace!("ignoring change of {}", notification.interface),
            Outcome::Unchanged => log::debug!("{} did not change", self.property),
            Outcome::Malformed(_) => (),
            Outcome::Status(status) => {
                writeln!(out, "{}", self.line(notification, &status))
                    .output_error("Failed to write status")?;
                out.flush().output_error("Failed to flush output")?;
            }
        }
        Ok(())
    }
}

/// Processes notifications in arrival order until the stream ends or a shutdown signal arrives.
pub async fn listen<N, S, W>(watch: &Watch, mut notifications: N, mut shutdown: S, out: &mut W) -> Result<()>
where
    N: Stream<Item = Notification> + Unpin,
    S: Stream<Item = Signal> + Unpin,
    W: Write,
{
    loop {
        tokio::select! {
            notification = notifications.next() => match notification {
                Some(notification) => watch.process(&notification, out)?,
                None => {
                    log::info!("notification stream ended");
                    return Ok(());
                }
            },
            Some(signal) = shutdown.next() => {
                log::info!("received {signal:?}, shutting down");
                return Ok(());
            }
        }
    }
}

/// Owns the bus connection for the lifetime of a monitoring run.
pub struct Listener {
    conn: Connection,
    watch: Watch,
    notifications: BoxedStream<Notification>,
}

impl Listener {
    /// Watches the agent interface under the configured object path.
    pub async fn agent(conn: Connection, config: &Config) -> Result<Self> {
        let stream = subscription::subscribe(
            &conn,
            &config.object_path,
            PROPERTIES_INTERFACE,
            PROPERTIES_CHANGED,
            config.queue_size,
        )
        .await?;
        Ok(Self {
            watch: Watch::new(&config.agent),
            notifications: subscription::notifications(stream),
            conn,
        })
    }

    /// Watches every node the controller knows about. The current value of each node's watched
    /// property is reported first; a node whose value cannot be read only gets a warning.
    pub async fn nodes(conn: Connection, config: &Config) -> Result<Self> {
        let nodes = subscription::list_nodes(&conn, &config.service, &config.object_path).await?;
        if nodes.is_empty() {
            log::warn!("{} reports no nodes", config.service);
        }

        let live = subscription::node_notifications(
            &conn,
            &nodes,
            PROPERTIES_INTERFACE,
            PROPERTIES_CHANGED,
            config.queue_size,
        )
        .await?;

        let mut initial = Vec::with_capacity(nodes.len());
        for node in &nodes {
            match subscription::node_snapshot(&conn, &config.service, &config.nodes, node).await {
                Ok(notification) => initial.push(notification),
                Err(e) => log::warn!("{e}"),
            }
        }

        Ok(Self {
            watch: Watch::new(&config.nodes),
            notifications: futures::stream::iter(initial).chain(live).boxed_local(),
            conn,
        })
    }

    pub async fn run<W: Write>(self, shutdown: BoxedStream<Signal>, out: &mut W) -> Result<()> {
        let result = listen(&self.watch, self.notifications, shutdown, out).await;
        if let Err(e) = self.conn.close().await {
            log::debug!("failed to close bus connection: {e}");
        }
        result
    }
}
