#![warn(clippy::match_same_arms)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::unnecessary_wraps)]

pub mod config;
pub mod errors;
pub mod formatting;
pub mod listener;
pub mod notification;
pub mod signals;
pub mod subscription;
pub mod util;

use std::pin::Pin;

use futures::Stream;

use crate::config::{BusType, Config};
use crate::errors::*;
use crate::listener::Listener;

pub type BoxedStream<T> = Pin<Box<dyn Stream<Item = T>>>;

/// Watch the connection status of a BlueChi agent, or of every node managed by a BlueChi
/// controller. The bluechi-monitor program subscribes to `PropertiesChanged` signals on the
/// system bus and prints one line per status change to standard output.
#[derive(Debug, clap::Parser)]
#[clap(author, about, long_about, version = env!("VERSION"))]
pub struct CliArgs {
    /// Sets a TOML config file
    ///
    /// If not given, `config.toml` is looked up in `$XDG_CONFIG_HOME/bluechi-monitor`, then in
    /// `/usr/share/bluechi-monitor`. Without any config file the BlueChi defaults are used.
    #[clap(short, long)]
    pub config: Option<String>,
    /// Connect to the session bus instead of the system bus
    #[clap(long, conflicts_with = "address")]
    pub session: bool,
    /// Connect to the bus at this D-Bus address, e.g. `unix:path=/run/dbus/system_bus_socket`
    #[clap(long)]
    pub address: Option<String>,
    /// Watch this property instead of `Status`
    #[clap(long)]
    pub property: Option<String>,
    #[clap(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::Subcommand)]
pub enum Mode {
    /// Print the agent status whenever it changes (default)
    #[default]
    Agent,
    /// Print the status of every node known to the controller whenever it changes
    Nodes,
}

impl CliArgs {
    /// Applies command line overrides on top of the config file.
    pub fn apply(&self, config: &mut Config) {
        if self.session {
            config.bus = BusType::Session;
            config.address = None;
        }
        if let Some(address) = &self.address {
            config.address = Some(address.clone());
        }
        if let Some(property) = &self.property {
            config.agent.property = property.clone();
            config.nodes.property = property.clone();
        }
    }
}

pub async fn run(args: CliArgs) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let shutdown = signals::shutdown_stream()?;

    let conn = util::new_dbus_connection(config.bus, config.address.as_deref()).await?;
    log::info!("connected to {:?} bus", config.bus);

    let listener = match args.mode.unwrap_or_default() {
        Mode::Agent => Listener::agent(conn, &config).await?,
        Mode::Nodes => Listener::nodes(conn, &config).await?,
    };

    let stdout = std::io::stdout();
    listener.run(shutdown, &mut stdout.lock()).await
}
