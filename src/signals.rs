use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;

use crate::BoxedStream;
use crate::errors::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

/// Returns an infinite stream of shutdown requests
pub fn shutdown_stream() -> Result<BoxedStream<Signal>> {
    let signals = Signals::new([SIGINT, SIGTERM]).error("Failed to register signal handlers")?;
    Ok(signals
        .map(|signal| match signal {
            SIGINT => Signal::Interrupt,
            _ => Signal::Terminate,
        })
        .boxed())
}
