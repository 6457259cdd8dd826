mod event_loop;
mod pulse;

use event_loop::EventLoop;
pub use pulse::PulseServer;

use crate::{Result, ServerInfo, SinkCatalog};

/// Connection state as seen by the connect wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Any state on the way to ready: unconnected, connecting, authorizing,
    /// setting the client name.
    Connecting,
    Ready,
    Failed,
    Terminated,
}

impl ConnectionState {
    /// Whether a connect wait should stop on this state.
    pub fn is_settled(&self) -> bool {
        !matches!(self, ConnectionState::Connecting)
    }
}

/// The blocking operations the switcher needs from an audio server.
pub trait AudioServer {
    fn server_info(&mut self) -> Result<ServerInfo>;

    /// Clear `catalog` and refill it in the order the server reports sinks.
    /// On failure the catalog is left empty and not loaded.
    fn load_sinks(&mut self, catalog: &mut SinkCatalog) -> Result<()>;

    fn set_default_sink(&mut self, name: &str) -> Result<()>;
}

impl AudioServer for Box<dyn AudioServer> {
    fn server_info(&mut self) -> Result<ServerInfo> {
        (**self).server_info()
    }

    fn load_sinks(&mut self, catalog: &mut SinkCatalog) -> Result<()> {
        (**self).load_sinks(catalog)
    }

    fn set_default_sink(&mut self, name: &str) -> Result<()> {
        (**self).set_default_sink(name)
    }
}
