use tracing::{debug, warn};

use crate::{resolve, AudioServer, PulseServer, Result, ServerInfo, Sink, SinkCatalog};

/// Lists sinks on one server connection and changes its default sink.
///
/// A switcher only exists on top of a connected server, so each session
/// connects exactly once. Calls are serialized through `&mut self`.
pub struct Switcher<S> {
    server: S,
    info: Option<ServerInfo>,
    sinks: SinkCatalog,
}

impl Switcher<PulseServer> {
    /// Connect to the PulseAudio server `server`, or the default one.
    pub fn connect(server: Option<&str>) -> Result<Self> {
        PulseServer::connect(server).map(Self::new)
    }
}

impl<S> Switcher<S>
where
    S: AudioServer,
{
    pub fn new(server: S) -> Self {
        Self {
            server,
            info: None,
            sinks: SinkCatalog::new(),
        }
    }

    pub fn load_server_info(&mut self) -> Result<&ServerInfo> {
        let info = self.server.server_info()?;
        debug!(
            name = %info.server_name,
            version = %info.server_version,
            default_sink = %info.default_sink_name,
            "server info"
        );
        Ok(self.info.insert(info))
    }

    /// The last loaded server info, if any.
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.info.as_ref()
    }

    /// Reload the sink catalog, sorted by index.
    pub fn load_sinks(&mut self) -> Result<&SinkCatalog> {
        self.server.load_sinks(&mut self.sinks)?;
        self.sinks.sort_by_index();
        Ok(&self.sinks)
    }

    pub fn sinks(&self) -> &SinkCatalog {
        &self.sinks
    }

    pub fn set_default_sink(&mut self, name: &str) -> Result<()> {
        self.server.set_default_sink(name)
    }

    /// Resolve `target` against the loaded sinks and make it the default.
    ///
    /// Returns the chosen sink. Server info is reloaded afterwards.
    pub fn switch_to(&mut self, target: &str, exact: bool) -> Result<Sink> {
        let sink = resolve(&self.sinks, target, exact)?.clone();
        self.set_default_sink(&sink.name)?;

        let info = self.load_server_info()?;
        if info.default_sink_name != sink.name {
            warn!(
                requested = %sink.name,
                reported = %info.default_sink_name,
                "server reports a different default sink"
            );
        }
        Ok(sink)
    }
}
