mod catalog;

pub use catalog::SinkCatalog;

/// An audio output device, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sink {
    /// Server-assigned, stable for the session, not necessarily contiguous.
    pub index: u32,
    /// Machine identifier, used for set-default requests.
    pub name: String,
    /// Human readable label.
    pub description: String,
}

impl Sink {
    pub fn new<N, D>(index: u32, name: N, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            index,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Snapshot of the server, replaced wholesale on every query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub server_name: String,
    pub server_version: String,
    pub default_sink_name: String,
}
