mod error;
mod logging;
mod resolve;
mod server;
pub mod sink;
mod switcher;
mod table;

pub use error::{Error, Result};
pub use logging::{init_logging, LOG_ENV};
pub use resolve::resolve;
pub use server::{AudioServer, ConnectionState, PulseServer};
pub use sink::{ServerInfo, Sink, SinkCatalog};
pub use switcher::Switcher;
pub use table::{format_row, format_table};
