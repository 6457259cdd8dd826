use std::cell::{Cell, RefCell};
use std::rc::Rc;

use libpulse_binding as pulse;
use pulse::callbacks::ListResult;
use pulse::context::{Context, FlagSet, State};
use pulse::error::PAErr;
use tracing::{debug, info, warn};

use super::{AudioServer, ConnectionState, EventLoop};
use crate::{Error, Result, ServerInfo, Sink, SinkCatalog};

/// Client name registered with the server.
const APPLICATION_NAME: &str = "audioswitch";

impl From<State> for ConnectionState {
    fn from(state: State) -> Self {
        match state {
            State::Ready => ConnectionState::Ready,
            State::Failed => ConnectionState::Failed,
            State::Terminated => ConnectionState::Terminated,
            State::Unconnected | State::Connecting | State::Authorizing | State::SettingName => {
                ConnectionState::Connecting
            }
        }
    }
}

/// What the state callback last saw.
#[derive(Debug)]
struct Status {
    state: ConnectionState,
    // only readable on the loop thread at notification time, so it is
    // captured there
    error: Option<PAErr>,
}

/// A connected PulseAudio context, driven by its own event loop thread.
///
/// Every query locks the loop, issues the request, and waits until the
/// request's callback has stored its result and signalled. There is no
/// timeout: a server that never answers blocks the caller.
pub struct PulseServer {
    // dropped before the event loop it is bound to
    context: Rc<RefCell<Context>>,
    status: Rc<RefCell<Status>>,
    event_loop: EventLoop,
}

impl PulseServer {
    /// Connect to `server`, or to the default server if `None`.
    ///
    /// Never spawns a server; if none is running this fails.
    pub fn connect(server: Option<&str>) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        let context = Context::new(&*event_loop.mainloop(), APPLICATION_NAME)
            .ok_or_else(|| Error::connection_internal("could not create context"))?;

        let mut conn = Self {
            context: Rc::new(RefCell::new(context)),
            status: Rc::new(RefCell::new(Status {
                state: ConnectionState::Connecting,
                error: None,
            })),
            event_loop,
        };
        conn.watch_state();

        debug!(server = server.unwrap_or("default"), "connecting");
        let requested = conn
            .context
            .borrow_mut()
            .connect(server, FlagSet::NOAUTOSPAWN, None);
        if requested.is_err() {
            // the returned value is only a failure flag, the code is kept
            // on the context
            let err = conn.context.borrow().errno();
            warn!(code = err.0, "connection refused");
            return Err(Error::connection(err));
        }
        conn.wait_until_settled()?;
        info!("connected");
        Ok(conn)
    }

    pub fn state(&self) -> ConnectionState {
        let _guard = self.event_loop.lock();
        let status = self.status.borrow();
        status.state
    }

    fn watch_state(&mut self) {
        let context = Rc::downgrade(&self.context);
        let status = Rc::clone(&self.status);
        let signaller = self.event_loop.signaller();
        self.context
            .borrow_mut()
            .set_state_callback(Some(Box::new(move || {
                let context = match context.upgrade() {
                    Some(c) => c,
                    None => return,
                };
                // connect() reports Connecting synchronously, while the
                // caller still has the context borrowed. nothing to do for
                // that state anyway.
                let context = match context.try_borrow() {
                    Ok(c) => c,
                    Err(_) => return,
                };
                let state = ConnectionState::from(context.get_state());
                debug!(?state, "connection state changed");

                let mut status = status.borrow_mut();
                status.state = state;
                if !state.is_settled() {
                    return;
                }
                if state != ConnectionState::Ready {
                    status.error = Some(context.errno());
                }
                signaller.signal();
            })));
    }

    fn wait_until_settled(&mut self) -> Result<()> {
        let guard = self.event_loop.start()?;
        loop {
            let status = self.status.borrow();
            match status.state {
                ConnectionState::Ready => return Ok(()),
                ConnectionState::Failed | ConnectionState::Terminated => {
                    let err = status.error.unwrap_or(PAErr(0));
                    warn!(state = ?status.state, "connection failed");
                    return Err(Error::connection(err));
                }
                ConnectionState::Connecting => {
                    drop(status);
                    guard.wait();
                }
            }
        }
    }

    /// The context's last error, as a failure of `operation`.
    ///
    /// Call with the loop lock held.
    fn operation_error(&self, operation: &'static str) -> Error {
        let err = self.context.borrow().errno();
        warn!(operation, code = err.0, "request failed");
        Error::operation(operation, err)
    }
}

impl AudioServer for PulseServer {
    fn server_info(&mut self) -> Result<ServerInfo> {
        let slot = Rc::new(RefCell::new(None));
        let guard = self.event_loop.lock();

        let op = {
            let slot = Rc::clone(&slot);
            let signaller = self.event_loop.signaller();
            let introspect = self.context.borrow().introspect();
            introspect.get_server_info(move |info| {
                *slot.borrow_mut() = Some(ServerInfo {
                    server_name: info.server_name.as_deref().unwrap_or_default().to_owned(),
                    server_version: info.server_version.as_deref().unwrap_or_default().to_owned(),
                    default_sink_name: info
                        .default_sink_name
                        .as_deref()
                        .unwrap_or_default()
                        .to_owned(),
                });
                signaller.signal();
            })
        };
        debug!("requested server info");
        guard.wait_for(&op);

        let info = slot.take();
        let result = info.ok_or_else(|| self.operation_error("get_server_info"));
        drop(op);
        drop(guard);
        result
    }

    fn load_sinks(&mut self, catalog: &mut SinkCatalog) -> Result<()> {
        catalog.clear();
        let shared = Rc::new(RefCell::new(std::mem::take(catalog)));
        let guard = self.event_loop.lock();

        let op = {
            let shared = Rc::clone(&shared);
            let signaller = self.event_loop.signaller();
            let introspect = self.context.borrow().introspect();
            introspect.get_sink_info_list(move |result| match result {
                ListResult::Item(info) => {
                    let name = info.name.as_deref().unwrap_or_default();
                    let description = info.description.as_deref().unwrap_or_default();
                    shared
                        .borrow_mut()
                        .push(Sink::new(info.index, name, description));
                }
                ListResult::End => {
                    shared.borrow_mut().finish();
                    signaller.signal();
                }
                ListResult::Error => signaller.signal(),
            })
        };
        debug!("requested sink list");
        guard.wait_for(&op);

        *catalog = shared.take();
        let result = if catalog.is_loaded() {
            debug!(count = catalog.len(), "loaded sinks");
            Ok(())
        } else {
            catalog.clear();
            Err(self.operation_error("get_sink_info_list"))
        };
        drop(op);
        drop(guard);
        result
    }

    fn set_default_sink(&mut self, name: &str) -> Result<()> {
        let outcome = Rc::new(Cell::new(None));
        let guard = self.event_loop.lock();

        let op = {
            let outcome = Rc::clone(&outcome);
            let signaller = self.event_loop.signaller();
            self.context
                .borrow_mut()
                .set_default_sink(name, move |success| {
                    outcome.set(Some(success));
                    signaller.signal();
                })
        };
        debug!(name, "requested default sink change");
        guard.wait_for(&op);

        let result = match outcome.get() {
            Some(true) => Ok(()),
            _ => Err(self.operation_error("set_default_sink")),
        };
        drop(op);
        drop(guard);
        result
    }
}

impl Drop for PulseServer {
    fn drop(&mut self) {
        {
            let _guard = self.event_loop.lock();
            let mut context = self.context.borrow_mut();
            context.set_state_callback(None);
            context.disconnect();
        }
        self.event_loop.stop();
        debug!("disconnected");
    }
}

#[cfg(test)]
mod test {
    use super::{ConnectionState, PulseServer};
    use crate::{AudioServer, SinkCatalog};
    use libpulse_binding::context::State;
    use libpulse_binding::error::{Code, PAErr};

    #[test]
    fn state_mapping() {
        for state in [
            State::Unconnected,
            State::Connecting,
            State::Authorizing,
            State::SettingName,
        ] {
            assert_eq!(ConnectionState::from(state), ConnectionState::Connecting);
        }
        assert_eq!(ConnectionState::from(State::Ready), ConnectionState::Ready);
        assert_eq!(ConnectionState::from(State::Failed), ConnectionState::Failed);
        assert_eq!(
            ConnectionState::from(State::Terminated),
            ConnectionState::Terminated
        );
    }

    #[test]
    fn unreachable_server() {
        // nothing listens here, and autospawn is off
        let err = PulseServer::connect(Some("unix:/nonexistent/audioswitch/native"))
            .err()
            .unwrap();
        assert!(matches!(err, crate::Error::Connection { .. }));
        assert_eq!(err.code(), Some(Code::ConnectionRefused as i32));
    }

    #[test]
    fn refused_message_names_the_cause() {
        let err = PulseServer::connect(Some("unix:/nonexistent/audioswitch/native"))
            .err()
            .unwrap();
        let expected = format!("{}", PAErr(Code::ConnectionRefused as i32));
        assert_eq!(
            err.to_string(),
            format!(
                "failed to connect to PulseAudio: {} ({})",
                expected,
                Code::ConnectionRefused as i32
            )
        );
    }

    // needs a running server
    #[test]
    #[ignore]
    fn live_round_trip() {
        let mut server = PulseServer::connect(None).unwrap();
        assert_eq!(server.state(), ConnectionState::Ready);

        let info = server.server_info().unwrap();
        let mut catalog = SinkCatalog::new();
        server.load_sinks(&mut catalog).unwrap();
        assert!(catalog.is_loaded());

        if let Some(sink) = catalog.iter().find(|s| s.name == info.default_sink_name) {
            server.set_default_sink(&sink.name).unwrap();
            let after = server.server_info().unwrap();
            assert_eq!(after.default_sink_name, sink.name);
        }

        assert!(server.set_default_sink("audioswitch-no-such-sink").is_err());
    }
}
