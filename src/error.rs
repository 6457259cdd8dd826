use libpulse_binding::error::{Code, PAErr};

/// Everything that can end a run after the command line was accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The server was unreachable, or the handshake failed.
    #[error("failed to connect to PulseAudio: {message} ({code})")]
    Connection { code: i32, message: String },
    /// The server rejected a specific query or command.
    #[error("{operation} failed: {message} ({code})")]
    Operation {
        operation: &'static str,
        code: i32,
        message: String,
    },
    /// A user supplied sink identifier matched nothing.
    #[error("no sink found with {} to {target}", match_kind(.exact))]
    Resolution { target: String, exact: bool },
}

pub type Result<A> = std::result::Result<A, Error>;

fn match_kind(exact: &bool) -> &'static str {
    if *exact {
        "exact match"
    } else {
        "match"
    }
}

impl Error {
    pub(crate) fn connection(err: PAErr) -> Self {
        Error::Connection {
            code: err.0,
            message: format!("{}", err),
        }
    }

    /// For failures where libpulse hands back nothing but a null pointer.
    pub(crate) fn connection_internal(message: &str) -> Self {
        Error::Connection {
            code: Code::Internal as i32,
            message: message.to_owned(),
        }
    }

    pub(crate) fn operation(operation: &'static str, err: PAErr) -> Self {
        Error::Operation {
            operation,
            code: err.0,
            message: format!("{}", err),
        }
    }

    /// The protocol error code, if this error came from the server.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Connection { code, .. } | Error::Operation { code, .. } => Some(*code),
            Error::Resolution { .. } => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn resolution_message_names_mode() {
        let fuzzy = Error::Resolution {
            target: "speakers".to_owned(),
            exact: false,
        };
        let exact = Error::Resolution {
            target: "speakers".to_owned(),
            exact: true,
        };
        assert_eq!(fuzzy.to_string(), "no sink found with match to speakers");
        assert_eq!(
            exact.to_string(),
            "no sink found with exact match to speakers"
        );
        assert_eq!(exact.code(), None);
    }

    #[test]
    fn operation_carries_name_and_code() {
        let err = Error::Operation {
            operation: "set_default_sink",
            code: 5,
            message: "No such entity".to_owned(),
        };
        assert_eq!(err.code(), Some(5));
        assert_eq!(
            err.to_string(),
            "set_default_sink failed: No such entity (5)"
        );
    }
}
