use std::fmt;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    NotFound(String),
    InvalidZone(u8),
    Protocol(String),
    Vocabulary(String),
    Io(std::io::Error),
}

impl Error {
    /// Connection drops and 5xx replies from the bridge's embedded server.
    /// Timeouts and 4xx replies (a wrong password) are final.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) if e.is_timeout() => false,
            Error::Http(e) if e.is_status() => e.status().is_some_and(|s| s.is_server_error()),
            Error::Http(e) => e.is_connect() || e.is_request() || e.is_body(),
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::NotFound(name) => write!(f, "no such attribute: {name}"),
            Error::InvalidZone(id) => write!(f, "invalid zone: {id}"),
            Error::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Error::Vocabulary(msg) => write!(f, "vocabulary error: {msg}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Request URLs carry the bridge password, so they are dropped here.
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.without_url())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
