// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::fmt::{self, Display};
use std::io;

/// Represent the types of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Error occurred while performing I/O on the transport. The
    /// connection is torn down and pending futures are cancelled.
    IoError,

    /// Packet encode error.
    EncodeError,

    /// Packet decode error; the peer sent a malformed packet.
    DecodeError,

    /// Broker URL, keep-alive string or another option is invalid.
    ConfigError,

    /// Operation requires an established connection.
    NotConnected,

    /// `connect()` was called while a connection attempt or session is
    /// already running.
    AlreadyConnecting,

    /// The server refused the connect request with a non-zero return
    /// code.
    ConnectionDenied,

    /// The first packet from the server was not a ConnectAck.
    ExpectedConnack,

    /// No ConnectAck arrived within the connect timeout.
    ConnectTimeout,

    /// The server did not answer a ping request within one keep alive
    /// interval.
    MissingPong,

    /// Operation was aborted by connection teardown.
    Cancelled,

    /// Session store failure.
    SessionError,
}

/// Engine error value, a kind plus a human readable detail message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// Type of current error.
    kind: ErrorKind,

    /// Detail message about this error.
    message: String,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_owned(),
        }
    }

    #[must_use]
    pub fn from_string(kind: ErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::from_string(ErrorKind::IoError, format!("IoError {err}"))
    }
}

impl From<codec::EncodeError> for Error {
    fn from(err: codec::EncodeError) -> Self {
        Self::from_string(ErrorKind::EncodeError, format!("{err}"))
    }
}

impl From<codec::DecodeError> for Error {
    fn from(err: codec::DecodeError) -> Self {
        Self::from_string(ErrorKind::DecodeError, format!("{err}"))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::from_string(ErrorKind::ConfigError, format!("Invalid broker url: {err}"))
    }
}
