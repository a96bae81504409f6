// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use codec::utils::random_string;
use codec::{Message, ProtocolLevel};

use crate::dialer::{Dialer, TcpDialer};

/// How long the engine waits for the ConnectAck packet.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Options of a connect request.
///
/// Keep-alive is kept as a duration string like `"30s"` or `"150ms"` and
/// parsed when connecting; `"0s"` disables the ping timer entirely.
#[derive(Clone)]
pub struct ConnectOptions {
    broker_url: String,
    client_id: String,
    clean_session: bool,
    keep_alive: String,
    username: Option<String>,
    password: Option<Vec<u8>>,
    will: Option<Message>,
    connect_timeout: Duration,
    protocol_level: ProtocolLevel,
    dialer: Arc<dyn Dialer>,
}

impl fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("broker_url", &self.broker_url)
            .field("client_id", &self.client_id)
            .field("clean_session", &self.clean_session)
            .field("keep_alive", &self.keep_alive)
            .field("username", &self.username)
            .field("will", &self.will)
            .field("connect_timeout", &self.connect_timeout)
            .field("protocol_level", &self.protocol_level)
            .finish_non_exhaustive()
    }
}

impl ConnectOptions {
    /// Create options for `broker_url` with a random 8 char client id and
    /// the defaults: clean-session on, 30 second keep-alive, 5 second
    /// connect timeout, protocol level 3.1.1, plain TCP dialer.
    #[must_use]
    pub fn new(broker_url: &str) -> Self {
        Self {
            broker_url: broker_url.to_string(),
            client_id: random_string(8),
            clean_session: true,
            keep_alive: "30s".to_string(),
            username: None,
            password: None,
            will: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            protocol_level: ProtocolLevel::default(),
            dialer: Arc::new(TcpDialer),
        }
    }

    #[must_use]
    pub fn broker_url(&self) -> &str {
        &self.broker_url
    }

    pub fn set_client_id(&mut self, client_id: &str) -> &mut Self {
        self.client_id = client_id.to_string();
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn set_clean_session(&mut self, clean_session: bool) -> &mut Self {
        self.clean_session = clean_session;
        self
    }

    #[must_use]
    pub const fn clean_session(&self) -> bool {
        self.clean_session
    }

    /// Update keep-alive, as a duration string like `"30s"`.
    pub fn set_keep_alive(&mut self, keep_alive: &str) -> &mut Self {
        self.keep_alive = keep_alive.to_string();
        self
    }

    #[must_use]
    pub fn keep_alive(&self) -> &str {
        &self.keep_alive
    }

    pub fn set_username(&mut self, username: &str) -> &mut Self {
        self.username = Some(username.to_string());
        self
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn set_password(&mut self, password: &[u8]) -> &mut Self {
        self.password = Some(password.to_vec());
        self
    }

    #[must_use]
    pub fn password(&self) -> Option<&[u8]> {
        self.password.as_deref()
    }

    /// Install a will message the server publishes if this connection
    /// drops abnormally.
    pub fn set_will(&mut self, will: Message) -> &mut Self {
        self.will = Some(will);
        self
    }

    #[must_use]
    pub const fn will(&self) -> Option<&Message> {
        self.will.as_ref()
    }

    pub fn set_connect_timeout(&mut self, connect_timeout: Duration) -> &mut Self {
        self.connect_timeout = connect_timeout;
        self
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn set_protocol_level(&mut self, protocol_level: ProtocolLevel) -> &mut Self {
        self.protocol_level = protocol_level;
        self
    }

    #[must_use]
    pub const fn protocol_level(&self) -> ProtocolLevel {
        self.protocol_level
    }

    /// Replace the transport dialer, e.g. with a TLS capable one.
    pub fn set_dialer(&mut self, dialer: Arc<dyn Dialer>) -> &mut Self {
        self.dialer = dialer;
        self
    }

    #[must_use]
    pub fn dialer(&self) -> &Arc<dyn Dialer> {
        &self.dialer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConnectOptions::new("tcp://localhost:1883");
        assert_eq!(options.client_id().len(), 8);
        assert!(options.clean_session());
        assert_eq!(options.keep_alive(), "30s");
        assert_eq!(options.connect_timeout(), DEFAULT_CONNECT_TIMEOUT);
        assert!(options.will().is_none());
    }

    #[test]
    fn test_setter_chain() {
        let mut options = ConnectOptions::new("tcp://localhost:1883");
        options
            .set_client_id("pump-7")
            .set_clean_session(false)
            .set_keep_alive("10s")
            .set_username("joe")
            .set_password(b"secret");
        assert_eq!(options.client_id(), "pump-7");
        assert!(!options.clean_session());
        assert_eq!(options.keep_alive(), "10s");
        assert_eq!(options.username(), Some("joe"));
        assert_eq!(options.password(), Some(b"secret".as_slice()));
    }
}
