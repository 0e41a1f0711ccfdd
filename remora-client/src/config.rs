//! Connection configuration

use std::net::IpAddr;
use std::time::Duration;

/// Which transport a connection uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Plain TCP. Only ever selected for loopback daemons.
    Plain,
    /// TLS over TCP.
    Tls,
}

impl TransportMode {
    /// Select the transport for a host.
    ///
    /// Secure transport is used unless the daemon is addressed as a
    /// loopback host with `secure` disabled. A non-loopback daemon always
    /// gets TLS regardless of the flag — the plain transport is a
    /// loopback-only trust boundary.
    pub fn select(host: &str, secure: bool) -> Self {
        if is_loopback(host) && !secure {
            TransportMode::Plain
        } else {
            TransportMode::Tls
        }
    }
}

fn is_loopback(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.parse::<IpAddr>().map(|ip| ip.is_loopback()).unwrap_or(false)
}

/// Options for connecting to the print daemon.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Daemon host (default loopback).
    pub host: String,
    /// Daemon port (default 8181).
    pub port: u16,
    /// Force TLS even on loopback.
    pub secure: bool,
    /// Extra retry attempts after the initial one.
    pub retries: u32,
    /// Delay between retry attempts.
    pub retry_delay: Duration,
}

impl ConnectOptions {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// "host:port" dial target.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn transport_mode(&self) -> TransportMode {
        TransportMode::select(&self.host, self.secure)
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8181,
            secure: false,
            retries: 0,
            retry_delay: Duration::from_secs(1),
        }
    }
}
