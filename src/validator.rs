//! Syntactic validation of the `server` query parameter.
//!
//! No DNS lookups or reachability checks happen here. An accepted address
//! always renders back to exactly the string it was parsed from.

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;
use thiserror::Error;

/// Why a raw address string was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("server query parameter required (ip:port)")]
    MissingParameter,
    #[error("invalid server")]
    InvalidFormat,
}

/// A validated game server address, `host` with an optional `port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    host: String,
    port: Option<u16>,
}

impl ServerAddress {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Plain HTTP only: game servers do not expose players.json over TLS.
    pub fn players_url(&self) -> String {
        format!("http://{}/players.json", self)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(&self.host),
        }
    }
}

impl FromStr for ServerAddress {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']')
}

/// Validate a caller supplied address such as `127.0.0.1:30120`,
/// `play.example.com` or `[::1]:30120`.
pub fn validate(raw: &str) -> Result<ServerAddress, Rejection> {
    if raw.is_empty() {
        return Err(Rejection::MissingParameter);
    }
    if !raw.chars().all(is_allowed) {
        return Err(Rejection::InvalidFormat);
    }

    let (host, port) = split_host_port(raw)?;
    Ok(ServerAddress {
        host: host.to_string(),
        port,
    })
}

fn split_host_port(raw: &str) -> Result<(&str, Option<u16>), Rejection> {
    if let Some(rest) = raw.strip_prefix('[') {
        let close = rest.find(']').ok_or(Rejection::InvalidFormat)?;
        rest[..close]
            .parse::<Ipv6Addr>()
            .map_err(|_| Rejection::InvalidFormat)?;

        // '[' + literal + ']'
        let host = &raw[..close + 2];
        return match &rest[close + 1..] {
            "" => Ok((host, None)),
            tail => {
                let port = tail.strip_prefix(':').ok_or(Rejection::InvalidFormat)?;
                Ok((host, Some(parse_port(port)?)))
            }
        };
    }

    if raw.contains(['[', ']']) {
        return Err(Rejection::InvalidFormat);
    }

    match raw.split_once(':') {
        None => Ok((raw, None)),
        // IPv6 literals must be bracketed
        Some((_, port)) if port.contains(':') => Err(Rejection::InvalidFormat),
        Some(("", _)) => Err(Rejection::InvalidFormat),
        Some((host, port)) => Ok((host, Some(parse_port(port)?))),
    }
}

fn parse_port(s: &str) -> Result<u16, Rejection> {
    let port: u16 = s.parse().map_err(|_| Rejection::InvalidFormat)?;
    // leading zeros would not render back to the input
    if port.to_string() != s {
        return Err(Rejection::InvalidFormat);
    }
    Ok(port)
}
