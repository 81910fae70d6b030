//! Connection string parsing
//!
//! Supports the format:
//! * postgres://[user[:password]@]host[:port][/database][?key=value&...]
//!
//! Every query parameter is kept in [`ConnectionInfo::options`]. The socket
//! factory picks out the keepalive keys and ignores the rest.

use crate::config::RawConfig;
use crate::factory::KeepaliveSocketFactory;
use crate::{Error, Result};

const DEFAULT_PORT: u16 = 5432;

/// Parsed connection info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Host name or address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Database name
    pub database: String,
    /// Username
    pub user: String,
    /// Password
    ///
    /// Not sent during session opening; carried for the driver's own
    /// authentication step after [`Session::outcome`](super::Session::outcome)
    /// reports what the server asked for.
    pub password: Option<String>,
    /// Query parameters, including socket options
    pub options: RawConfig,
}

impl ConnectionInfo {
    /// Parse connection string
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix("postgres://")
            .or_else(|| s.strip_prefix("postgresql://"))
            .ok_or_else(|| {
                Error::Config("connection string must start with postgres://".into())
            })?;

        // Format: [user[:password]@]host[:port][/database][?params]
        let (rest, query_string) = rest.split_once('?').unwrap_or((rest, ""));

        let (auth, rest) = match rest.split_once('@') {
            Some((auth, rest)) => (Some(auth), rest),
            None => (None, rest),
        };

        let (user, password) = match auth {
            Some(auth) => match auth.split_once(':') {
                Some((user, pass)) => (user.to_string(), Some(pass.to_string())),
                None => (auth.to_string(), None),
            },
            None => (whoami::username(), None),
        };

        let (host_port, database) = match rest.split_once('/') {
            Some((hp, db)) if !db.is_empty() => (hp, db.to_string()),
            Some((hp, _)) => (hp, user.clone()),
            None => (rest, user.clone()),
        };

        let (host, port) = split_host_port(host_port)?;
        if host.is_empty() {
            return Err(Error::Config(
                "connection string must name a host".into(),
            ));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            database,
            user,
            password,
            options: RawConfig::parse_query(query_string),
        })
    }

    /// Socket factory configured from the connection string's options
    pub fn socket_factory(&self) -> KeepaliveSocketFactory {
        KeepaliveSocketFactory::from_raw(&self.options)
    }

    /// Startup parameters sent to the server
    pub fn startup_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("user".to_string(), self.user.clone()),
            ("database".to_string(), self.database.clone()),
        ];
        if let Some(Some(app_name)) = self.options.get("application_name") {
            params.push(("application_name".to_string(), app_name.to_string()));
        }
        params
    }
}

/// Split `host[:port]`, accepting a bracketed IPv6 literal (`[::1]:5432`)
fn split_host_port(host_port: &str) -> Result<(&str, u16)> {
    let (host, port) = if let Some(bracketed) = host_port.strip_prefix('[') {
        let (host, after) = bracketed
            .split_once(']')
            .ok_or_else(|| Error::Config("unterminated IPv6 address".into()))?;
        (host, after.strip_prefix(':'))
    } else {
        match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        }
    };

    let port = match port {
        Some(port) => port
            .parse()
            .map_err(|_| Error::Config(format!("invalid port: {}", port)))?,
        None => DEFAULT_PORT,
    };
    Ok((host, port))
}
