//! Storage-engine sessions built from configuration (simple factory).
//!
//! Building a session only assembles its connection string; `connect` does
//! not touch the network.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

/// authSource used for MongoDB when none is configured.
pub const DEFAULT_AUTH_SOURCE: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Postgres,
    Mysql,
    Mongodb,
}

impl EngineKind {
    /// Name used in connect messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            EngineKind::Postgres => "Postgres",
            EngineKind::Mysql => "MySQL",
            EngineKind::Mongodb => "Mongodb",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::Postgres => "postgres",
            EngineKind::Mysql => "mysql",
            EngineKind::Mongodb => "mongodb",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("engine '{0}' selected but no [{0}] connection section given")]
    MissingEngineConfig(EngineKind),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Connection settings shared by all engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
}

impl ConnectionConfig {
    /// `user` or `user:password`.
    fn credentials(&self) -> String {
        match &self.password {
            Some(password) => format!("{}:{}", self.user, password),
            None => self.user.clone(),
        }
    }

    fn database(&self) -> &str {
        self.database.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongodbConnectionConfig {
    #[serde(flatten)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub auth_source: Option<String>,
}

/// Engine selection plus one optional section per engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub engine: EngineKind,
    #[serde(default)]
    pub postgres: Option<ConnectionConfig>,
    #[serde(default)]
    pub mysql: Option<ConnectionConfig>,
    #[serde(default)]
    pub mongodb: Option<MongodbConnectionConfig>,
}

/// A storage-engine session.
pub trait DbSession: fmt::Debug {
    fn engine(&self) -> EngineKind;

    fn connection_string(&self) -> &str;

    /// Announce the connection and return the announcement.
    fn connect(&self) -> String {
        let message = format!("connecting to the {}", self.engine().display_name());
        info!(engine = %self.engine(), "{}", message);
        message
    }
}

#[derive(Debug)]
pub struct PostgresSession {
    conn_string: String,
}

impl DbSession for PostgresSession {
    fn engine(&self) -> EngineKind {
        EngineKind::Postgres
    }

    fn connection_string(&self) -> &str {
        &self.conn_string
    }
}

#[derive(Debug)]
pub struct MysqlSession {
    conn_string: String,
}

impl DbSession for MysqlSession {
    fn engine(&self) -> EngineKind {
        EngineKind::Mysql
    }

    fn connection_string(&self) -> &str {
        &self.conn_string
    }
}

#[derive(Debug)]
pub struct MongodbSession {
    conn_string: String,
}

impl DbSession for MongodbSession {
    fn engine(&self) -> EngineKind {
        EngineKind::Mongodb
    }

    fn connection_string(&self) -> &str {
        &self.conn_string
    }
}

pub struct SessionFactory;

impl SessionFactory {
    /// Build the session for `config.engine` from its connection section.
    #[instrument(level = "debug", skip(config), fields(engine = %config.engine))]
    pub fn create_session(config: &SessionConfig) -> SessionResult<Box<dyn DbSession>> {
        let missing = || SessionError::MissingEngineConfig(config.engine);
        let session: Box<dyn DbSession> = match config.engine {
            EngineKind::Postgres => {
                let c = config.postgres.as_ref().ok_or_else(missing)?;
                Box::new(PostgresSession {
                    conn_string: Self::postgres_conn_string(c),
                })
            }
            EngineKind::Mysql => {
                let c = config.mysql.as_ref().ok_or_else(missing)?;
                Box::new(MysqlSession {
                    conn_string: Self::mysql_conn_string(c),
                })
            }
            EngineKind::Mongodb => {
                let c = config.mongodb.as_ref().ok_or_else(missing)?;
                Box::new(MongodbSession {
                    conn_string: Self::mongodb_conn_string(c),
                })
            }
        };
        Ok(session)
    }

    pub fn postgres_conn_string(c: &ConnectionConfig) -> String {
        format!(
            "postgresql://{}@{}:{}/{}",
            c.credentials(),
            c.host,
            c.port,
            c.database()
        )
    }

    /// MySQL strings never carry the password.
    pub fn mysql_conn_string(c: &ConnectionConfig) -> String {
        format!("mysql://{}@{}:{}/{}", c.user, c.host, c.port, c.database())
    }

    pub fn mongodb_conn_string(c: &MongodbConnectionConfig) -> String {
        format!(
            "mongodb://{}@{}:{}/{}?authSource={}",
            c.connection.credentials(),
            c.connection.host,
            c.connection.port,
            c.connection.database(),
            c.auth_source.as_deref().unwrap_or(DEFAULT_AUTH_SOURCE)
        )
    }
}
