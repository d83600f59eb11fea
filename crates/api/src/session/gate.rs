use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use content_ops_core::Statement;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::DatabaseSettings;
use crate::error::ApiError;
use crate::gateway::{QueryGateway, TrackedConnection};

/// Longest username or password accepted before any I/O.
pub const MAX_CREDENTIAL_LEN: usize = 256;

/// Opaque bearer token naming one live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Everything an authenticated operator's requests run against.
#[derive(Debug)]
pub struct DashboardSession {
    pub username: String,
    pub logged_in_at: DateTime<Utc>,
    pub gateway: QueryGateway,
}

pub type SessionHandle = Arc<Mutex<DashboardSession>>;

#[derive(Debug, Clone, Serialize)]
pub struct LoginGrant {
    pub token: SessionToken,
    pub username: String,
    pub logged_in_at: DateTime<Utc>,
}

/// Authenticates operators and owns their sessions.
///
/// Each session holds exactly one database connection, opened at login and
/// closed at logout. Requests of one session are serialised by the session
/// mutex; sessions never share a connection.
#[derive(Debug)]
pub struct SessionGate {
    settings: DatabaseSettings,
    sessions: RwLock<HashMap<SessionToken, SessionHandle>>,
    live: Arc<AtomicUsize>,
}

impl SessionGate {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self {
            settings,
            sessions: RwLock::new(HashMap::new()),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Verify credentials and open a session.
    ///
    /// Every failure, including an unreachable database, reads the same to
    /// the caller; the cause is logged.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let username = username.trim();
        if !well_formed(username) || !well_formed(password) {
            warn!("Rejected malformed credentials");
            return Err(ApiError::InvalidCredentials);
        }

        let conn = TrackedConnection::open(&self.settings, &self.live)
            .await
            .map_err(|e| {
                error!(error = %e, "Credential check unavailable");
                ApiError::InvalidCredentials
            })?;
        let mut gateway = QueryGateway::new(self.settings.clone(), Arc::clone(&self.live), conn);

        let check = Statement::new("SELECT COALESCE(verify_dashboard_password($1, $2), false)")
            .bind(username)
            .bind(password);
        match gateway.fetch_optional::<(bool,)>(&check).await {
            Ok(Some((true,))) => {}
            Ok(_) => {
                warn!("Invalid credentials");
                gateway.close().await;
                return Err(ApiError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "Credential check failed");
                gateway.close().await;
                return Err(ApiError::InvalidCredentials);
            }
        }

        let touch = Statement::new("UPDATE dashboard_users SET last_login = NOW() WHERE username = $1")
            .bind(username);
        if let Err(e) = gateway.execute(&touch).await {
            warn!(error = %e, "Could not record last login");
        }

        let grant = LoginGrant {
            token: SessionToken::generate(),
            username: username.to_string(),
            logged_in_at: Utc::now(),
        };
        let session = DashboardSession {
            username: grant.username.clone(),
            logged_in_at: grant.logged_in_at,
            gateway,
        };
        self.sessions
            .write()
            .await
            .insert(grant.token, Arc::new(Mutex::new(session)));

        info!("Login successful");
        Ok(grant)
    }

    /// Close the session's connection and forget it. Unknown tokens are a no-op.
    #[instrument(skip(self))]
    pub async fn logout(&self, token: &SessionToken) {
        let removed = self.sessions.write().await.remove(token);
        match removed {
            Some(handle) => {
                let mut session = handle.lock().await;
                session.gateway.close().await;
                info!(username = %session.username, "Logged out");
            }
            None => info!("Logout for unknown session"),
        }
    }

    pub async fn session(&self, token: &SessionToken) -> Option<SessionHandle> {
        self.sessions.read().await.get(token).cloned()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Database connections currently open across all sessions.
    pub fn open_connections(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Log out every session; used on shutdown.
    pub async fn close_all(&self) {
        let drained: Vec<_> = self.sessions.write().await.drain().collect();
        for (_, handle) in drained {
            handle.lock().await.gateway.close().await;
        }
        info!("All sessions closed");
    }
}

fn well_formed(value: &str) -> bool {
    !value.is_empty() && value.len() <= MAX_CREDENTIAL_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use sqlx::postgres::PgSslMode;

    /// Settings pointing at a port nothing listens on.
    fn unreachable_db() -> DatabaseSettings {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        DatabaseSettings {
            host: "127.0.0.1".to_string(),
            port,
            name: "postgres".to_string(),
            user: "ops".to_string(),
            password: "secret".to_string(),
            ssl_mode: PgSslMode::Disable,
            connect_timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn malformed_credentials_change_nothing() {
        let gate = SessionGate::new(unreachable_db());
        for (user, pass) in [("", "pw"), ("ops", ""), ("   ", "pw")] {
            let err = gate.login(user, pass).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidCredentials));
        }
        let long = "x".repeat(MAX_CREDENTIAL_LEN + 1);
        assert!(gate.login(&long, "pw").await.is_err());

        assert_eq!(gate.active_sessions().await, 0);
        assert_eq!(gate.open_connections(), 0);
    }

    #[tokio::test]
    async fn unreachable_database_reads_as_invalid_credentials() {
        let gate = SessionGate::new(unreachable_db());
        let err = gate.login("ops", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
        assert_eq!(gate.active_sessions().await, 0);
        assert_eq!(gate.open_connections(), 0);
    }

    #[tokio::test]
    async fn logout_of_unknown_token_is_harmless() {
        let gate = SessionGate::new(unreachable_db());
        let token: SessionToken = Uuid::new_v4().to_string().parse().unwrap();
        gate.logout(&token).await;
        assert!(gate.session(&token).await.is_none());
        assert_eq!(gate.open_connections(), 0);
    }

    #[test]
    fn token_round_trips_through_text() {
        let token = SessionToken::generate();
        assert_eq!(token.to_string().parse::<SessionToken>().unwrap(), token);
        assert!("not-a-token".parse::<SessionToken>().is_err());
    }
}
