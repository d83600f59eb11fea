use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use content_ops_core::{SqlParam, Statement};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Arguments, Connection, FromRow, PgConnection};
use tracing::{debug, error, info, warn};

use super::{GatewayError, GatewayResult};
use crate::config::DatabaseSettings;

/// Decrements the open-connection count when the connection goes away,
/// whether it was closed cleanly or dropped.
#[derive(Debug)]
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn acquire(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(live))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A database connection counted in the gate's open-connection total.
#[derive(Debug)]
pub struct TrackedConnection {
    conn: PgConnection,
    _guard: LiveGuard,
}

impl TrackedConnection {
    /// Connect within the configured timeout.
    pub async fn open(
        settings: &DatabaseSettings,
        live: &Arc<AtomicUsize>,
    ) -> GatewayResult<Self> {
        info!(target_db = %settings.describe(), "Connecting to database");
        let options = settings.connect_options();
        let conn = tokio::time::timeout(settings.connect_timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| GatewayError::ConnectTimeout(settings.connect_timeout))?
            .map_err(GatewayError::Connect)?;
        info!("Database connection established");
        Ok(Self {
            conn,
            _guard: LiveGuard::acquire(live),
        })
    }

    pub async fn close(self) {
        let TrackedConnection { conn, _guard } = self;
        if let Err(err) = conn.close().await {
            warn!(error = %err, "Database connection did not close cleanly");
        }
    }
}

/// What the caller of [`QueryGateway::execute_query`] wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Rows,
    Nothing,
}

#[derive(Debug)]
pub enum QueryOutcome {
    Rows(Vec<PgRow>),
    Done { rows_affected: u64 },
}

/// Runs statements on the one connection a session owns.
///
/// Reads execute directly; writes run inside a transaction that is rolled
/// back on failure. When an error shows the connection itself is broken the
/// connection is discarded and the next call reconnects. Once closed, the
/// gateway refuses every call and never reconnects.
#[derive(Debug)]
pub struct QueryGateway {
    settings: DatabaseSettings,
    live: Arc<AtomicUsize>,
    conn: Option<TrackedConnection>,
    closed: bool,
}

impl QueryGateway {
    pub fn new(settings: DatabaseSettings, live: Arc<AtomicUsize>, conn: TrackedConnection) -> Self {
        Self {
            settings,
            live,
            conn: Some(conn),
            closed: false,
        }
    }

    async fn connection(&mut self) -> GatewayResult<&mut PgConnection> {
        if self.closed {
            return Err(GatewayError::Closed);
        }
        let tracked = match self.conn.take() {
            Some(tracked) => tracked,
            None => {
                info!("Reconnecting session database connection");
                TrackedConnection::open(&self.settings, &self.live).await?
            }
        };
        Ok(&mut self.conn.insert(tracked).conn)
    }

    pub async fn fetch_all<T>(&mut self, stmt: &Statement) -> GatewayResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let args = arguments(&stmt.params)?;
        let conn = self.connection().await?;
        let result = sqlx::query_as_with::<_, T, _>(&stmt.sql, args)
            .fetch_all(&mut *conn)
            .await;
        let rows = self.settle(result, &stmt.sql)?;
        debug!(rows = rows.len(), "Query executed successfully");
        Ok(rows)
    }

    pub async fn fetch_optional<T>(&mut self, stmt: &Statement) -> GatewayResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let args = arguments(&stmt.params)?;
        let conn = self.connection().await?;
        let result = sqlx::query_as_with::<_, T, _>(&stmt.sql, args)
            .fetch_optional(&mut *conn)
            .await;
        self.settle(result, &stmt.sql)
    }

    /// Fetch a single-row aggregate; an empty result reads as `T::default()`.
    pub async fn fetch_one_or_default<T>(&mut self, stmt: &Statement) -> GatewayResult<T>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin + Default,
    {
        Ok(self.fetch_optional(stmt).await?.unwrap_or_default())
    }

    /// Run a write in its own transaction; returns the affected row count.
    pub async fn execute(&mut self, stmt: &Statement) -> GatewayResult<u64> {
        let args = arguments(&stmt.params)?;
        let conn = self.connection().await?;
        let result = execute_in_transaction(conn, &stmt.sql, args).await;
        let rows_affected = self.settle(result, &stmt.sql)?;
        debug!(rows_affected, "Statement executed, changes committed");
        Ok(rows_affected)
    }

    /// Untyped form: raw rows when `Expect::Rows`, otherwise a committed write.
    pub async fn execute_query(&mut self, stmt: &Statement, expect: Expect) -> GatewayResult<QueryOutcome> {
        match expect {
            Expect::Rows => {
                let args = arguments(&stmt.params)?;
                let conn = self.connection().await?;
                let result = sqlx::query_with(&stmt.sql, args).fetch_all(&mut *conn).await;
                Ok(QueryOutcome::Rows(self.settle(result, &stmt.sql)?))
            }
            Expect::Nothing => Ok(QueryOutcome::Done {
                rows_affected: self.execute(stmt).await?,
            }),
        }
    }

    /// Close the held connection for good. Safe to call more than once.
    pub async fn close(&mut self) {
        self.closed = true;
        if let Some(conn) = self.conn.take() {
            conn.close().await;
        }
    }

    fn settle<T>(&mut self, result: Result<T, sqlx::Error>, sql: &str) -> GatewayResult<T> {
        result.map_err(|err| {
            error!(error = %err, statement = %sql, "Query execution failed");
            if is_connection_error(&err) {
                warn!("Discarding broken database connection");
                self.conn = None;
            }
            GatewayError::Database(err)
        })
    }
}

async fn execute_in_transaction(
    conn: &mut PgConnection,
    sql: &str,
    args: PgArguments,
) -> Result<u64, sqlx::Error> {
    let mut tx = conn.begin().await?;
    match sqlx::query_with(sql, args).execute(&mut *tx).await {
        Ok(done) => {
            tx.commit().await?;
            Ok(done.rows_affected())
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

fn is_connection_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        // Class 57P: the server is terminating this backend.
        sqlx::Error::Database(db) => db.code().is_some_and(|code| code.starts_with("57P")),
        _ => false,
    }
}

/// Bind parameters positionally.
fn arguments(params: &[SqlParam]) -> GatewayResult<PgArguments> {
    let mut args = PgArguments::default();
    for param in params {
        let added = match param {
            SqlParam::Text(v) => args.add(v.clone()),
            SqlParam::Float(v) => args.add(*v),
            SqlParam::Int(v) => args.add(*v),
            SqlParam::Bool(v) => args.add(*v),
            SqlParam::Timestamp(v) => args.add(*v),
            SqlParam::TextList(v) => args.add(v.clone()),
            SqlParam::Json(v) => args.add(sqlx::types::Json(v.clone())),
        };
        added.map_err(|e| GatewayError::Bind(e.to_string()))?;
    }
    Ok(args)
}
