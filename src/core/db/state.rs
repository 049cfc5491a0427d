use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Context;
use sqlx::{
    ConnectOptions, Connection,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqliteSynchronous},
};
use tokio::runtime::{Builder, Runtime};

use crate::logging::TARGET;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connection lifecycle for [`super::SqliteStore`].
///
/// The connection is opened lazily by the first query and dropped by
/// [`StoreState::close`]; nothing is pooled.
pub(super) struct StoreState {
    db_file: PathBuf,
    options: SqliteConnectOptions,
    runtime: Runtime,
    conn: Option<SqliteConnection>,
}

impl std::fmt::Debug for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreState")
            .field("db_file", &self.db_file)
            .field("open", &self.conn.is_some())
            .finish()
    }
}

impl StoreState {
    pub(super) fn new<P: AsRef<Path>>(db_file: P) -> anyhow::Result<Self> {
        let db_file = db_file.as_ref().to_path_buf();
        if let Some(parent) = db_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                anyhow::bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_file)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start database runtime")?;

        Ok(Self {
            db_file,
            options,
            runtime,
            conn: None,
        })
    }

    pub(super) fn db_file(&self) -> &Path {
        &self.db_file
    }

    pub(super) fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Open (and migrate) on first use, then hand out the runtime together
    /// with the live connection.
    pub(super) fn connection(&mut self) -> anyhow::Result<(&Runtime, &mut SqliteConnection)> {
        if self.conn.is_none() {
            let options = self.options.clone();
            let conn = block_on(&self.runtime, async move {
                let mut conn = options.connect().await?;
                MIGRATOR.run_direct(&mut conn).await?;
                anyhow::Ok(conn)
            })
            .with_context(|| format!("Failed to open database {:?}", self.db_file))?;
            log::debug!(target: TARGET, "Opened database {:?}", self.db_file);
            self.conn = Some(conn);
        }
        match self.conn.as_mut() {
            Some(conn) => Ok((&self.runtime, conn)),
            None => anyhow::bail!("Database connection unavailable"),
        }
    }

    pub(super) fn close(&mut self) -> anyhow::Result<()> {
        if let Some(conn) = self.conn.take() {
            block_on(&self.runtime, conn.close())
                .with_context(|| format!("Failed to close database {:?}", self.db_file))?;
            log::debug!(target: TARGET, "Closed database {:?}", self.db_file);
        }
        Ok(())
    }
}

/// Drive `fut` to completion on `runtime` and wait for it.
///
/// Runs on a scoped helper thread: the GUI calls in from inside its own
/// executor, where blocking on a second runtime directly would panic.
pub(super) fn block_on<F>(runtime: &Runtime, fut: F) -> F::Output
where
    F: Future + Send,
    F::Output: Send,
{
    std::thread::scope(|scope| {
        match scope.spawn(move || runtime.block_on(fut)).join() {
            Ok(output) => output,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    })
}
