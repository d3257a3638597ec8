//! SQLite-backed checkpointer (SqliteSaver). Persistent across process restarts.
//!
//! Each operation opens its own connection inside `spawn_blocking`. Rows are ordered
//! by `rowid`, so "latest" means last written.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::memory::checkpoint::{
    millis_since_epoch, Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource,
};
use crate::memory::checkpointer::{window_list, CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;
use crate::memory::serializer::Serializer;

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

fn i64_to_created_at(v: Option<i64>) -> Option<SystemTime> {
    v.and_then(|ms| UNIX_EPOCH.checked_add(Duration::from_millis(ms as u64)))
}

fn metadata_from_row(source: &str, step: i64, created_at: Option<i64>) -> CheckpointMetadata {
    CheckpointMetadata {
        source: CheckpointSource::parse(source),
        step,
        created_at: i64_to_created_at(created_at),
    }
}

/// SQLite-backed checkpointer. Key: (thread_id, checkpoint_ns, checkpoint_id).
///
/// **Interaction**: Used as `Arc<dyn Checkpointer<S>>` in `StateGraph::compile_with_checkpointer`
/// when the CLI is given `--checkpoint-db`.
pub struct SqliteSaver<S> {
    db_path: PathBuf,
    serializer: Arc<dyn Serializer<S>>,
}

impl<S> SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the database and ensures the table exists.
    pub fn new(
        path: impl AsRef<Path>,
        serializer: Arc<dyn Serializer<S>>,
    ) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                thread_id TEXT NOT NULL,
                checkpoint_ns TEXT NOT NULL,
                checkpoint_id TEXT NOT NULL,
                ts TEXT NOT NULL,
                payload BLOB NOT NULL,
                pending_node TEXT,
                metadata_source TEXT NOT NULL,
                metadata_step INTEGER NOT NULL,
                metadata_created_at INTEGER,
                PRIMARY KEY (thread_id, checkpoint_ns, checkpoint_id)
            )
            "#,
            [],
        )
        .map_err(storage)?;
        Ok(Self {
            db_path,
            serializer,
        })
    }

    fn thread_id_required(config: &RunnableConfig) -> Result<String, CheckpointError> {
        config
            .thread_id
            .clone()
            .ok_or(CheckpointError::ThreadIdRequired)
    }
}

type RowData = (
    String,
    String,
    Vec<u8>,
    Option<String>,
    String,
    i64,
    Option<i64>,
);

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let thread_id = Self::thread_id_required(config)?;
        let checkpoint_ns = config.checkpoint_ns.clone();
        let payload = self.serializer.serialize(&checkpoint.channel_values)?;
        let pending_node = checkpoint.pending_node.clone();
        let source = checkpoint.metadata.source.as_str();
        let step = checkpoint.metadata.step;
        let created_at = checkpoint
            .metadata
            .created_at
            .map(|t| millis_since_epoch(t) as i64);
        let id = checkpoint.id.clone();
        let ts = checkpoint.ts.clone();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.execute(
                r#"
                INSERT OR REPLACE INTO checkpoints
                (thread_id, checkpoint_ns, checkpoint_id, ts, payload, pending_node,
                 metadata_source, metadata_step, metadata_created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    thread_id,
                    checkpoint_ns,
                    id,
                    ts,
                    payload,
                    pending_node,
                    source,
                    step,
                    created_at,
                ],
            )
            .map_err(storage)?;
            Ok::<String, CheckpointError>(id)
        })
        .await
        .map_err(storage)?
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let thread_id = Self::thread_id_required(config)?;
        let checkpoint_ns = config.checkpoint_ns.clone();
        let want_id = config.checkpoint_id.clone();
        let db_path = self.db_path.clone();

        let row = tokio::task::spawn_blocking(move || -> Result<Option<RowData>, CheckpointError> {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let columns = "checkpoint_id, ts, payload, pending_node, metadata_source, metadata_step, metadata_created_at";
            let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<RowData> {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            };
            let found = match want_id {
                Some(cid) => conn
                    .query_row(
                        &format!(
                            "SELECT {columns} FROM checkpoints
                             WHERE thread_id = ?1 AND checkpoint_ns = ?2 AND checkpoint_id = ?3"
                        ),
                        params![thread_id, checkpoint_ns, cid],
                        map_row,
                    )
                    .optional(),
                None => conn
                    .query_row(
                        &format!(
                            "SELECT {columns} FROM checkpoints
                             WHERE thread_id = ?1 AND checkpoint_ns = ?2
                             ORDER BY rowid DESC LIMIT 1"
                        ),
                        params![thread_id, checkpoint_ns],
                        map_row,
                    )
                    .optional(),
            };
            found.map_err(storage)
        })
        .await
        .map_err(storage)??;

        let Some((checkpoint_id, ts, payload, pending_node, source, step, created_at)) = row else {
            return Ok(None);
        };
        let metadata = metadata_from_row(&source, step, created_at);
        let checkpoint = Checkpoint {
            id: checkpoint_id,
            ts,
            channel_values: self.serializer.deserialize(&payload)?,
            pending_node,
            metadata: metadata.clone(),
        };
        Ok(Some((checkpoint, metadata)))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let thread_id = Self::thread_id_required(config)?;
        let checkpoint_ns = config.checkpoint_ns.clone();
        let db_path = self.db_path.clone();

        let items = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let mut stmt = conn
                .prepare(
                    "SELECT checkpoint_id, pending_node, metadata_source, metadata_step, metadata_created_at
                     FROM checkpoints WHERE thread_id = ?1 AND checkpoint_ns = ?2
                     ORDER BY rowid ASC",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![thread_id, checkpoint_ns], |row| {
                    Ok(CheckpointListItem {
                        checkpoint_id: row.get(0)?,
                        pending_node: row.get(1)?,
                        metadata: metadata_from_row(
                            &row.get::<_, String>(2)?,
                            row.get(3)?,
                            row.get(4)?,
                        ),
                    })
                })
                .map_err(storage)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(storage)
        })
        .await
        .map_err(storage)??;

        Ok(window_list(items, limit, before, after))
    }
}
