mod state;

use std::path::Path;

use sqlx::{Connection, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::logging::TARGET;
use crate::models::{BoundingBox, DetectedObject};
use state::StoreState;

/// Sink for detection results.
///
/// `insert_batch` may open a connection on demand; `close` releases it. The
/// controller calls `close` right after every insert.
pub trait DetectionStore {
    fn insert_batch(&mut self, detections: &[DetectedObject]) -> anyhow::Result<()>;
    fn close(&mut self) -> anyhow::Result<()>;
}

impl<S: DetectionStore + ?Sized> DetectionStore for Box<S> {
    fn insert_batch(&mut self, detections: &[DetectedObject]) -> anyhow::Result<()> {
        (**self).insert_batch(detections)
    }

    fn close(&mut self) -> anyhow::Result<()> {
        (**self).close()
    }
}

/// A detection read back from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDetection {
    pub batch_id: Uuid,
    pub created_at: OffsetDateTime,
    pub object: DetectedObject,
}

/// SQLite-backed store. One `detection_batch` row per insert plus one
/// `detected_object` row per detection.
#[derive(Debug)]
pub struct SqliteStore {
    state: StoreState,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_file: P) -> anyhow::Result<Self> {
        Ok(Self {
            state: StoreState::new(db_file)?,
        })
    }

    pub fn db_file(&self) -> &Path {
        self.state.db_file()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Every stored detection, oldest batch first, in detection order.
    pub fn stored_objects(&mut self) -> anyhow::Result<Vec<StoredDetection>> {
        let (runtime, conn) = self.state.connection()?;
        let rows = state::block_on(runtime, async move {
            let rows = sqlx::query(
                r#"SELECT b.id AS batch_id, b.created_at, o.label, o.x, o.y, o.width, o.height, o.confidence
                FROM detected_object o
                JOIN detection_batch b ON b.id = o.batch_id
                ORDER BY b.rowid ASC, o.position ASC"#,
            )
            .fetch_all(&mut *conn)
            .await?;
            anyhow::Ok(rows)
        })?;

        rows.into_iter()
            .map(|row| -> anyhow::Result<StoredDetection> {
                let batch_id: String = row.try_get("batch_id")?;
                let created_at: String = row.try_get("created_at")?;
                Ok(StoredDetection {
                    batch_id: Uuid::parse_str(&batch_id)?,
                    created_at: OffsetDateTime::parse(
                        &created_at,
                        &time::format_description::well_known::Rfc3339,
                    )?,
                    object: DetectedObject {
                        label: row.try_get("label")?,
                        bbox: BoundingBox {
                            x: u32::try_from(row.try_get::<i64, _>("x")?)?,
                            y: u32::try_from(row.try_get::<i64, _>("y")?)?,
                            width: u32::try_from(row.try_get::<i64, _>("width")?)?,
                            height: u32::try_from(row.try_get::<i64, _>("height")?)?,
                        },
                        confidence: row.try_get::<f64, _>("confidence")? as f32,
                    },
                })
            })
            .collect()
    }

    pub fn batch_count(&mut self) -> anyhow::Result<i64> {
        let (runtime, conn) = self.state.connection()?;
        state::block_on(runtime, async move {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM detection_batch")
                .fetch_one(&mut *conn)
                .await?;
            anyhow::Ok(count)
        })
    }
}

impl DetectionStore for SqliteStore {
    fn insert_batch(&mut self, detections: &[DetectedObject]) -> anyhow::Result<()> {
        let batch_id = Uuid::new_v4().to_string();
        let created_at =
            OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339)?;
        let object_count = detections.len() as i64;

        let (runtime, conn) = self.state.connection()?;
        state::block_on(runtime, async {
            let mut tx = conn.begin().await?;
            sqlx::query(
                r#"INSERT INTO detection_batch (id, created_at, object_count) VALUES ($1, $2, $3)"#,
            )
            .bind(&batch_id)
            .bind(&created_at)
            .bind(object_count)
            .execute(&mut *tx)
            .await?;
            for (position, detection) in detections.iter().enumerate() {
                sqlx::query(
                    r#"INSERT INTO detected_object
                    (batch_id, position, label, x, y, width, height, confidence)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
                )
                .bind(&batch_id)
                .bind(position as i64)
                .bind(&detection.label)
                .bind(detection.bbox.x as i64)
                .bind(detection.bbox.y as i64)
                .bind(detection.bbox.width as i64)
                .bind(detection.bbox.height as i64)
                .bind(detection.confidence as f64)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
            anyhow::Ok(())
        })?;
        log::debug!(target: TARGET, "Stored {} detections in batch {}", object_count, batch_id);
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.state.close()
    }
}
