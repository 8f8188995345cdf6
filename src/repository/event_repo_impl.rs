// ==========================================
// OpenSILEX 事件导入 - 事件 Repository 实现
// ==========================================
// 职责: 实现事件存储（使用 rusqlite）
// 表: event / event_target / move_event
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::event::{EventModel, MoveModel, PositionModel};
use crate::domain::types::EventKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::event_repo::EventRepository;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// IN 查询单批最大参数个数（低于 SQLite 默认上限）
const URI_LOOKUP_CHUNK: usize = 500;

// ==========================================
// EventRepositoryImpl
// ==========================================
pub struct EventRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl EventRepositoryImpl {
    /// 创建新的 Repository 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中写入单个事件
    fn insert_event_tx(tx: &Transaction, kind: EventKind, event: &EventModel) -> RepositoryResult<()> {
        let uri = event.uri.as_deref().ok_or_else(|| RepositoryError::FieldValueError {
            field: "uri".to_string(),
            message: format!("第 {} 行事件缺少 URI", event.row_index),
        })?;

        tx.execute(
            r#"
            INSERT INTO event (
                uri, kind, rdf_type, is_instant, start_at, end_at, description, creator
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                uri,
                kind.to_string(),
                event.rdf_type,
                event.is_instant,
                event.start,
                event.end,
                event.description,
                event.creator,
            ],
        )?;

        for target in &event.targets {
            tx.execute(
                "INSERT OR IGNORE INTO event_target (event_uri, target_uri) VALUES (?1, ?2)",
                params![uri, target],
            )?;
        }

        if let Some(movement) = &event.movement {
            let position_json = movement
                .position
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| RepositoryError::SerializationError {
                    field: "position".to_string(),
                    message: e.to_string(),
                })?;

            tx.execute(
                "INSERT INTO move_event (event_uri, from_uri, to_uri, position_json) VALUES (?1, ?2, ?3, ?4)",
                params![uri, movement.from, movement.to, position_json],
            )?;
        }

        Ok(())
    }

    fn load_targets(conn: &Connection, uri: &str) -> RepositoryResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT target_uri FROM event_target WHERE event_uri = ?1 ORDER BY target_uri",
        )?;
        let targets = stmt
            .query_map(params![uri], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(targets)
    }

    fn load_movement(conn: &Connection, uri: &str) -> RepositoryResult<Option<MoveModel>> {
        let row = conn
            .query_row(
                "SELECT from_uri, to_uri, position_json FROM move_event WHERE event_uri = ?1",
                params![uri],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()?;

        let (from, to, position_json) = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let position = position_json
            .map(|raw| serde_json::from_str::<PositionModel>(&raw))
            .transpose()
            .map_err(|e| RepositoryError::SerializationError {
                field: "position_json".to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(MoveModel { from, to, position }))
    }
}

#[async_trait]
impl EventRepository for EventRepositoryImpl {
    async fn create(&self, kind: EventKind, event: &EventModel) -> RepositoryResult<()> {
        self.create_many(kind, std::slice::from_ref(event)).await?;
        Ok(())
    }

    async fn create_many(&self, kind: EventKind, events: &[EventModel]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for event in events {
            Self::insert_event_tx(&tx, kind, event)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(kind = %kind, count = events.len(), "事件批量写入完成");
        Ok(events.len())
    }

    async fn existing_uris(&self, uris: &[String]) -> RepositoryResult<HashSet<String>> {
        let conn = self.get_conn()?;
        let mut existing = HashSet::new();

        for chunk in uris.chunks(URI_LOOKUP_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("SELECT uri FROM event WHERE uri IN ({})", placeholders);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| row.get::<_, String>(0))?;
            for row in rows {
                existing.insert(row?);
            }
        }

        Ok(existing)
    }

    async fn get_by_uri(&self, uri: &str) -> RepositoryResult<Option<EventModel>> {
        let conn = self.get_conn()?;

        let row = conn
            .query_row(
                r#"
                SELECT uri, rdf_type, is_instant, start_at, end_at, description, creator
                FROM event WHERE uri = ?1
                "#,
                params![uri],
                |row| {
                    let mut event = EventModel::new(0);
                    event.uri = Some(row.get::<_, String>(0)?);
                    event.rdf_type = row.get(1)?;
                    event.is_instant = row.get(2)?;
                    event.start = row.get::<_, Option<DateTime<FixedOffset>>>(3)?;
                    event.end = row.get::<_, Option<DateTime<FixedOffset>>>(4)?;
                    event.description = row.get(5)?;
                    event.creator = row.get(6)?;
                    Ok(event)
                },
            )
            .optional()?;

        let mut event = match row {
            Some(e) => e,
            None => return Ok(None),
        };

        event.targets = Self::load_targets(&conn, uri)?;
        event.movement = Self::load_movement(&conn, uri)?;

        Ok(Some(event))
    }

    async fn count_events(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM event", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
