// ==========================================
// 酒店客房预订管理系统 - 客房数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 客房增删改由外部模块负责; 本核心只在对账/人工设置
//       两条路径上写 status / status_note 字段
// ==========================================

use crate::domain::room::Room;
use crate::domain::types::RoomStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 数据库时间格式
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// RoomRepository - 客房仓储
// ==========================================
pub struct RoomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RoomRepository {
    /// 创建新的RoomRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入客房
    ///
    /// # 返回
    /// - `Ok(room_id)`: 成功
    /// - `Err`: 数据库错误
    pub fn insert(&self, room: &Room) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO room (
                room_id, room_no, room_type_id, floor, status, status_note,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &room.room_id,
                &room.room_no,
                &room.room_type_id,
                &room.floor,
                &room.status.to_string(),
                &room.status_note,
                &room.created_at.format(DATETIME_FMT).to_string(),
                &room.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;

        Ok(room.room_id.clone())
    }

    /// 按room_id查询客房
    ///
    /// # 返回
    /// - `Ok(Some(Room))`: 找到客房
    /// - `Ok(None)`: 未找到
    /// - `Err`: 数据库错误
    pub fn find_by_id(&self, room_id: &str) -> RepositoryResult<Option<Room>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT room_id, room_no, room_type_id, floor, status, status_note,
                      created_at, updated_at
               FROM room
               WHERE room_id = ?"#,
            params![room_id],
            map_room_row,
        ) {
            Ok(room) => Ok(Some(room)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询所有客房
    ///
    /// # 返回
    /// - `Ok(Vec<Room>)`: 客房列表，按房号升序
    pub fn list_all(&self) -> RepositoryResult<Vec<Room>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT room_id, room_no, room_type_id, floor, status, status_note,
                      created_at, updated_at
               FROM room
               ORDER BY room_no"#,
        )?;

        let rooms = stmt
            .query_map([], map_room_row)?
            .collect::<Result<Vec<Room>, _>>()?;

        Ok(rooms)
    }

    /// 更新房态
    ///
    /// # 参数
    /// - room_id: 房间ID
    /// - status: 新房态
    /// - status_note: 人工设置时的备注 (对账写入时传 None)
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: room_id不存在
    pub fn update_status(
        &self,
        room_id: &str,
        status: RoomStatus,
        status_note: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        // 房态写入在多窗口并发下最易撞 busy, 套有界重试
        let rows_affected = crate::db::with_busy_retry(|| {
            conn.execute(
                r#"UPDATE room
                   SET status = ?, status_note = ?, updated_at = ?
                   WHERE room_id = ?"#,
                params![
                    &status.to_string(),
                    &status_note,
                    &Utc::now().naive_utc().format(DATETIME_FMT).to_string(),
                    room_id,
                ],
            )
        })?;

        if rows_affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Room".to_string(),
                id: room_id.to_string(),
            });
        }

        Ok(())
    }
}

/// 映射数据库行到Room对象
fn map_room_row(row: &rusqlite::Row) -> rusqlite::Result<Room> {
    let status_text: String = row.get(4)?;
    let status = RoomStatus::parse(&status_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("非法房态: {}", status_text).into(),
        )
    })?;

    Ok(Room {
        room_id: row.get(0)?,
        room_no: row.get(1)?,
        room_type_id: row.get(2)?,
        floor: row.get(3)?,
        status,
        status_note: row.get(5)?,
        created_at: parse_datetime(row, 6)?,
        updated_at: parse_datetime(row, 7)?,
    })
}

/// 解析数据库时间列
fn parse_datetime(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, DATETIME_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
