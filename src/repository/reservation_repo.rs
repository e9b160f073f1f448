// ==========================================
// 酒店客房预订管理系统 - 预订数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 头+行的原子写入由预订事务协调器在单个事务内完成;
//       本文件的 *_tx 系列函数接受事务内连接, 供协调器组合调用,
//       实例方法复用同一套 SQL, 保证两条路径行为一致
// ==========================================

use crate::domain::reservation::{ReservationHeader, ReservationRoomLine, StayDescriptor};
use crate::domain::types::StayKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 数据库日期格式
const DATE_FMT: &str = "%Y-%m-%d";
/// 数据库时间格式
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// 预订头查询列 (与 map_header_row 对齐)
const HEADER_COLUMNS: &str = r#"reservation_id, guest_id, guest_name, room_id, stay_kind,
    check_in_date, check_out_date, hourly_start_at, hourly_duration_minutes,
    total_amount, deposit_amount, notes, created_at, updated_at"#;

/// 预订房间行查询列 (与 map_line_row 对齐)
const LINE_COLUMNS: &str =
    r#"line_id, reservation_id, room_id, price_per_night, check_in_date, check_out_date"#;

// ==========================================
// ReservationRepository - 预订仓储
// ==========================================
pub struct ReservationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReservationRepository {
    /// 创建新的ReservationRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按reservation_id查询预订头
    pub fn find_header_by_id(
        &self,
        reservation_id: &str,
    ) -> RepositoryResult<Option<ReservationHeader>> {
        let conn = self.get_conn()?;
        find_header_by_id_tx(&conn, reservation_id)
    }

    /// 查询所有预订头
    pub fn list_headers(&self) -> RepositoryResult<Vec<ReservationHeader>> {
        let conn = self.get_conn()?;
        list_headers_tx(&conn)
    }

    /// 查询所有预订房间行
    pub fn list_lines(&self) -> RepositoryResult<Vec<ReservationRoomLine>> {
        let conn = self.get_conn()?;
        list_lines_tx(&conn)
    }

    /// 查询某预订头的所有房间行
    pub fn find_lines_by_reservation(
        &self,
        reservation_id: &str,
    ) -> RepositoryResult<Vec<ReservationRoomLine>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM reservation_room WHERE reservation_id = ? ORDER BY room_id",
            LINE_COLUMNS
        ))?;

        let lines = stmt
            .query_map(params![reservation_id], map_line_row)?
            .collect::<Result<Vec<ReservationRoomLine>, _>>()?;

        Ok(lines)
    }
}

// ==========================================
// 事务内函数 - 供协调器在单事务中组合
// ==========================================
// 说明: rusqlite 的 Transaction 解引用为 Connection,
//       以下函数在事务内与事务外均可调用

/// 按reservation_id查询预订头 (事务内可用)
pub fn find_header_by_id_tx(
    conn: &Connection,
    reservation_id: &str,
) -> RepositoryResult<Option<ReservationHeader>> {
    match conn.query_row(
        &format!(
            "SELECT {} FROM reservation WHERE reservation_id = ?",
            HEADER_COLUMNS
        ),
        params![reservation_id],
        map_header_row,
    ) {
        Ok(header) => Ok(Some(header)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// 查询所有预订头 (事务内读取最新数据)
pub fn list_headers_tx(conn: &Connection) -> RepositoryResult<Vec<ReservationHeader>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM reservation ORDER BY created_at DESC",
        HEADER_COLUMNS
    ))?;

    let headers = stmt
        .query_map([], map_header_row)?
        .collect::<Result<Vec<ReservationHeader>, _>>()?;

    Ok(headers)
}

/// 查询所有预订房间行 (事务内读取最新数据)
pub fn list_lines_tx(conn: &Connection) -> RepositoryResult<Vec<ReservationRoomLine>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM reservation_room ORDER BY reservation_id, room_id",
        LINE_COLUMNS
    ))?;

    let lines = stmt
        .query_map([], map_line_row)?
        .collect::<Result<Vec<ReservationRoomLine>, _>>()?;

    Ok(lines)
}

/// 插入预订头 (事务内)
pub fn insert_header_tx(conn: &Connection, header: &ReservationHeader) -> RepositoryResult<()> {
    let (stay_kind, check_in, check_out, hourly_start, hourly_minutes) = stay_columns(&header.stay);

    conn.execute(
        r#"INSERT INTO reservation (
            reservation_id, guest_id, guest_name, room_id, stay_kind,
            check_in_date, check_out_date, hourly_start_at, hourly_duration_minutes,
            total_amount, deposit_amount, notes, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        params![
            &header.reservation_id,
            &header.guest_id,
            &header.guest_name,
            &header.room_id,
            &stay_kind,
            &check_in,
            &check_out,
            &hourly_start,
            &hourly_minutes,
            &header.total_amount,
            &header.deposit_amount,
            &header.notes,
            &header.created_at.format(DATETIME_FMT).to_string(),
            &header.updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;

    Ok(())
}

/// 更新预订头 (事务内)
///
/// # 错误
/// - `RepositoryError::NotFound`: reservation_id不存在
pub fn update_header_tx(conn: &Connection, header: &ReservationHeader) -> RepositoryResult<()> {
    let (stay_kind, check_in, check_out, hourly_start, hourly_minutes) = stay_columns(&header.stay);

    let rows_affected = conn.execute(
        r#"UPDATE reservation
           SET guest_id = ?, guest_name = ?, room_id = ?, stay_kind = ?,
               check_in_date = ?, check_out_date = ?, hourly_start_at = ?,
               hourly_duration_minutes = ?, total_amount = ?, deposit_amount = ?,
               notes = ?, updated_at = ?
           WHERE reservation_id = ?"#,
        params![
            &header.guest_id,
            &header.guest_name,
            &header.room_id,
            &stay_kind,
            &check_in,
            &check_out,
            &hourly_start,
            &hourly_minutes,
            &header.total_amount,
            &header.deposit_amount,
            &header.notes,
            &header.updated_at.format(DATETIME_FMT).to_string(),
            &header.reservation_id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(RepositoryError::NotFound {
            entity: "ReservationHeader".to_string(),
            id: header.reservation_id.clone(),
        });
    }

    Ok(())
}

/// 删除预订头 (事务内)
///
/// # 错误
/// - `RepositoryError::NotFound`: reservation_id不存在
pub fn delete_header_tx(conn: &Connection, reservation_id: &str) -> RepositoryResult<()> {
    let rows_affected = conn.execute(
        "DELETE FROM reservation WHERE reservation_id = ?",
        params![reservation_id],
    )?;

    if rows_affected == 0 {
        return Err(RepositoryError::NotFound {
            entity: "ReservationHeader".to_string(),
            id: reservation_id.to_string(),
        });
    }

    Ok(())
}

/// 插入预订房间行 (事务内)
pub fn insert_line_tx(conn: &Connection, line: &ReservationRoomLine) -> RepositoryResult<()> {
    conn.execute(
        r#"INSERT INTO reservation_room (
            line_id, reservation_id, room_id, price_per_night,
            check_in_date, check_out_date
        ) VALUES (?, ?, ?, ?, ?, ?)"#,
        params![
            &line.line_id,
            &line.reservation_id,
            &line.room_id,
            &line.price_per_night,
            &line.check_in_date.format(DATE_FMT).to_string(),
            &line.check_out_date.format(DATE_FMT).to_string(),
        ],
    )?;

    Ok(())
}

/// 删除某预订头的全部房间行 (事务内)
///
/// # 返回
/// - `Ok(count)`: 删除的行数 (遗留单房记录无行, 返回0属正常)
pub fn delete_lines_by_reservation_tx(
    conn: &Connection,
    reservation_id: &str,
) -> RepositoryResult<usize> {
    let count = conn.execute(
        "DELETE FROM reservation_room WHERE reservation_id = ?",
        params![reservation_id],
    )?;

    Ok(count)
}

// ==========================================
// 行映射
// ==========================================

/// 入住描述拆列: (stay_kind, check_in, check_out, hourly_start, hourly_minutes)
///
/// 钟点房的日期列冗余存起始日, 供旧台账界面按日期检索
fn stay_columns(
    stay: &StayDescriptor,
) -> (String, Option<String>, Option<String>, Option<String>, Option<i64>) {
    match stay {
        StayDescriptor::Overnight {
            check_in_date,
            check_out_date,
        } => (
            StayKind::Overnight.to_string(),
            Some(check_in_date.format(DATE_FMT).to_string()),
            Some(check_out_date.format(DATE_FMT).to_string()),
            None,
            None,
        ),
        StayDescriptor::Hourly {
            start_at,
            duration_minutes,
        } => (
            StayKind::Hourly.to_string(),
            Some(start_at.date().format(DATE_FMT).to_string()),
            Some(start_at.date().format(DATE_FMT).to_string()),
            Some(start_at.format(DATETIME_FMT).to_string()),
            Some(*duration_minutes),
        ),
    }
}

/// 映射数据库行到ReservationHeader对象
fn map_header_row(row: &rusqlite::Row) -> rusqlite::Result<ReservationHeader> {
    let kind_text: String = row.get(4)?;
    let kind = StayKind::parse(&kind_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("非法入住类型: {}", kind_text).into(),
        )
    })?;

    let stay = match kind {
        StayKind::Overnight => StayDescriptor::Overnight {
            check_in_date: parse_date_col(row, 5)?,
            check_out_date: parse_date_col(row, 6)?,
        },
        StayKind::Hourly => StayDescriptor::Hourly {
            start_at: parse_datetime_col(row, 7)?,
            duration_minutes: row.get(8)?,
        },
    };

    Ok(ReservationHeader {
        reservation_id: row.get(0)?,
        guest_id: row.get(1)?,
        guest_name: row.get(2)?,
        room_id: row.get(3)?,
        stay,
        total_amount: row.get(9)?,
        deposit_amount: row.get(10)?,
        notes: row.get(11)?,
        created_at: parse_datetime_col(row, 12)?,
        updated_at: parse_datetime_col(row, 13)?,
    })
}

/// 映射数据库行到ReservationRoomLine对象
fn map_line_row(row: &rusqlite::Row) -> rusqlite::Result<ReservationRoomLine> {
    Ok(ReservationRoomLine {
        line_id: row.get(0)?,
        reservation_id: row.get(1)?,
        room_id: row.get(2)?,
        price_per_night: row.get(3)?,
        check_in_date: parse_date_col(row, 4)?,
        check_out_date: parse_date_col(row, 5)?,
    })
}

/// 解析数据库日期列
fn parse_date_col(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 解析数据库时间列
fn parse_datetime_col(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, DATETIME_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
