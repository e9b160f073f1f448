// ==========================================
// 酒店客房预订管理系统 - 预订事务协调器
// ==========================================
// 职责: 预订头+房间行的原子提交 (创建/修改/删除)
// 状态机: Proposed → Validated → Committed → [Edited → Validated
//         → Committed]* → Deleted
// 红线:
// - 多窗口/多进程共享同一库, 提交前必须在同一事务内用最新数据
//   重新跑冲突校验; 事务外的预校验一律只作提示, 不作提交依据
// - 任一写失败整个操作回滚, 读端永远看不到半成品状态
// - 修改采用"删全部旧行+插全部新行", 不做逐行补丁
// ==========================================

use crate::config::StayTimeConfig;
use crate::domain::reservation::{ReservationHeader, ReservationRoomLine};
use crate::engine::error::{BookingError, BookingResult};
use crate::engine::overlap::{CandidateLine, OverlapValidator};
use crate::engine::stay_window::StayWindowResolver;
use crate::repository::error::RepositoryError;
use crate::repository::reservation_repo::{
    delete_header_tx, delete_lines_by_reservation_tx, find_header_by_id_tx, insert_header_tx,
    insert_line_tx, list_headers_tx, list_lines_tx, update_header_tx,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// BookingCoordinator - 预订事务协调器
// ==========================================
pub struct BookingCoordinator {
    conn: Arc<Mutex<Connection>>,
}

impl BookingCoordinator {
    /// 创建新的BookingCoordinator实例
    ///
    /// # 参数
    /// - conn: 显式传入的共享库连接 (不读任何模块级连接单例)
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> BookingResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| BookingError::Storage(RepositoryError::LockError(e.to_string())))
    }

    /// 创建预订 (头+全部房间行, 单事务)
    ///
    /// # 参数
    /// - header: 预订头 (reservation_id 由调用方生成)
    /// - lines: 房间行; 行上的 reservation_id 以头为准强制覆写
    /// - config: 入住/退房钟点配置
    ///
    /// # 返回
    /// - `Ok(reservation_id)`: 提交成功
    /// - `Err`: 校验失败或存储失败, 未写入任何数据
    ///
    /// # 幂等性
    /// 同一候选重复调用会产生重复预订, 防重提交由调用方负责
    pub fn create(
        &self,
        header: &ReservationHeader,
        lines: &[ReservationRoomLine],
        config: &StayTimeConfig,
    ) -> BookingResult<String> {
        let lines = rebind_lines(&header.reservation_id, lines);
        let candidates = resolve_candidate_lines(header, &lines, config)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(RepositoryError::from)?;

        // 事务内重读最新占用数据并校验 (这是唯一作数的校验)
        let facts = OverlapValidator::collect_occupancy_facts(
            &list_headers_tx(&tx)?,
            &list_lines_tx(&tx)?,
            config,
        );
        OverlapValidator::validate_candidate(&candidates, &facts, None)?;

        insert_header_tx(&tx, header)?;
        for line in &lines {
            insert_line_tx(&tx, line)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            "预订创建成功: reservation_id={}, 房间数={}",
            header.reservation_id,
            lines.len()
        );
        Ok(header.reservation_id.clone())
    }

    /// 修改预订 (替换全部房间行, 单事务)
    ///
    /// # 语义
    /// 旧行全删、新行全插, 保证"行集合与头的当前房间选择一致"
    /// 这一不变量平凡成立; 自身已存占用不参与冲突判定
    pub fn update(
        &self,
        reservation_id: &str,
        header: &ReservationHeader,
        lines: &[ReservationRoomLine],
        config: &StayTimeConfig,
    ) -> BookingResult<()> {
        let mut header = header.clone();
        header.reservation_id = reservation_id.to_string();
        let lines = rebind_lines(reservation_id, lines);
        let candidates = resolve_candidate_lines(&header, &lines, config)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(RepositoryError::from)?;

        if find_header_by_id_tx(&tx, reservation_id)?.is_none() {
            return Err(BookingError::Storage(RepositoryError::NotFound {
                entity: "ReservationHeader".to_string(),
                id: reservation_id.to_string(),
            }));
        }

        // 事务内重读最新占用数据, 排除本预订自身
        let facts = OverlapValidator::collect_occupancy_facts(
            &list_headers_tx(&tx)?,
            &list_lines_tx(&tx)?,
            config,
        );
        OverlapValidator::validate_candidate(&candidates, &facts, Some(reservation_id))?;

        update_header_tx(&tx, &header)?;
        let removed = delete_lines_by_reservation_tx(&tx, reservation_id)?;
        for line in &lines {
            insert_line_tx(&tx, line)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            "预订修改成功: reservation_id={}, 旧行数={}, 新行数={}",
            reservation_id,
            removed,
            lines.len()
        );
        Ok(())
    }

    /// 删除预订 (头+全部房间行, 单事务)
    ///
    /// 预订不允许出现"有行无头"或"删除后头残留零行"的中间形态
    pub fn delete(&self, reservation_id: &str) -> BookingResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(RepositoryError::from)?;

        let removed = delete_lines_by_reservation_tx(&tx, reservation_id)?;
        delete_header_tx(&tx, reservation_id)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            "预订删除成功: reservation_id={}, 删除行数={}",
            reservation_id, removed
        );
        Ok(())
    }
}

/// 行上的 reservation_id 以头为准强制覆写
fn rebind_lines(reservation_id: &str, lines: &[ReservationRoomLine]) -> Vec<ReservationRoomLine> {
    lines
        .iter()
        .map(|line| {
            let mut line = line.clone();
            line.reservation_id = reservation_id.to_string();
            line
        })
        .collect()
}

/// 解析候选行的占用区间
///
/// 候选记录无法解析时属调用方错误, 按对应校验错误同步报出,
/// 绝不套用存量脏数据的日期级回退(候选必须改对后重新提交)
fn resolve_candidate_lines(
    header: &ReservationHeader,
    lines: &[ReservationRoomLine],
    config: &StayTimeConfig,
) -> BookingResult<Vec<CandidateLine>> {
    if lines.is_empty() {
        return Err(BookingError::EmptyRoomSelection);
    }

    lines
        .iter()
        .map(|line| {
            if line.room_id.trim().is_empty() {
                return Err(BookingError::MalformedRecord {
                    entity: "ReservationRoomLine".to_string(),
                    id: line.line_id.clone(),
                    reason: "房间引用为空".to_string(),
                });
            }

            let interval = StayWindowResolver::resolve_line(line, &header.stay, config)?;
            Ok(CandidateLine {
                room_id: line.room_id.clone(),
                interval,
            })
        })
        .collect()
}
