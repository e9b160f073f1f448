// ==========================================
// 酒店客房预订管理系统 - 引擎层错误类型
// ==========================================
// 职责: 预订调度核心的错误定义
// 约束: 校验类错误为调用方错误, 同步报出, 永不自动重试;
//       存储类错误由仓储层包装后透传
// ==========================================

use crate::domain::occupancy::Interval;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum BookingError {
    // ===== 校验错误 (调用方修正后重新提交) =====
    #[error("钟点房时长非法: {minutes}分钟 (最少1分钟)")]
    InvalidDuration { minutes: i64 },

    #[error("日期范围非法: 退房({check_out})未晚于入住({check_in})")]
    InvalidDateRange { check_in: String, check_out: String },

    #[error("同一预订中房间重复: room_id={room_id}")]
    DuplicateRoomInReservation { room_id: String },

    #[error("房间时段冲突: room_id={room_id}, 与预订{conflicting_reservation_id}的已占时段重叠")]
    RoomConflict {
        room_id: String,
        conflicting_reservation_id: String,
        /// 造成冲突的已有占用区间
        window: Interval,
    },

    #[error("预订未选择任何房间")]
    EmptyRoomSelection,

    // ===== 数据质量错误 =====
    // 对账时就地回退(日期级粗判), 校验时保守拒绝
    #[error("记录无法解释: {entity} id={id}: {reason}")]
    MalformedRecord {
        entity: String,
        id: String,
        reason: String,
    },

    // ===== 存储错误 =====
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Result 类型别名
pub type BookingResult<T> = Result<T, BookingError>;
