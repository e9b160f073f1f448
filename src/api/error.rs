// ==========================================
// 酒店客房预订管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 将仓储/引擎错误转换为
//       前台可直接展示的错误消息
// ==========================================

use crate::engine::error::BookingError;
use crate::repository::error::RepositoryError;
use chrono::DateTime;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因, 可直接用于前台提示
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 预订校验错误
    // ==========================================
    /// 房间时段冲突 (带结构化详情, 供前台高亮冲突房间/时段)
    #[error("预订冲突: {reason}")]
    BookingConflict {
        reason: String,
        detail: ConflictDetail,
    },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据校验失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 资源错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将仓储层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ValidationError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 BookingError 转换
// 目的: 校验错误 → 前台可读提示; 冲突错误附结构化详情
// ==========================================
impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidDuration { minutes } => {
                ApiError::InvalidInput(format!("钟点房时长非法: {}分钟 (最少1分钟)", minutes))
            }
            BookingError::InvalidDateRange {
                check_in,
                check_out,
            } => ApiError::InvalidInput(format!(
                "日期范围非法: 退房({})未晚于入住({})",
                check_out, check_in
            )),
            BookingError::DuplicateRoomInReservation { room_id } => {
                ApiError::InvalidInput(format!("同一预订中房间{}被重复选择", room_id))
            }
            BookingError::EmptyRoomSelection => {
                ApiError::InvalidInput("预订未选择任何房间".to_string())
            }
            BookingError::RoomConflict {
                room_id,
                conflicting_reservation_id,
                window,
            } => {
                let occupied_from = format_epoch_ms(window.start_ms);
                let occupied_until = format_epoch_ms(window.end_ms);
                ApiError::BookingConflict {
                    reason: format!(
                        "房间{}在 {} ~ {} 已有预订, 无法落位",
                        room_id, occupied_from, occupied_until
                    ),
                    detail: ConflictDetail {
                        room_id,
                        conflicting_reservation_id,
                        occupied_from,
                        occupied_until,
                    },
                }
            }
            BookingError::MalformedRecord { entity, id, reason } => {
                ApiError::ValidationError(format!("记录无法解释: {} id={}: {}", entity, id, reason))
            }
            BookingError::Storage(repo_err) => repo_err.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 冲突详情
// ==========================================

/// 预订冲突详情
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConflictDetail {
    /// 冲突房间
    pub room_id: String,
    /// 已占用该时段的预订
    pub conflicting_reservation_id: String,
    /// 占用起始时刻 (格式化)
    pub occupied_from: String,
    /// 占用结束时刻 (格式化, 不含)
    pub occupied_until: String,
}

/// 毫秒时间戳格式化为前台可读时刻
fn format_epoch_ms(ms: i64) -> String {
    match DateTime::from_timestamp_millis(ms) {
        Some(dt) => dt.naive_utc().format("%Y-%m-%d %H:%M").to_string(),
        None => format!("{}ms", ms),
    }
}
