// ==========================================
// 酒店客房预订管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 供前台界面调用
// ==========================================

pub mod error;
pub mod reservation_api;
pub mod room_status_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ConflictDetail};
pub use reservation_api::ReservationApi;
pub use room_status_api::RoomStatusApi;
