// ==========================================
// 酒店客房预订管理系统 - 引擎层
// ==========================================
// 职责: 实现预订调度业务规则
// 数据流: 时段解析 → 冲突校验 → 事务提交 → 房态对账 (单向依赖)
// 红线: 解析/校验/对账为纯逻辑; 唯一的副作用在协调器的提交步骤
// ==========================================

pub mod booking;
pub mod error;
pub mod overlap;
pub mod room_state;
pub mod stay_window;

// 重导出核心引擎
pub use booking::BookingCoordinator;
pub use error::{BookingError, BookingResult};
pub use overlap::{CandidateLine, OverlapValidator};
pub use room_state::{RoomStateReconciler, RoomStatusChange};
pub use stay_window::{to_epoch_ms, StayWindowResolver};
