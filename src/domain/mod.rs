// ==========================================
// 酒店客房预订管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与值类型
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod occupancy;
pub mod reservation;
pub mod room;
pub mod types;

// 重导出核心类型
pub use occupancy::{Interval, OccupancyFact};
pub use reservation::{
    new_line_id, new_reservation_id, ReservationHeader, ReservationRoomLine, StayDescriptor,
};
pub use room::Room;
pub use types::{RoomStatus, StayKind};
