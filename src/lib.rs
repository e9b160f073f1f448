// ==========================================
// 酒店客房预订管理系统 - 预订调度核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 单店客房预订台账的调度核心
// 范围: 入住时段解析 / 冲突校验 / 预订事务 / 房态对账
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 调度业务规则
pub mod engine;

// 配置层 - 入住/退房时间等系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 调用方接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{RoomStatus, StayKind};

// 领域实体
pub use domain::{
    Interval, OccupancyFact, ReservationHeader, ReservationRoomLine, Room, StayDescriptor,
};

// 配置
pub use config::{SettingsManager, StayTimeConfig};

// 引擎
pub use engine::{
    BookingCoordinator, BookingError, OverlapValidator, RoomStateReconciler, RoomStatusChange,
    StayWindowResolver,
};

// API
pub use api::{ReservationApi, RoomStatusApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "酒店客房预订管理系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================
