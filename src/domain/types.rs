// ==========================================
// 酒店客房预订管理系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 房态 (Room Status)
// ==========================================
// 红线: OCCUPIED 是对账引擎唯一可自动设置/清除的状态;
//       CLEANING / OUT_OF_SERVICE 由前台人工设置, 对账引擎不得触碰
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,    // 空闲可售
    Occupied,     // 在住(由对账引擎推导)
    Cleaning,     // 打扫中(人工设置)
    OutOfService, // 停用维修(人工设置)
}

impl RoomStatus {
    /// 判断该状态是否归对账引擎管辖
    ///
    /// 仅 AVAILABLE / OCCUPIED 可被对账自动翻转;
    /// 其余状态在对账时整间房跳过
    pub fn is_reconcilable(&self) -> bool {
        matches!(self, RoomStatus::Available | RoomStatus::Occupied)
    }

    /// 判断该状态是否允许前台人工设置
    ///
    /// OCCUPIED 由预订窗口推导得出, 不允许人工直接设置
    pub fn is_operator_settable(&self) -> bool {
        !matches!(self, RoomStatus::Occupied)
    }

    /// 从数据库字符串解析
    pub fn parse(s: &str) -> Option<RoomStatus> {
        match s {
            "AVAILABLE" => Some(RoomStatus::Available),
            "OCCUPIED" => Some(RoomStatus::Occupied),
            "CLEANING" => Some(RoomStatus::Cleaning),
            "OUT_OF_SERVICE" => Some(RoomStatus::OutOfService),
            _ => None,
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomStatus::Available => write!(f, "AVAILABLE"),
            RoomStatus::Occupied => write!(f, "OCCUPIED"),
            RoomStatus::Cleaning => write!(f, "CLEANING"),
            RoomStatus::OutOfService => write!(f, "OUT_OF_SERVICE"),
        }
    }
}

// ==========================================
// 入住类型 (Stay Kind)
// ==========================================
// OVERNIGHT: 全日房, 仅记日历日期, 具体钟点由系统配置补全
// HOURLY:    钟点房, 显式起始时刻 + 时长(分钟)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StayKind {
    Overnight, // 全日房
    Hourly,    // 钟点房
}

impl StayKind {
    /// 从数据库字符串解析
    pub fn parse(s: &str) -> Option<StayKind> {
        match s {
            "OVERNIGHT" => Some(StayKind::Overnight),
            "HOURLY" => Some(StayKind::Hourly),
            _ => None,
        }
    }
}

impl fmt::Display for StayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StayKind::Overnight => write!(f, "OVERNIGHT"),
            StayKind::Hourly => write!(f, "HOURLY"),
        }
    }
}
