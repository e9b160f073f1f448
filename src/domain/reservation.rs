// ==========================================
// 酒店客房预订管理系统 - 预订领域模型
// ==========================================
// 结构: 预订头 + 房间行明细 (头/行一体创建、一体替换、一体删除)
// 兼容: 头上保留 room_id 主房间引用;
//       无行记录的旧预订按"隐式单行"参与占用计算
// ==========================================

use crate::domain::types::StayKind;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// StayDescriptor - 入住描述
// ==========================================
// OVERNIGHT: 仅日历日期, 具体入住/退房钟点由系统配置补全
// HOURLY:    显式起始时刻 + 时长(分钟 >= 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stay_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StayDescriptor {
    Overnight {
        check_in_date: NaiveDate,   // 入住日期
        check_out_date: NaiveDate,  // 退房日期
    },
    Hourly {
        start_at: NaiveDateTime, // 起始时刻
        duration_minutes: i64,   // 时长(分钟)
    },
}

impl StayDescriptor {
    pub fn kind(&self) -> StayKind {
        match self {
            StayDescriptor::Overnight { .. } => StayKind::Overnight,
            StayDescriptor::Hourly { .. } => StayKind::Hourly,
        }
    }
}

// ==========================================
// ReservationHeader - 预订头
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationHeader {
    pub reservation_id: String,      // 预订ID
    pub guest_id: Option<String>,    // 客人ID(客人主数据由外部维护)
    pub guest_name: Option<String>,  // 客人姓名快照
    pub room_id: String,             // 主房间引用(兼容旧单房记录)
    pub stay: StayDescriptor,        // 入住描述
    pub total_amount: f64,           // 金额合计(仅存储, 不参与结算运算)
    pub deposit_amount: f64,         // 押金(仅存储)
    pub notes: Option<String>,       // 备注
    pub created_at: NaiveDateTime,   // 创建时间
    pub updated_at: NaiveDateTime,   // 更新时间
}

impl ReservationHeader {
    /// 头记录自身携带的日期范围
    ///
    /// 用途: 遗留单房记录(无行明细)按隐式单行参与占用计算时,
    ///       需要从头记录取回日期; 钟点房按起始时刻所在日计
    pub fn header_dates(&self) -> (NaiveDate, NaiveDate) {
        match &self.stay {
            StayDescriptor::Overnight {
                check_in_date,
                check_out_date,
            } => (*check_in_date, *check_out_date),
            StayDescriptor::Hourly { start_at, .. } => (start_at.date(), start_at.date()),
        }
    }
}

// ==========================================
// ReservationRoomLine - 预订房间行
// ==========================================
// 不变量: 同一预订头下, 任意两行不得引用同一房间
// 说明: 多房预订中各行可有各自的日期范围;
//       钟点房预订的行与头共享起始时刻+时长, 行上日期仅作展示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRoomLine {
    pub line_id: String,            // 行ID
    pub reservation_id: String,     // 所属预订头
    pub room_id: String,            // 房间引用
    pub price_per_night: f64,       // 下单时房价快照
    pub check_in_date: NaiveDate,   // 该房入住日期
    pub check_out_date: NaiveDate,  // 该房退房日期
}

/// 生成预订ID
pub fn new_reservation_id() -> String {
    Uuid::new_v4().to_string()
}

/// 生成预订房间行ID
pub fn new_line_id() -> String {
    Uuid::new_v4().to_string()
}
