// ==========================================
// 酒店客房预订管理系统 - 客房领域模型
// ==========================================
// 红线: 客房的增删改由外部模块负责;
//       本核心只拥有 status 字段(对账期间)
// ==========================================

use crate::domain::types::RoomStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Room - 客房
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,             // 房间ID
    pub room_no: String,             // 房号(如 "0801")
    pub room_type_id: String,        // 房型ID(房型主数据由外部维护)
    pub floor: Option<i32>,          // 楼层
    pub status: RoomStatus,          // 房态(AVAILABLE/OCCUPIED 归对账引擎)
    pub status_note: Option<String>, // 人工设置房态时的备注
    pub created_at: NaiveDateTime,   // 创建时间
    pub updated_at: NaiveDateTime,   // 更新时间
}

impl Room {
    /// 判断该房当前是否参与自动对账
    pub fn is_reconcilable(&self) -> bool {
        self.status.is_reconcilable()
    }
}
