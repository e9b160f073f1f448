// ==========================================
// 酒店客房预订管理系统 - 房态对账引擎
// ==========================================
// 职责: 依据当前预订与当前时刻, 重算每间房的推导房态
// 红线:
// - 纯函数: now 由调用方传入, 引擎不读系统时钟
// - 只输出实际发生变化的房间, 重复对账第二次必为空 (幂等)
// - CLEANING / OUT_OF_SERVICE 为人工房态, 整间房排除在对账之外
// - 单条脏记录只影响自身(回退日期级粗判), 不得阻断其他房间
// ==========================================

use crate::config::StayTimeConfig;
use crate::domain::reservation::{ReservationHeader, ReservationRoomLine};
use crate::domain::room::Room;
use crate::domain::types::RoomStatus;
use crate::engine::overlap::OverlapValidator;
use crate::engine::stay_window::to_epoch_ms;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// RoomStatusChange - 房态变更
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatusChange {
    pub room_id: String,        // 房间ID
    pub new_status: RoomStatus, // 推导出的新房态
}

// ==========================================
// RoomStateReconciler - 房态对账器
// ==========================================
pub struct RoomStateReconciler;

impl RoomStateReconciler {
    /// 对账: 重算每间房的推导房态
    ///
    /// # 算法 (逐房间)
    /// 1. 归一化全部占用事实 (行记录 + 遗留单房头记录, 与冲突
    ///    校验共用同一条归一化路径; 脏记录就地回退日期级区间)
    /// 2. now 落在任一占用区间内 → OCCUPIED, 否则 → AVAILABLE
    /// 3. 当前房态为人工状态(CLEANING/OUT_OF_SERVICE)的房间
    ///    整个排除, 不出现在输出中
    /// 4. 推导值与当前值相同的房间不输出
    ///
    /// # 返回
    /// 需要变更房态的房间列表; 调用方负责写回存储
    pub fn reconcile(
        rooms: &[Room],
        headers: &[ReservationHeader],
        lines: &[ReservationRoomLine],
        config: &StayTimeConfig,
        now: NaiveDateTime,
    ) -> Vec<RoomStatusChange> {
        let facts = OverlapValidator::collect_occupancy_facts(headers, lines, config);
        let now_ms = to_epoch_ms(now);

        rooms
            .iter()
            .filter_map(|room| {
                // 人工房态不参与自动翻转
                if !room.is_reconcilable() {
                    return None;
                }

                let occupied = facts
                    .iter()
                    .any(|fact| fact.room_id == room.room_id && fact.interval.contains(now_ms));

                let derived = if occupied {
                    RoomStatus::Occupied
                } else {
                    RoomStatus::Available
                };

                if derived != room.status {
                    Some(RoomStatusChange {
                        room_id: room.room_id.clone(),
                        new_status: derived,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::StayDescriptor;
    use chrono::{NaiveDate, NaiveTime};

    fn config() -> StayTimeConfig {
        StayTimeConfig {
            check_in_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            check_out_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        }
    }

    fn room(room_id: &str, status: RoomStatus) -> Room {
        let now = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Room {
            room_id: room_id.to_string(),
            room_no: room_id.to_string(),
            room_type_id: "STANDARD".to_string(),
            floor: None,
            status,
            status_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn overnight_header(reservation_id: &str, room_id: &str, ci: (u32, u32), co: (u32, u32)) -> ReservationHeader {
        let created = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ReservationHeader {
            reservation_id: reservation_id.to_string(),
            guest_id: None,
            guest_name: None,
            room_id: room_id.to_string(),
            stay: StayDescriptor::Overnight {
                check_in_date: NaiveDate::from_ymd_opt(2026, ci.0, ci.1).unwrap(),
                check_out_date: NaiveDate::from_ymd_opt(2026, co.0, co.1).unwrap(),
            },
            total_amount: 0.0,
            deposit_amount: 0.0,
            notes: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_room_flips_to_occupied_inside_window() {
        let rooms = vec![room("R101", RoomStatus::Available)];
        let headers = vec![overnight_header("resv-1", "R101", (3, 1), (3, 3))];
        // 3月2日20:00 在 [3月1日14:00, 3月3日12:00) 内
        let now = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();

        let changes = RoomStateReconciler::reconcile(&rooms, &headers, &[], &config(), now);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].room_id, "R101");
        assert_eq!(changes[0].new_status, RoomStatus::Occupied);
    }

    #[test]
    fn test_reconcile_idempotent_after_apply() {
        let headers = vec![overnight_header("resv-1", "R101", (3, 1), (3, 3))];
        let now = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();

        let rooms = vec![room("R101", RoomStatus::Available)];
        let first = RoomStateReconciler::reconcile(&rooms, &headers, &[], &config(), now);
        assert_eq!(first.len(), 1);

        // 应用变更后再次对账, 输出必为空
        let rooms = vec![room("R101", first[0].new_status)];
        let second = RoomStateReconciler::reconcile(&rooms, &headers, &[], &config(), now);
        assert!(second.is_empty());
    }

    #[test]
    fn test_cleaning_room_excluded_even_with_active_window() {
        let rooms = vec![room("R101", RoomStatus::Cleaning)];
        let headers = vec![overnight_header("resv-1", "R101", (3, 1), (3, 3))];
        let now = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();

        let changes = RoomStateReconciler::reconcile(&rooms, &headers, &[], &config(), now);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_room_released_after_checkout_instant() {
        let rooms = vec![room("R101", RoomStatus::Occupied)];
        let headers = vec![overnight_header("resv-1", "R101", (3, 1), (3, 3))];
        // 恰在退房时刻 12:00, 半开区间不含端点 → 释放
        let now = NaiveDate::from_ymd_opt(2026, 3, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let changes = RoomStateReconciler::reconcile(&rooms, &headers, &[], &config(), now);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].new_status, RoomStatus::Available);
    }
}
