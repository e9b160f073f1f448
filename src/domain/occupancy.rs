// ==========================================
// 酒店客房预订管理系统 - 占用区间与占用事实
// ==========================================
// 职责: 定义归一化后的占用表示
// 红线: 所有重叠判断只能基于本文件的半开区间语义,
//       不得按记录表示形式(行记录/遗留单房)各写一套
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Interval - 半开占用区间 [start_ms, end_ms)
// ==========================================
// 不变量: start_ms < end_ms 严格成立
// 半开语义: 区间占用到 end_ms 之前, 不含 end_ms 本身,
//           因此 11:00 退房与 11:00 入住可无缝衔接
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start_ms: i64, // 起始时刻(毫秒)
    pub end_ms: i64,   // 结束时刻(毫秒, 不含)
}

impl Interval {
    /// 构造区间
    ///
    /// # 返回
    /// - `Some(Interval)`: start_ms < end_ms
    /// - `None`: 零长或倒置区间(禁止静默产生)
    pub fn new(start_ms: i64, end_ms: i64) -> Option<Interval> {
        if start_ms < end_ms {
            Some(Interval { start_ms, end_ms })
        } else {
            None
        }
    }

    /// 标准半开区间重叠判断
    ///
    /// # 规则
    /// - [a0,a1) 与 [b0,b1) 重叠 ⟺ a0 < b1 且 b0 < a1
    /// - 端点相接不算重叠(支持同日退房/入住的背靠背翻房)
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }

    /// 判断时刻是否落在区间内 (start_ms <= instant < end_ms)
    pub fn contains(&self, instant_ms: i64) -> bool {
        self.start_ms <= instant_ms && instant_ms < self.end_ms
    }

    /// 区间时长(分钟)
    pub fn duration_minutes(&self) -> i64 {
        (self.end_ms - self.start_ms) / 60_000
    }
}

// ==========================================
// OccupancyFact - 归一化占用事实
// ==========================================
// 用途: 校验/对账边界统一产出 {房间, 区间, 预订} 三元组,
//       多房行记录与遗留单房头记录在此之后不再区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyFact {
    pub room_id: String,        // 占用的房间
    pub interval: Interval,     // 解析后的占用区间
    pub reservation_id: String, // 产生占用的预订
}

impl OccupancyFact {
    pub fn new(room_id: &str, interval: Interval, reservation_id: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            interval,
            reservation_id: reservation_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_rejects_inverted() {
        assert!(Interval::new(100, 100).is_none());
        assert!(Interval::new(200, 100).is_none());
        assert!(Interval::new(100, 200).is_some());
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = Interval::new(0, 100).unwrap();
        let b = Interval::new(100, 200).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_contains_is_half_open() {
        let i = Interval::new(100, 200).unwrap();
        assert!(i.contains(100));
        assert!(i.contains(199));
        assert!(!i.contains(200));
        assert!(!i.contains(99));
    }

    #[test]
    fn test_duration_minutes() {
        let i = Interval::new(0, 90 * 60_000).unwrap();
        assert_eq!(i.duration_minutes(), 90);
    }
}
