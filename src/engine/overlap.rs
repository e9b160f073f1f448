// ==========================================
// 酒店客房预订管理系统 - 占用冲突校验引擎
// ==========================================
// 职责: 判定候选预订能否落位; 归一化两种占用表示
// 红线: 行记录与遗留单房头记录必须在同一次扫描中全部覆盖,
//       不允许"查了一种表示、漏了另一种"导致重复售房;
//       重叠判断只此一处, 不得按路径另写变体
// ==========================================

use crate::config::StayTimeConfig;
use crate::domain::occupancy::{Interval, OccupancyFact};
use crate::domain::reservation::{ReservationHeader, ReservationRoomLine};
use crate::engine::error::{BookingError, BookingResult};
use crate::engine::stay_window::StayWindowResolver;
use std::collections::{HashMap, HashSet};

// ==========================================
// CandidateLine - 已解析的候选房间行
// ==========================================
#[derive(Debug, Clone)]
pub struct CandidateLine {
    pub room_id: String,    // 候选房间
    pub interval: Interval, // 候选占用区间
}

// ==========================================
// OverlapValidator - 冲突校验器
// ==========================================
pub struct OverlapValidator;

impl OverlapValidator {
    /// 归一化全部占用事实
    ///
    /// # 扫描范围
    /// 1. 每条房间行记录 → 一条占用事实
    /// 2. 每条无行明细的预订头(遗留单房记录) → 按主房间补一条隐式事实
    ///
    /// # 脏记录处理
    /// 已存库记录的时段无法按钟点解析时, 回退为日期级区间(只加宽)。
    /// 存量脏数据绝不允许因解析失败而逃逸出冲突扫描。
    pub fn collect_occupancy_facts(
        headers: &[ReservationHeader],
        lines: &[ReservationRoomLine],
        config: &StayTimeConfig,
    ) -> Vec<OccupancyFact> {
        let header_by_id: HashMap<&str, &ReservationHeader> = headers
            .iter()
            .map(|h| (h.reservation_id.as_str(), h))
            .collect();

        let mut headers_with_lines: HashSet<&str> = HashSet::new();
        let mut facts = Vec::with_capacity(lines.len() + headers.len());

        // 1. 行记录
        for line in lines {
            headers_with_lines.insert(line.reservation_id.as_str());

            let interval = match header_by_id.get(line.reservation_id.as_str()) {
                Some(header) => StayWindowResolver::resolve_line(line, &header.stay, config)
                    .unwrap_or_else(|e| {
                        tracing::warn!(
                            "房间行时段解析失败, 回退日期级区间: line_id={}, {}",
                            line.line_id,
                            e
                        );
                        StayWindowResolver::resolve_date_only(
                            line.check_in_date,
                            line.check_out_date,
                        )
                    }),
                None => {
                    // 孤儿行: 头已不存在仍按行日期计占用, 宁可误判冲突
                    tracing::warn!(
                        "房间行找不到所属预订头: line_id={}, reservation_id={}",
                        line.line_id,
                        line.reservation_id
                    );
                    StayWindowResolver::resolve_date_only(line.check_in_date, line.check_out_date)
                }
            };

            facts.push(OccupancyFact::new(
                &line.room_id,
                interval,
                &line.reservation_id,
            ));
        }

        // 2. 遗留单房头记录 (无行明细)
        for header in headers {
            if headers_with_lines.contains(header.reservation_id.as_str()) {
                continue;
            }

            let interval = StayWindowResolver::resolve(&header.stay, config).unwrap_or_else(|e| {
                tracing::warn!(
                    "遗留预订头时段解析失败, 回退日期级区间: reservation_id={}, {}",
                    header.reservation_id,
                    e
                );
                let (check_in, check_out) = header.header_dates();
                StayWindowResolver::resolve_date_only(check_in, check_out)
            });

            facts.push(OccupancyFact::new(
                &header.room_id,
                interval,
                &header.reservation_id,
            ));
        }

        facts
    }

    /// 单区间冲突探测
    ///
    /// # 规则
    /// - 仅比较同房间的占用事实, 其他房间一律无关
    /// - 半开区间标准重叠判断, 端点相接不算冲突
    /// - exclude_reservation_id: 编辑预订时排除其自身已存事实,
    ///   避免新行与旧行自我冲突
    ///
    /// # 返回
    /// - `Some(fact)`: 第一条冲突的占用事实
    /// - `None`: 无冲突
    pub fn has_conflict<'a>(
        candidate: &Interval,
        room_id: &str,
        facts: &'a [OccupancyFact],
        exclude_reservation_id: Option<&str>,
    ) -> Option<&'a OccupancyFact> {
        facts.iter().find(|fact| {
            fact.room_id == room_id
                && exclude_reservation_id != Some(fact.reservation_id.as_str())
                && fact.interval.overlaps(candidate)
        })
    }

    /// 校验候选预订的全部房间行 (全有或全无)
    ///
    /// # 规则
    /// 1. 候选行内部不得出现重复房间 (与时段无关)
    /// 2. 每行独立做冲突探测; 任一行冲突则整单拒绝,
    ///    并报出导致拒绝的房间与已占用时段
    pub fn validate_candidate(
        candidate_lines: &[CandidateLine],
        facts: &[OccupancyFact],
        exclude_reservation_id: Option<&str>,
    ) -> BookingResult<()> {
        if candidate_lines.is_empty() {
            return Err(BookingError::EmptyRoomSelection);
        }

        // 1. 重复房间检查
        let mut seen_rooms: HashSet<&str> = HashSet::new();
        for line in candidate_lines {
            if !seen_rooms.insert(line.room_id.as_str()) {
                return Err(BookingError::DuplicateRoomInReservation {
                    room_id: line.room_id.clone(),
                });
            }
        }

        // 2. 逐行冲突探测
        for line in candidate_lines {
            if let Some(conflict) = Self::has_conflict(
                &line.interval,
                &line.room_id,
                facts,
                exclude_reservation_id,
            ) {
                return Err(BookingError::RoomConflict {
                    room_id: line.room_id.clone(),
                    conflicting_reservation_id: conflict.reservation_id.clone(),
                    window: conflict.interval,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(room_id: &str, start_ms: i64, end_ms: i64, reservation_id: &str) -> OccupancyFact {
        OccupancyFact::new(
            room_id,
            Interval::new(start_ms, end_ms).unwrap(),
            reservation_id,
        )
    }

    #[test]
    fn test_conflict_is_symmetric() {
        let a = Interval::new(100, 300).unwrap();
        let b = Interval::new(200, 400).unwrap();
        let facts_b = vec![fact("R101", 200, 400, "resv-b")];
        let facts_a = vec![fact("R101", 100, 300, "resv-a")];
        assert!(OverlapValidator::has_conflict(&a, "R101", &facts_b, None).is_some());
        assert!(OverlapValidator::has_conflict(&b, "R101", &facts_a, None).is_some());
    }

    #[test]
    fn test_different_rooms_never_conflict() {
        let candidate = Interval::new(100, 300).unwrap();
        let facts = vec![fact("R102", 100, 300, "resv-1")];
        assert!(OverlapValidator::has_conflict(&candidate, "R101", &facts, None).is_none());
    }

    #[test]
    fn test_exclude_own_reservation() {
        let candidate = Interval::new(100, 300).unwrap();
        let facts = vec![fact("R101", 100, 300, "resv-self")];
        assert!(
            OverlapValidator::has_conflict(&candidate, "R101", &facts, Some("resv-self")).is_none()
        );
        assert!(OverlapValidator::has_conflict(&candidate, "R101", &facts, None).is_some());
    }

    #[test]
    fn test_duplicate_room_in_candidate_rejected() {
        let lines = vec![
            CandidateLine {
                room_id: "R101".to_string(),
                interval: Interval::new(100, 200).unwrap(),
            },
            CandidateLine {
                room_id: "R101".to_string(),
                interval: Interval::new(300, 400).unwrap(),
            },
        ];
        let err = OverlapValidator::validate_candidate(&lines, &[], None).unwrap_err();
        assert!(matches!(
            err,
            BookingError::DuplicateRoomInReservation { room_id } if room_id == "R101"
        ));
    }

    #[test]
    fn test_any_conflicting_line_rejects_whole_candidate() {
        let lines = vec![
            CandidateLine {
                room_id: "R101".to_string(),
                interval: Interval::new(100, 200).unwrap(),
            },
            CandidateLine {
                room_id: "R102".to_string(),
                interval: Interval::new(100, 200).unwrap(),
            },
        ];
        // R102 已被占用
        let facts = vec![fact("R102", 150, 250, "resv-x")];
        let err = OverlapValidator::validate_candidate(&lines, &facts, None).unwrap_err();
        assert!(matches!(
            err,
            BookingError::RoomConflict { room_id, .. } if room_id == "R102"
        ));
    }
}
