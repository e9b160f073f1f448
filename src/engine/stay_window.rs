// ==========================================
// 酒店客房预订管理系统 - 入住时段解析引擎
// ==========================================
// 职责: 将异构预订记录(全日房/钟点房)解析为规范半开占用区间
// 红线: 无状态、无副作用、无 I/O 操作;
//       永不静默产出零长或倒置区间(要么合法区间, 要么显式报错)
// ==========================================

use crate::config::StayTimeConfig;
use crate::domain::occupancy::Interval;
use crate::domain::reservation::{ReservationRoomLine, StayDescriptor};
use crate::engine::error::{BookingError, BookingResult};
use chrono::{Days, NaiveDate, NaiveDateTime};

/// NaiveDateTime 转毫秒时间戳 (按 UTC 计)
///
/// 整套系统的区间运算只要求同一基准下可比, 不涉及时区换算
pub fn to_epoch_ms(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

// ==========================================
// StayWindowResolver - 入住时段解析器
// ==========================================
pub struct StayWindowResolver;

impl StayWindowResolver {
    /// 解析入住描述为占用区间
    ///
    /// # 规则
    /// - 钟点房: start = 起始时刻, end = 起始时刻 + 时长
    /// - 全日房: 入住日期 + 默认入住钟点 → start,
    ///           退房日期 + 默认退房钟点 → end;
    ///           若 end <= start, 退房时刻顺延一个日历日后重新组合
    ///
    /// # 退房顺延策略
    /// 同日预订且退房钟点早于入住钟点, 语义是"次日早上退房",
    /// 而不是"入住当天早上已退房"。该策略对所有全日房统一生效,
    /// 时段推导只允许存在这一条代码路径。
    pub fn resolve(stay: &StayDescriptor, config: &StayTimeConfig) -> BookingResult<Interval> {
        match stay {
            StayDescriptor::Overnight {
                check_in_date,
                check_out_date,
            } => Self::resolve_overnight(*check_in_date, *check_out_date, config),
            StayDescriptor::Hourly {
                start_at,
                duration_minutes,
            } => Self::resolve_hourly(*start_at, *duration_minutes),
        }
    }

    /// 解析全日房时段
    ///
    /// # 错误
    /// - `InvalidDateRange`: 顺延一日后区间仍不满足 start < end
    ///   (即退房日期早于入住日期, 属调用方错误)
    pub fn resolve_overnight(
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        config: &StayTimeConfig,
    ) -> BookingResult<Interval> {
        let start_ms = to_epoch_ms(check_in_date.and_time(config.check_in_time));
        let mut end_ms = to_epoch_ms(check_out_date.and_time(config.check_out_time));

        // 退房顺延: 仅顺延一次
        if end_ms <= start_ms {
            let rolled = check_out_date
                .checked_add_days(Days::new(1))
                .ok_or_else(|| BookingError::InvalidDateRange {
                    check_in: check_in_date.to_string(),
                    check_out: check_out_date.to_string(),
                })?;
            end_ms = to_epoch_ms(rolled.and_time(config.check_out_time));
        }

        Interval::new(start_ms, end_ms).ok_or_else(|| BookingError::InvalidDateRange {
            check_in: check_in_date.to_string(),
            check_out: check_out_date.to_string(),
        })
    }

    /// 解析钟点房时段
    ///
    /// # 错误
    /// - `InvalidDuration`: 时长小于1分钟
    pub fn resolve_hourly(start_at: NaiveDateTime, duration_minutes: i64) -> BookingResult<Interval> {
        if duration_minutes < 1 {
            return Err(BookingError::InvalidDuration {
                minutes: duration_minutes,
            });
        }

        let start_ms = to_epoch_ms(start_at);
        let end_ms = start_ms + duration_minutes * 60_000;

        Interval::new(start_ms, end_ms).ok_or(BookingError::InvalidDuration {
            minutes: duration_minutes,
        })
    }

    /// 解析预订房间行的占用时段
    ///
    /// # 规则
    /// - 全日房预订: 按行自身日期解析(多房预订中各行日期可不同)
    /// - 钟点房预订: 各行与头共享起始时刻+时长, 按头描述解析
    pub fn resolve_line(
        line: &ReservationRoomLine,
        header_stay: &StayDescriptor,
        config: &StayTimeConfig,
    ) -> BookingResult<Interval> {
        match header_stay {
            StayDescriptor::Overnight { .. } => {
                Self::resolve_overnight(line.check_in_date, line.check_out_date, config)
            }
            StayDescriptor::Hourly { .. } => Self::resolve(header_stay, config),
        }
    }

    /// 日期级保守回退区间
    ///
    /// # 用途
    /// - 配置不可用或记录钟点信息无法解释时, 退化为日期级比较
    /// - 回退只允许比钟点级区间更宽(避免冲突漏判), 不允许更窄,
    ///   因此区间取 [入住日零点, 退房日次日零点)
    /// - 日期倒置的脏记录按两日期的先后序重排后仍给出合法区间,
    ///   保证回退路径对任何已存库记录总能给出结论
    pub fn resolve_date_only(check_in_date: NaiveDate, check_out_date: NaiveDate) -> Interval {
        let (lo, hi) = if check_in_date <= check_out_date {
            (check_in_date, check_out_date)
        } else {
            (check_out_date, check_in_date)
        };

        let start_ms = to_epoch_ms(lo.and_hms_opt(0, 0, 0).unwrap_or_default());
        let end_day = hi.checked_add_days(Days::new(1)).unwrap_or(hi);
        let mut end_ms = to_epoch_ms(end_day.and_hms_opt(0, 0, 0).unwrap_or_default());

        // checked_add_days 仅在日历上限溢出时失败, 此时强制加宽一日
        if end_ms <= start_ms {
            end_ms = start_ms + 24 * 60 * 60_000;
        }

        // 以上已保证 start < end
        Interval {
            start_ms,
            end_ms,
        }
    }
}
