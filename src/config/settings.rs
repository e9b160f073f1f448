// ==========================================
// 酒店客房预订管理系统 - 系统设置管理器
// ==========================================
// 职责: 默认入住/退房时间等设置的加载与写入
// 存储: config_kv 表 (key-value + scope)
// 红线: 时段解析引擎不得自行读取设置;
//       设置在此解析为 StayTimeConfig 后显式传入
// ==========================================

use chrono::NaiveTime;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    /// 默认入住时间 (HH:MM)
    pub const DEFAULT_CHECK_IN_TIME: &str = "default_check_in_time";
    /// 默认退房时间 (HH:MM)
    pub const DEFAULT_CHECK_OUT_TIME: &str = "default_check_out_time";
}

/// 内置默认入住时间
pub const BUILTIN_CHECK_IN_TIME: &str = "14:00";
/// 内置默认退房时间
pub const BUILTIN_CHECK_OUT_TIME: &str = "12:00";

// ==========================================
// StayTimeConfig - 入住/退房钟点配置
// ==========================================
// 全日房仅记日历日期, 实际入住/退房钟点由本配置补全
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StayTimeConfig {
    pub check_in_time: NaiveTime,  // 默认入住时间
    pub check_out_time: NaiveTime, // 默认退房时间
}

impl StayTimeConfig {
    /// 从 HH:MM 字符串构造
    ///
    /// # 返回
    /// - `Some(config)`: 两个时间均解析成功
    /// - `None`: 任一时间格式非法
    pub fn from_hhmm(check_in: &str, check_out: &str) -> Option<StayTimeConfig> {
        Some(StayTimeConfig {
            check_in_time: parse_hhmm(check_in)?,
            check_out_time: parse_hhmm(check_out)?,
        })
    }
}

impl Default for StayTimeConfig {
    fn default() -> Self {
        // 内置值为合法字面量, 解析不会失败
        StayTimeConfig::from_hhmm(BUILTIN_CHECK_IN_TIME, BUILTIN_CHECK_OUT_TIME)
            .unwrap_or(StayTimeConfig {
                check_in_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default(),
                check_out_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            })
    }
}

/// 解析 HH:MM 字符串
pub fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

// ==========================================
// SettingsManager - 设置管理器
// ==========================================
pub struct SettingsManager {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsManager {
    /// 创建新的 SettingsManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = crate::db::open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 SettingsManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（scope_id='global'，UPSERT）
    fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value)
               VALUES ('global', ?1, ?2)
               ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value"#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 加载入住/退房钟点配置
    ///
    /// # 回退策略
    /// - 配置缺失: 使用内置默认值 (14:00 / 12:00)
    /// - 配置值格式非法: 告警并使用内置默认值
    ///   (解析引擎另有日期级保守回退, 见 engine::stay_window)
    pub fn stay_time_config(&self) -> Result<StayTimeConfig, Box<dyn Error>> {
        let check_in = self
            .get_config_value(config_keys::DEFAULT_CHECK_IN_TIME)?
            .unwrap_or_else(|| BUILTIN_CHECK_IN_TIME.to_string());
        let check_out = self
            .get_config_value(config_keys::DEFAULT_CHECK_OUT_TIME)?
            .unwrap_or_else(|| BUILTIN_CHECK_OUT_TIME.to_string());

        match StayTimeConfig::from_hhmm(&check_in, &check_out) {
            Some(config) => Ok(config),
            None => {
                tracing::warn!(
                    "入住/退房时间配置格式非法 (check_in={}, check_out={}), 使用内置默认值",
                    check_in,
                    check_out
                );
                Ok(StayTimeConfig::default())
            }
        }
    }

    /// 写入入住/退房钟点配置
    ///
    /// # 参数
    /// - check_in / check_out: HH:MM 字符串
    ///
    /// # 错误
    /// - 任一时间格式非法时拒绝写入
    pub fn set_stay_times(&self, check_in: &str, check_out: &str) -> Result<(), Box<dyn Error>> {
        if parse_hhmm(check_in).is_none() {
            return Err(format!("入住时间格式非法: {}", check_in).into());
        }
        if parse_hhmm(check_out).is_none() {
            return Err(format!("退房时间格式非法: {}", check_out).into());
        }

        self.set_config_value(config_keys::DEFAULT_CHECK_IN_TIME, check_in.trim())?;
        self.set_config_value(config_keys::DEFAULT_CHECK_OUT_TIME, check_out.trim())?;
        Ok(())
    }
}
