// ==========================================
// 酒店客房预订管理系统 - 配置层
// ==========================================
// 职责: 系统设置管理 (默认入住/退房时间)
// 存储: config_kv 表
// ==========================================

pub mod settings;

// 重导出核心配置类型
pub use settings::{
    config_keys, parse_hhmm, SettingsManager, StayTimeConfig, BUILTIN_CHECK_IN_TIME,
    BUILTIN_CHECK_OUT_TIME,
};
