// ==========================================
// 酒店客房预订管理系统 - 房态管理 API
// ==========================================
// 职责: 房态对账的触发与落库, 人工房态设置
// 红线: OCCUPIED 由对账推导, 不允许人工直接设置;
//       对账由调用方按需触发 (如界面加载时), 本核心不自带时钟循环
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::SettingsManager;
use crate::domain::types::RoomStatus;
use crate::engine::room_state::{RoomStateReconciler, RoomStatusChange};
use crate::repository::reservation_repo::ReservationRepository;
use crate::repository::room_repo::RoomRepository;

// ==========================================
// RoomStatusApi - 房态管理 API
// ==========================================

/// 房态管理API
///
/// 职责：
/// 1. 触发房态对账并写回变更
/// 2. 人工房态设置（打扫中/停用维修/恢复可售）
pub struct RoomStatusApi {
    room_repo: Arc<RoomRepository>,
    reservation_repo: Arc<ReservationRepository>,
    settings: Arc<SettingsManager>,
}

impl RoomStatusApi {
    /// 创建新的RoomStatusApi实例
    pub fn new(
        room_repo: Arc<RoomRepository>,
        reservation_repo: Arc<ReservationRepository>,
        settings: Arc<SettingsManager>,
    ) -> Self {
        Self {
            room_repo,
            reservation_repo,
            settings,
        }
    }

    /// 对账并落库
    ///
    /// # 参数
    /// - now: 当前时刻 (由调用方传入, 便于测试与避免时钟歧义)
    ///
    /// # 返回
    /// - Ok(Vec<RoomStatusChange>): 实际发生变更的房间列表
    ///
    /// # 幂等性
    /// 数据无变化时重复调用, 第二次返回空列表且不产生任何写入
    pub fn refresh_room_statuses(&self, now: NaiveDateTime) -> ApiResult<Vec<RoomStatusChange>> {
        let config = self
            .settings
            .stay_time_config()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let rooms = self.room_repo.list_all()?;
        let headers = self.reservation_repo.list_headers()?;
        let lines = self.reservation_repo.list_lines()?;

        let changes = RoomStateReconciler::reconcile(&rooms, &headers, &lines, &config, now);

        for change in &changes {
            self.room_repo
                .update_status(&change.room_id, change.new_status, None)?;
            info!(
                "房态对账: room_id={} → {}",
                change.room_id, change.new_status
            );
        }

        Ok(changes)
    }

    /// 人工设置房态
    ///
    /// # 参数
    /// - room_id: 房间ID
    /// - status: 目标房态 (CLEANING / OUT_OF_SERVICE / AVAILABLE)
    /// - note: 设置备注
    ///
    /// # 错误
    /// - ApiError::InvalidInput: 尝试人工设置 OCCUPIED
    /// - ApiError::NotFound: 房间不存在
    pub fn set_operator_status(
        &self,
        room_id: &str,
        status: RoomStatus,
        note: Option<&str>,
    ) -> ApiResult<()> {
        if !status.is_operator_settable() {
            return Err(ApiError::InvalidInput(
                "OCCUPIED由对账推导, 不允许人工直接设置".to_string(),
            ));
        }

        self.room_repo.update_status(room_id, status, note)?;
        info!("人工设置房态: room_id={} → {}", room_id, status);
        Ok(())
    }
}
