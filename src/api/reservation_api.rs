// ==========================================
// 酒店客房预订管理系统 - 预订管理 API
// ==========================================
// 职责: 预订创建/修改/取消/查询, 供前台界面调用
// 说明: 界面侧的可用性预检只作提示;
//       作数的冲突校验由协调器在提交事务内完成
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::SettingsManager;
use crate::domain::reservation::{ReservationHeader, ReservationRoomLine, StayDescriptor};
use crate::engine::booking::BookingCoordinator;
use crate::engine::overlap::OverlapValidator;
use crate::engine::stay_window::StayWindowResolver;
use crate::repository::reservation_repo::ReservationRepository;

// ==========================================
// ReservationApi - 预订管理 API
// ==========================================

/// 预订管理API
///
/// 职责：
/// 1. 预订创建/修改/取消（经协调器原子提交）
/// 2. 预订查询（头+行）
/// 3. 房间可用性预检（提示性质）
pub struct ReservationApi {
    coordinator: Arc<BookingCoordinator>,
    reservation_repo: Arc<ReservationRepository>,
    settings: Arc<SettingsManager>,
}

impl ReservationApi {
    /// 创建新的ReservationApi实例
    pub fn new(
        coordinator: Arc<BookingCoordinator>,
        reservation_repo: Arc<ReservationRepository>,
        settings: Arc<SettingsManager>,
    ) -> Self {
        Self {
            coordinator,
            reservation_repo,
            settings,
        }
    }

    /// 创建预订
    ///
    /// # 参数
    /// - header: 预订头
    /// - lines: 房间行 (至少一行)
    ///
    /// # 返回
    /// - Ok(reservation_id): 创建成功
    /// - Err(ApiError::BookingConflict): 时段冲突, 附冲突详情
    /// - Err(ApiError): 其他校验/存储错误
    pub fn create_reservation(
        &self,
        header: &ReservationHeader,
        lines: &[ReservationRoomLine],
    ) -> ApiResult<String> {
        let config = self
            .settings
            .stay_time_config()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let reservation_id = self.coordinator.create(header, lines, &config)?;
        Ok(reservation_id)
    }

    /// 修改预订 (整单替换房间行)
    pub fn update_reservation(
        &self,
        reservation_id: &str,
        header: &ReservationHeader,
        lines: &[ReservationRoomLine],
    ) -> ApiResult<()> {
        if reservation_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("预订ID不能为空".to_string()));
        }

        let config = self
            .settings
            .stay_time_config()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        self.coordinator
            .update(reservation_id, header, lines, &config)?;
        Ok(())
    }

    /// 取消预订 (头+全部房间行一并删除)
    pub fn cancel_reservation(&self, reservation_id: &str) -> ApiResult<()> {
        if reservation_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("预订ID不能为空".to_string()));
        }

        self.coordinator.delete(reservation_id)?;
        Ok(())
    }

    /// 查询预订 (头+行)
    ///
    /// # 返回
    /// - Ok(Some((header, lines))): 找到预订
    /// - Ok(None): 未找到
    pub fn get_reservation(
        &self,
        reservation_id: &str,
    ) -> ApiResult<Option<(ReservationHeader, Vec<ReservationRoomLine>)>> {
        let header = match self.reservation_repo.find_header_by_id(reservation_id)? {
            Some(h) => h,
            None => return Ok(None),
        };

        let lines = self
            .reservation_repo
            .find_lines_by_reservation(reservation_id)?;

        Ok(Some((header, lines)))
    }

    /// 房间可用性预检 (提示性质)
    ///
    /// # 说明
    /// 供表单在提交前给出即时反馈。多窗口并发下该结果到提交时
    /// 可能已失效, 协调器提交时会在事务内重新校验, 以那次为准。
    ///
    /// # 参数
    /// - room_id: 房间ID
    /// - stay: 候选入住描述
    /// - exclude_reservation_id: 编辑场景下排除的自身预订
    ///
    /// # 返回
    /// - Ok(true): 当前数据下该时段可用
    /// - Ok(false): 当前数据下该时段已被占用
    pub fn check_room_free(
        &self,
        room_id: &str,
        stay: &StayDescriptor,
        exclude_reservation_id: Option<&str>,
    ) -> ApiResult<bool> {
        if room_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("房间ID不能为空".to_string()));
        }

        let config = self
            .settings
            .stay_time_config()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let candidate = StayWindowResolver::resolve(stay, &config)?;

        let headers = self.reservation_repo.list_headers()?;
        let lines = self.reservation_repo.list_lines()?;
        let facts = OverlapValidator::collect_occupancy_facts(&headers, &lines, &config);

        Ok(OverlapValidator::has_conflict(&candidate, room_id, &facts, exclude_reservation_id)
            .is_none())
    }
}
