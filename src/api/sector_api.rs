// ==========================================
// 技师排班系统 - 科室模板 API
// ==========================================
// 职责: 四套排班的科室模板维护
// 红线: 只修改模板; 已物化月份的科室快照不受影响 (重置月份才重新快照)
// ==========================================

use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::sector_label::parse_sector_label;
use crate::domain::schedule::{ScheduleId, ScheduleTemplate, Sector, MAX_REQUIRED_COUNT, MIN_REQUIRED_COUNT};
use crate::repository::document::RosterState;
use crate::repository::state_repo::{lock_repository, SharedStateRepository};

/// 新增科室的默认名称前缀 ("Novo setor N")
pub const NEW_SECTOR_PREFIX: &str = "Novo setor";

// ==========================================
// SectorApi - 科室模板 API
// ==========================================
pub struct SectorApi {
    repo: SharedStateRepository,
}

impl SectorApi {
    pub fn new(repo: SharedStateRepository) -> Self {
        Self { repo }
    }

    /// 当前模板科室 (有序)
    pub fn list_sectors(&self, schedule_id: ScheduleId) -> ApiResult<Vec<Sector>> {
        let repo = lock_repository(&self.repo)?;
        Ok(repo.state().template_sectors(schedule_id).to_vec())
    }

    /// 追加科室: 名称 "Novo setor N", 需求 1 人
    #[instrument(skip(self))]
    pub fn add_sector(&self, schedule_id: ScheduleId) -> ApiResult<Sector> {
        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, _| {
            let template = template_mut(state, schedule_id)?;
            let sector = Sector::new(
                format!("{} {}", NEW_SECTOR_PREFIX, template.sectors.len() + 1),
                MIN_REQUIRED_COUNT,
            );
            template.sectors.push(sector.clone());
            info!(sector_id = %sector.id, "新增科室");
            Ok(sector)
        })
    }

    /// 按标签改名: "名称 (n)" 同时更新需求人数; 无括号时人数不变
    #[instrument(skip(self))]
    pub fn rename_sector(
        &self,
        schedule_id: ScheduleId,
        sector_id: &str,
        label: &str,
    ) -> ApiResult<Sector> {
        let parsed = parse_sector_label(label);
        if parsed.name.is_empty() {
            return Err(ApiError::InvalidInput("科室名称不能为空".to_string()));
        }

        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, _| {
            let sector = sector_mut(state, schedule_id, sector_id)?;
            sector.name = parsed.name.clone();
            if let Some(n) = parsed.required_count {
                sector.required_count = n;
            }
            Ok(sector.clone())
        })
    }

    /// 设置需求人数 (夹取到 [1, 12])
    pub fn set_required_count(
        &self,
        schedule_id: ScheduleId,
        sector_id: &str,
        required_count: i64,
    ) -> ApiResult<Sector> {
        let clamped =
            required_count.clamp(i64::from(MIN_REQUIRED_COUNT), i64::from(MAX_REQUIRED_COUNT)) as u32;

        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, _| {
            let sector = sector_mut(state, schedule_id, sector_id)?;
            sector.required_count = clamped;
            Ok(sector.clone())
        })
    }

    #[instrument(skip(self))]
    pub fn remove_sector(&self, schedule_id: ScheduleId, sector_id: &str) -> ApiResult<()> {
        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, _| {
            let template = template_mut(state, schedule_id)?;
            let idx = template
                .sectors
                .iter()
                .position(|s| s.id == sector_id)
                .ok_or_else(|| ApiError::not_found("Sector", sector_id))?;
            template.sectors.remove(idx);
            Ok(())
        })
    }
}

fn template_mut(state: &mut RosterState, schedule_id: ScheduleId) -> ApiResult<&mut ScheduleTemplate> {
    state
        .template_mut(schedule_id)
        .ok_or_else(|| ApiError::not_found("ScheduleTemplate", schedule_id.as_str()))
}

fn sector_mut<'a>(
    state: &'a mut RosterState,
    schedule_id: ScheduleId,
    sector_id: &str,
) -> ApiResult<&'a mut Sector> {
    template_mut(state, schedule_id)?
        .find_sector_mut(sector_id)
        .ok_or_else(|| ApiError::not_found("Sector", sector_id))
}
