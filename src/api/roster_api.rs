// ==========================================
// 技师排班系统 - 名册 API
// ==========================================
// 职责: 技师维护 / 不可用登记维护 / 姓名检索
// 说明: 删除技师级联删除其不可用登记; 格子中的技师 id 保留 (悬空)
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::roster::{normalize_name, Occurrence, Technician};
use crate::domain::types::WorkloadClass;
use crate::repository::state_repo::{lock_repository, SharedStateRepository};

/// 技师资格/工时的部分更新 (None 表示不变)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicianUpdate {
    pub upa: Option<bool>,
    pub hob: Option<bool>,
    pub dia: Option<bool>,
    pub noite: Option<bool>,
    pub workload: Option<WorkloadClass>,
}

// ==========================================
// RosterApi - 名册 API
// ==========================================
pub struct RosterApi {
    repo: SharedStateRepository,
}

impl RosterApi {
    pub fn new(repo: SharedStateRepository) -> Self {
        Self { repo }
    }

    // ==========================================
    // 技师
    // ==========================================

    /// 名册 (插入顺序)
    pub fn list_technicians(&self) -> ApiResult<Vec<Technician>> {
        let repo = lock_repository(&self.repo)?;
        Ok(repo.state().technicians.clone())
    }

    pub fn get_technician(&self, technician_id: &str) -> ApiResult<Technician> {
        let repo = lock_repository(&self.repo)?;
        repo.state()
            .technician(technician_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Technician", technician_id))
    }

    /// 姓名模糊检索 (规范化 + 大小写不敏感的包含匹配)
    pub fn search_technicians(&self, query: &str) -> ApiResult<Vec<Technician>> {
        let needle = normalize_name(query).to_lowercase();
        let repo = lock_repository(&self.repo)?;
        Ok(repo
            .state()
            .technicians
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    /// 新增技师
    ///
    /// # 参数
    /// - workload: "30" 为 30h, 其余值为 40h; None 时使用配置默认值
    ///
    /// # 返回
    /// 新技师 (默认 UPA + 白夜两班)
    #[instrument(skip(self))]
    pub fn add_technician(&self, name: &str, workload: Option<&str>) -> ApiResult<Technician> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(ApiError::EmptyName);
        }

        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, config| {
            if state.find_technician_by_name(&name).is_some() {
                return Err(ApiError::DuplicateTechnicianName(name.clone()));
            }
            let workload = workload
                .map(WorkloadClass::parse_lenient)
                .unwrap_or(config.default_workload);
            let technician = Technician::new(&name, workload);
            state.technicians.push(technician.clone());
            info!(technician_id = %technician.id, workload = %workload, "新增技师");
            Ok(technician)
        })
    }

    /// 更新资格/工时
    pub fn update_technician(
        &self,
        technician_id: &str,
        update: &TechnicianUpdate,
    ) -> ApiResult<Technician> {
        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, _| {
            let technician = state
                .technician_mut(technician_id)
                .ok_or_else(|| ApiError::not_found("Technician", technician_id))?;
            if let Some(v) = update.upa {
                technician.upa = v;
            }
            if let Some(v) = update.hob {
                technician.hob = v;
            }
            if let Some(v) = update.dia {
                technician.dia = v;
            }
            if let Some(v) = update.noite {
                technician.noite = v;
            }
            if let Some(v) = update.workload {
                technician.workload = v;
            }
            Ok(technician.clone())
        })
    }

    /// 删除技师 (级联删除不可用登记)
    ///
    /// # 返回
    /// 被删除的不可用登记数量
    #[instrument(skip(self))]
    pub fn remove_technician(&self, technician_id: &str) -> ApiResult<usize> {
        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, _| {
            let idx = state
                .technicians
                .iter()
                .position(|t| t.id == technician_id)
                .ok_or_else(|| ApiError::not_found("Technician", technician_id))?;
            state.technicians.remove(idx);

            let before = state.occurrences.len();
            state.occurrences.retain(|o| o.technician_id != technician_id);
            let removed = before - state.occurrences.len();
            info!(removed_occurrences = removed, "删除技师");
            Ok(removed)
        })
    }

    // ==========================================
    // 不可用登记
    // ==========================================

    /// 不可用登记 (可按技师过滤)
    pub fn list_occurrences(&self, technician_id: Option<&str>) -> ApiResult<Vec<Occurrence>> {
        let repo = lock_repository(&self.repo)?;
        Ok(repo
            .state()
            .occurrences
            .iter()
            .filter(|o| technician_id.map_or(true, |id| o.technician_id == id))
            .cloned()
            .collect())
    }

    /// 新增不可用登记 (两端日期包含)
    #[instrument(skip(self))]
    pub fn add_occurrence(
        &self,
        technician_id: &str,
        kind: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ApiResult<Occurrence> {
        if normalize_name(kind).is_empty() {
            return Err(ApiError::InvalidInput("登记类型不能为空".to_string()));
        }
        if end_date < start_date {
            return Err(ApiError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, _| {
            if state.technician(technician_id).is_none() {
                return Err(ApiError::not_found("Technician", technician_id));
            }
            let occurrence = Occurrence::new(technician_id, kind, start_date, end_date);
            state.occurrences.push(occurrence.clone());
            Ok(occurrence)
        })
    }

    pub fn remove_occurrence(&self, occurrence_id: &str) -> ApiResult<()> {
        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, _| {
            let idx = state
                .occurrences
                .iter()
                .position(|o| o.id == occurrence_id)
                .ok_or_else(|| ApiError::not_found("Occurrence", occurrence_id))?;
            state.occurrences.remove(idx);
            Ok(())
        })
    }
}
