// ==========================================
// 技师排班系统 - 排班 API
// ==========================================
// 职责: 可用性查询 / 手工分配 / 自动分配 / 月度记录访问 / 汇总与导出
// 红线: 每次变更操作经 StateRepository::transact 保存; 失败不改变状态
// 说明: 读取未物化的月份时先物化 (首次访问冻结科室快照)
// ==========================================

use serde::Serialize;
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::month::{MonthRecord, Slot};
use crate::domain::roster::Technician;
use crate::domain::schedule::{ScheduleId, Sector};
use crate::domain::types::{AutoFillMode, CoverageKind, YearMonth};
use crate::engine::{
    csv_file_name, display_days, monthly_summary, AssignOutcome, AutoAssigner,
    AutoDistributionReport, AvailabilityEngine, EngineError, ExportMatrix, ManualAssignRequest,
    ManualAssignmentGate, ScheduleSummary,
};
use crate::i18n;
use crate::repository::document::RosterState;
use crate::repository::state_repo::{lock_repository, SharedStateRepository, StateRepository};

// ==========================================
// 视图结构
// ==========================================

/// 科室某日的格子
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorSlots {
    pub sector: Sector,
    pub slots: Vec<Slot>,
}

/// 单日视图 (科室按快照顺序)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayView {
    pub day: u32,
    pub sectors: Vec<SectorSlots>,
}

/// CSV 导出结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

// ==========================================
// ScheduleApi - 排班 API
// ==========================================
pub struct ScheduleApi {
    repo: SharedStateRepository,
    gate: ManualAssignmentGate,
    assigner: AutoAssigner,
}

impl ScheduleApi {
    pub fn new(repo: SharedStateRepository) -> Self {
        Self {
            repo,
            gate: ManualAssignmentGate::new(),
            assigner: AutoAssigner::new(),
        }
    }

    // ==========================================
    // 可用性查询
    // ==========================================

    /// 当日可参与轮转的技师 (名册顺序)
    pub fn list_eligible(
        &self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
    ) -> ApiResult<Vec<Technician>> {
        validate_day(ym, day)?;
        let repo = lock_repository(&self.repo)?;
        let engine = AvailabilityEngine::new(repo.state());
        Ok(engine
            .list_eligible(schedule_id, ym, day)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn can_assign(
        &self,
        technician_id: &str,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
        coverage: CoverageKind,
    ) -> ApiResult<bool> {
        validate_day(ym, day)?;
        let repo = lock_repository(&self.repo)?;
        let state = repo.state();
        if state.technician(technician_id).is_none() {
            return Err(ApiError::not_found("Technician", technician_id));
        }
        Ok(AvailabilityEngine::new(state).can_assign(technician_id, schedule_id, ym, day, coverage))
    }

    pub fn violates_fatigue_cycle(
        &self,
        technician_id: &str,
        ym: YearMonth,
        day: u32,
    ) -> ApiResult<bool> {
        validate_day(ym, day)?;
        let repo = lock_repository(&self.repo)?;
        let state = repo.state();
        let technician = state
            .technician(technician_id)
            .ok_or_else(|| ApiError::not_found("Technician", technician_id))?;
        Ok(AvailabilityEngine::new(state).violates_fatigue_cycle(technician, ym, day))
    }

    /// 手工分配候选 (资格 + 可用 + 不重复, 按姓名排序)
    pub fn manual_candidates(
        &self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
        coverage: CoverageKind,
    ) -> ApiResult<Vec<Technician>> {
        validate_day(ym, day)?;
        let repo = lock_repository(&self.repo)?;
        Ok(AvailabilityEngine::new(repo.state())
            .manual_candidates(schedule_id, ym, day, coverage)
            .into_iter()
            .cloned()
            .collect())
    }

    // ==========================================
    // 手工分配
    // ==========================================

    /// 手工分配 (两阶段: 首次可能返回 FatigueWarning, 确认后重新提交)
    #[instrument(skip(self, request), fields(schedule_id = %request.schedule_id, ym = %request.ym, day = request.day))]
    pub fn manual_assign(&self, request: &ManualAssignRequest) -> ApiResult<AssignOutcome> {
        let mut repo = lock_repository(&self.repo)?;
        let gate = self.gate;
        repo.transact(|state, _| gate.assign(state, request).map_err(ApiError::from))
    }

    /// 清空单个格子
    pub fn manual_clear(
        &self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
        sector_id: &str,
        slot_index: usize,
    ) -> ApiResult<()> {
        let mut repo = lock_repository(&self.repo)?;
        let gate = self.gate;
        repo.transact(|state, _| {
            gate.clear_slot(state, schedule_id, ym, day, sector_id, slot_index)
                .map_err(ApiError::from)
        })
    }

    /// 清空某科室当日全部格子
    pub fn clear_sector_day(
        &self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
        sector_id: &str,
    ) -> ApiResult<usize> {
        let mut repo = lock_repository(&self.repo)?;
        let gate = self.gate;
        repo.transact(|state, _| {
            gate.clear_sector_day(state, schedule_id, ym, day, sector_id)
                .map_err(ApiError::from)
        })
    }

    // ==========================================
    // 自动分配
    // ==========================================

    pub fn run_auto_distribution(
        &self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        target_days: &[u32],
        mode: AutoFillMode,
    ) -> ApiResult<AutoDistributionReport> {
        let mut repo = lock_repository(&self.repo)?;
        let assigner = self.assigner;
        let report = repo.transact(|state, _| {
            assigner
                .run(state, schedule_id, ym, target_days, mode)
                .map_err(ApiError::from)
        })?;
        info!(
            schedule_id = %schedule_id,
            ym = %ym,
            filled = report.slots_filled,
            final_pointer = report.final_pointer,
            "自动分配已保存"
        );
        Ok(report)
    }

    /// 对展示日期自动分配
    pub fn run_auto_distribution_on_display_days(
        &self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        mode: AutoFillMode,
    ) -> ApiResult<AutoDistributionReport> {
        let mut repo = lock_repository(&self.repo)?;
        let assigner = self.assigner;
        repo.transact(|state, config| {
            let days = {
                let record = ensure_record(state, schedule_id, ym);
                display_days(record, ym, config.display_default_days)
            };
            assigner
                .run(state, schedule_id, ym, &days, mode)
                .map_err(ApiError::from)
        })
    }

    // ==========================================
    // 月度记录
    // ==========================================

    /// 重置月份: 重新快照科室, 清空选中日期与格子, 指针归零
    #[instrument(skip(self))]
    pub fn reset_month(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<MonthRecord> {
        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, _| {
            let template = state.template_sectors(schedule_id).to_vec();
            Ok::<_, ApiError>(state.months.reset(schedule_id, ym, &template).clone())
        })
    }

    /// 月度记录快照
    pub fn month_record(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<MonthRecord> {
        self.read_month(schedule_id, ym, |_, _, record| record.clone())
    }

    pub fn sector_snapshot(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<Vec<Sector>> {
        self.read_month(schedule_id, ym, |_, _, record| record.sector_snapshot().to_vec())
    }

    pub fn selected_days(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<Vec<u32>> {
        self.read_month(schedule_id, ym, |_, _, record| record.selected_days().to_vec())
    }

    pub fn rotation_pointer(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<usize> {
        self.read_month(schedule_id, ym, |_, _, record| record.rotation_pointer())
    }

    /// 展示日期 (选中日期, 或月初默认天数)
    pub fn display_days(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<Vec<u32>> {
        self.read_month(schedule_id, ym, |repo, _, record| {
            display_days(record, ym, repo.config().display_default_days)
        })
    }

    /// 单日视图
    pub fn day_view(&self, schedule_id: ScheduleId, ym: YearMonth, day: u32) -> ApiResult<DayView> {
        validate_day(ym, day)?;
        self.read_month(schedule_id, ym, |_, _, record| build_day_view(record, day))
    }

    /// 整月格子 (每日按快照科室补齐)
    pub fn slot_grid(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<Vec<DayView>> {
        self.read_month(schedule_id, ym, |_, _, record| {
            ym.all_days()
                .into_iter()
                .map(|day| build_day_view(record, day))
                .collect()
        })
    }

    // ==========================================
    // 日期选择
    // ==========================================

    /// 切换某日的选中状态, 返回切换后的选中日期
    pub fn toggle_day(&self, schedule_id: ScheduleId, ym: YearMonth, day: u32) -> ApiResult<Vec<u32>> {
        validate_day(ym, day)?;
        self.update_selection(schedule_id, ym, |current| {
            let mut days = current.to_vec();
            match days.iter().position(|d| *d == day) {
                Some(idx) => {
                    days.remove(idx);
                }
                None => days.push(day),
            }
            days
        })
    }

    pub fn select_whole_month(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<Vec<u32>> {
        self.update_selection(schedule_id, ym, |_| ym.all_days())
    }

    pub fn clear_selected_days(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<Vec<u32>> {
        self.update_selection(schedule_id, ym, |_| Vec::new())
    }

    // ==========================================
    // 汇总与导出
    // ==========================================

    /// 四套排班的月度汇总
    pub fn monthly_summary(&self, ym: YearMonth) -> ApiResult<Vec<ScheduleSummary>> {
        let mut repo = lock_repository(&self.repo)?;
        for schedule_id in ScheduleId::ALL {
            materialize_if_missing(&mut *repo, schedule_id, ym)?;
        }
        Ok(monthly_summary(repo.state(), ym))
    }

    /// 导出矩阵 (展示日期 x 科室快照)
    pub fn export_matrix(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<ExportMatrix> {
        let removed = i18n::removed_technician_label();
        self.read_month(schedule_id, ym, |repo, state, record| {
            ExportMatrix::build(state, record, ym, repo.config().display_default_days, &removed)
        })
    }

    /// 导出 CSV (分号分隔)
    pub fn export_csv(&self, schedule_id: ScheduleId, ym: YearMonth) -> ApiResult<CsvExport> {
        let matrix = self.export_matrix(schedule_id, ym)?;
        Ok(CsvExport {
            file_name: csv_file_name(schedule_id, ym),
            content: matrix.to_csv()?,
        })
    }

    // ==========================================
    // 内部工具
    // ==========================================

    fn read_month<T>(
        &self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        read: impl FnOnce(&StateRepository, &RosterState, &MonthRecord) -> T,
    ) -> ApiResult<T> {
        let mut repo = lock_repository(&self.repo)?;
        materialize_if_missing(&mut *repo, schedule_id, ym)?;
        let state = repo.state();
        let record = state.months.get(schedule_id, ym).ok_or_else(|| {
            ApiError::InternalError(format!("月度记录物化失败: {} {}", schedule_id, ym))
        })?;
        Ok(read(&*repo, state, record))
    }

    fn update_selection(
        &self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        update: impl FnOnce(&[u32]) -> Vec<u32>,
    ) -> ApiResult<Vec<u32>> {
        let mut repo = lock_repository(&self.repo)?;
        repo.transact(|state, _| {
            let record = ensure_record(state, schedule_id, ym);
            let days = update(record.selected_days());
            record.set_selected_days(days);
            Ok::<_, ApiError>(record.selected_days().to_vec())
        })
    }
}

fn validate_day(ym: YearMonth, day: u32) -> ApiResult<()> {
    if ym.contains_day(day) {
        Ok(())
    } else {
        Err(EngineError::InvalidDay { ym, day }.into())
    }
}

fn ensure_record(state: &mut RosterState, schedule_id: ScheduleId, ym: YearMonth) -> &mut MonthRecord {
    let template = state.template_sectors(schedule_id).to_vec();
    state.months.ensure(schedule_id, ym, &template).0
}

/// 未物化时物化并保存
fn materialize_if_missing(
    repo: &mut StateRepository,
    schedule_id: ScheduleId,
    ym: YearMonth,
) -> ApiResult<()> {
    if repo.state().months.is_materialized(schedule_id, ym) {
        return Ok(());
    }
    repo.transact(|state, _| {
        ensure_record(state, schedule_id, ym);
        Ok::<_, ApiError>(())
    })
}

fn build_day_view(record: &MonthRecord, day: u32) -> DayView {
    DayView {
        day,
        sectors: record
            .day_view(day)
            .into_iter()
            .map(|(sector, slots)| SectorSlots { sector, slots })
            .collect(),
    }
}
