// ==========================================
// 技师排班系统 - 月度汇总与展示日期
// ==========================================
// 职责: 只读投影, 不修改状态
// ==========================================

use crate::domain::month::MonthRecord;
use crate::domain::schedule::ScheduleId;
use crate::domain::types::{WorkloadClass, YearMonth};
use crate::repository::document::RosterState;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 展示日期: 选中日期 (过滤到月内并升序); 未选中时为月初若干天
pub fn display_days(record: &MonthRecord, ym: YearMonth, default_days: u32) -> Vec<u32> {
    let mut days: Vec<u32> = record
        .selected_days()
        .iter()
        .copied()
        .filter(|d| ym.contains_day(*d))
        .collect();
    if days.is_empty() {
        return (1..=default_days).filter(|d| ym.contains_day(*d)).collect();
    }
    days.sort_unstable();
    days
}

// ==========================================
// 月度汇总
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub technician_id: String,
    pub name: String,
    pub workload: WorkloadClass,
    /// 当月在该排班出现的天数 (同日多个科室只计 1 天)
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    pub schedule_id: ScheduleId,
    pub schedule_name: String,
    pub rows: Vec<SummaryRow>,
}

/// 单个排班的月度汇总
///
/// 已删除技师 (悬空 id) 不计入; 按姓名排序
pub fn schedule_summary(state: &RosterState, schedule_id: ScheduleId, ym: YearMonth) -> ScheduleSummary {
    let mut worked: BTreeMap<&str, BTreeSet<u32>> = BTreeMap::new();
    if let Some(record) = state.months.get(schedule_id, ym) {
        for day in ym.all_days() {
            for slot in record.occupied_on(day) {
                if let Some(id) = slot.technician_id.as_deref() {
                    worked.entry(id).or_default().insert(day);
                }
            }
        }
    }

    let mut rows: Vec<SummaryRow> = worked
        .into_iter()
        .filter_map(|(id, days)| {
            state.technician(id).map(|t| SummaryRow {
                technician_id: t.id.clone(),
                name: t.name.clone(),
                workload: t.workload,
                days: days.len(),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    ScheduleSummary {
        schedule_id,
        schedule_name: schedule_id.definition().name.to_string(),
        rows,
    }
}

/// 四套排班的月度汇总 (固定顺序)
pub fn monthly_summary(state: &RosterState, ym: YearMonth) -> Vec<ScheduleSummary> {
    ScheduleId::ALL
        .iter()
        .map(|id| schedule_summary(state, *id, ym))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::roster::Technician;
    use crate::domain::schedule::Sector;
    use crate::domain::types::CoverageKind;

    fn ym() -> YearMonth {
        YearMonth::new(2026, 2).unwrap()
    }

    #[test]
    fn test_display_days() {
        let mut record = MonthRecord::default();
        assert_eq!(display_days(&record, ym(), 3), vec![1, 2, 3]);

        record.set_selected_days(vec![30, 14, 2]);
        assert_eq!(display_days(&record, ym(), 3), vec![2, 14]);
    }

    #[test]
    fn test_summary_counts_distinct_days() {
        let mut state = RosterState::from_config(&EngineConfig::default());
        let zeca = Technician::new("Zeca", WorkloadClass::H40);
        let ana = Technician::new("ana", WorkloadClass::H30);
        let (zeca_id, ana_id) = (zeca.id.clone(), ana.id.clone());
        state.technicians.extend([zeca, ana]);

        let a = Sector::new("A", 1);
        let b = Sector::new("B", 1);
        let (record, _) = state
            .months
            .ensure(ScheduleId::HobDia, ym(), &[a.clone(), b.clone()]);
        record.slots_mut(1, &a)[0].occupy(&zeca_id, CoverageKind::Normal);
        record.slots_mut(1, &b)[0].occupy(&zeca_id, CoverageKind::Extra);
        record.slots_mut(3, &a)[0].occupy(&zeca_id, CoverageKind::Normal);
        record.slots_mut(3, &b)[0].occupy(&ana_id, CoverageKind::Normal);
        record.slots_mut(5, &b)[0].occupy("gone", CoverageKind::Normal);

        let summary = schedule_summary(&state, ScheduleId::HobDia, ym());
        assert_eq!(summary.schedule_name, "HOB DIA");
        let rows: Vec<(&str, usize)> = summary.rows.iter().map(|r| (r.name.as_str(), r.days)).collect();
        assert_eq!(rows, vec![("ana", 1), ("Zeca", 2)]);

        let all = monthly_summary(&state, ym());
        assert_eq!(all.len(), 4);
        assert!(all[0].rows.is_empty());
    }
}
