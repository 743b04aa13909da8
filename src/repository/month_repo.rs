// ==========================================
// 技师排班系统 - 月度记录仓储 (Month Snapshot Manager)
// ==========================================
// 职责: 以 (排班, 年月) 为键管理月度记录
// 红线: 首次访问时冻结科室快照; 只有 reset 才重新快照
// 说明: 读取接口返回引用/值快照, 变更只经显式接口
// ==========================================

use crate::domain::month::{MonthRecord, Slot};
use crate::domain::schedule::{ScheduleId, Sector};
use crate::domain::types::{CoverageKind, Shift, YearMonth};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// 跨排班的既有分配 (某技师某日)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExistingAssignment {
    pub schedule_id: ScheduleId,
    pub shift: Shift,
    pub coverage: CoverageKind,
}

// ==========================================
// MonthRepository - 月度记录仓储
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthRepository {
    records: BTreeMap<ScheduleId, BTreeMap<YearMonth, MonthRecord>>,
}

impl MonthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 查询月度记录 (未物化返回 None, 不创建)
    pub fn get(&self, schedule_id: ScheduleId, ym: YearMonth) -> Option<&MonthRecord> {
        self.records.get(&schedule_id).and_then(|m| m.get(&ym))
    }

    /// 值快照
    pub fn snapshot(&self, schedule_id: ScheduleId, ym: YearMonth) -> Option<MonthRecord> {
        self.get(schedule_id, ym).cloned()
    }

    pub fn is_materialized(&self, schedule_id: ScheduleId, ym: YearMonth) -> bool {
        self.get(schedule_id, ym).is_some()
    }

    /// 扫描四套排班某日的全部已占用格子
    ///
    /// 每次调用重新计算, 不做缓存; 未物化的月份不贡献任何分配
    pub fn assignments_on(
        &self,
        ym: YearMonth,
        day: u32,
    ) -> HashMap<String, Vec<ExistingAssignment>> {
        let mut result: HashMap<String, Vec<ExistingAssignment>> = HashMap::new();
        for schedule_id in ScheduleId::ALL {
            let Some(record) = self.get(schedule_id, ym) else {
                continue;
            };
            for slot in record.occupied_on(day) {
                if let Some(tech_id) = &slot.technician_id {
                    result.entry(tech_id.clone()).or_default().push(ExistingAssignment {
                        schedule_id,
                        shift: schedule_id.shift(),
                        coverage: slot.coverage,
                    });
                }
            }
        }
        result
    }

    /// 技师某日是否在任一排班出现
    ///
    /// day 为 0 或越界 (月初之前) 一律视为未上班, 不跨月回看
    pub fn worked_on(&self, technician_id: &str, ym: YearMonth, day: i64) -> bool {
        if day < 1 || day > ym.days_in_month() as i64 {
            return false;
        }
        let day = day as u32;
        ScheduleId::ALL.iter().any(|schedule_id| {
            self.get(*schedule_id, ym)
                .map(|r| r.works_on(technician_id, day))
                .unwrap_or(false)
        })
    }

    // ==========================================
    // 变更
    // ==========================================

    /// 取得月度记录, 不存在时以模板深拷贝物化
    ///
    /// # 返回
    /// (记录, 是否新建)
    pub fn ensure(
        &mut self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        template: &[Sector],
    ) -> (&mut MonthRecord, bool) {
        let months = self.records.entry(schedule_id).or_default();
        let created = !months.contains_key(&ym);
        if created {
            debug!(schedule_id = %schedule_id, ym = %ym, sectors = template.len(), "物化月度记录");
        }
        let record = months
            .entry(ym)
            .or_insert_with(|| MonthRecord::materialize(template));
        (record, created)
    }

    pub fn get_mut(&mut self, schedule_id: ScheduleId, ym: YearMonth) -> Option<&mut MonthRecord> {
        self.records.get_mut(&schedule_id).and_then(|m| m.get_mut(&ym))
    }

    /// 重置月份: 重新快照科室, 清空选中日期, 指针归零, 清空格子
    pub fn reset(
        &mut self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        template: &[Sector],
    ) -> &MonthRecord {
        let months = self.records.entry(schedule_id).or_default();
        months.insert(ym, MonthRecord::materialize(template));
        &months[&ym]
    }

    /// 写入格子 (调用方负责约束校验)
    pub(crate) fn slots_mut(
        &mut self,
        schedule_id: ScheduleId,
        ym: YearMonth,
        day: u32,
        sector: &Sector,
    ) -> Option<&mut Vec<Slot>> {
        self.get_mut(schedule_id, ym)
            .map(|record| record.slots_mut(day, sector))
    }
}
