// ==========================================
// 技师排班系统 - 月度记录领域模型
// ==========================================
// 职责: (排班, 年月) 维度的科室快照 + 日期格子 + 轮转指针
// 红线: 科室快照首次访问时冻结, 只有显式重置才重新快照
// 红线: 格子长度必须等于科室需求人数 (读取时自愈)
// ==========================================

use crate::domain::schedule::Sector;
use crate::domain::types::CoverageKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Slot - 岗位格子
// ==========================================
// 状态机: EMPTY <-> OCCUPIED(technician_id, coverage)
// technician_id 为弱引用, 技师删除后保留悬空 id
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slot {
    pub technician_id: Option<String>,
    #[serde(default)]
    pub coverage: CoverageKind,
}

impl Slot {
    pub fn is_empty(&self) -> bool {
        self.technician_id.is_none()
    }

    pub fn occupy(&mut self, technician_id: &str, coverage: CoverageKind) {
        self.technician_id = Some(technician_id.to_string());
        self.coverage = coverage;
    }

    /// 清空: 无条件, 覆盖类型复位为 NORMAL
    pub fn clear(&mut self) {
        self.technician_id = None;
        self.coverage = CoverageKind::Normal;
    }
}

/// 单日格子: sector_id -> 有序格子列表
pub type DaySlots = BTreeMap<String, Vec<Slot>>;

// ==========================================
// MonthRecord - 月度记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthRecord {
    pub(crate) sector_snapshot: Vec<Sector>,
    #[serde(default)]
    pub(crate) selected_days: Vec<u32>,
    #[serde(default)]
    pub(crate) rotation_pointer: usize,
    #[serde(default)]
    pub(crate) day_grid: BTreeMap<u32, DaySlots>,
}

impl MonthRecord {
    /// 以模板深拷贝物化新的月度记录
    pub fn materialize(template: &[Sector]) -> Self {
        Self {
            sector_snapshot: template.to_vec(),
            selected_days: Vec::new(),
            rotation_pointer: 0,
            day_grid: BTreeMap::new(),
        }
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn sector_snapshot(&self) -> &[Sector] {
        &self.sector_snapshot
    }

    pub fn find_sector(&self, sector_id: &str) -> Option<&Sector> {
        self.sector_snapshot.iter().find(|s| s.id == sector_id)
    }

    pub fn selected_days(&self) -> &[u32] {
        &self.selected_days
    }

    pub fn rotation_pointer(&self) -> usize {
        self.rotation_pointer
    }

    /// 读取某科室某日的格子 (返回按需求人数补齐/截断后的副本)
    pub fn slots(&self, day: u32, sector: &Sector) -> Vec<Slot> {
        let mut slots = self
            .day_grid
            .get(&day)
            .and_then(|d| d.get(&sector.id))
            .cloned()
            .unwrap_or_default();
        slots.resize_with(sector.capacity(), Slot::default);
        slots
    }

    /// 某日全部科室的格子 (按快照顺序)
    pub fn day_view(&self, day: u32) -> Vec<(Sector, Vec<Slot>)> {
        self.sector_snapshot
            .iter()
            .map(|sector| (sector.clone(), self.slots(day, sector)))
            .collect()
    }

    /// 某日所有已占用格子 (只统计需求人数范围内的格子)
    pub fn occupied_on(&self, day: u32) -> Vec<&Slot> {
        let Some(day_slots) = self.day_grid.get(&day) else {
            return Vec::new();
        };
        self.sector_snapshot
            .iter()
            .filter_map(|sector| {
                day_slots
                    .get(&sector.id)
                    .map(|slots| slots.iter().take(sector.capacity()))
            })
            .flatten()
            .filter(|slot| !slot.is_empty())
            .collect()
    }

    /// 技师当日是否在本排班出现
    pub fn works_on(&self, technician_id: &str, day: u32) -> bool {
        self.occupied_on(day)
            .iter()
            .any(|slot| slot.technician_id.as_deref() == Some(technician_id))
    }

    // ==========================================
    // 变更 (仅供 MonthRepository / 引擎调用)
    // ==========================================

    /// 取得可写格子列表, 就地自愈长度
    pub(crate) fn slots_mut(&mut self, day: u32, sector: &Sector) -> &mut Vec<Slot> {
        let slots = self
            .day_grid
            .entry(day)
            .or_default()
            .entry(sector.id.clone())
            .or_default();
        slots.resize_with(sector.capacity(), Slot::default);
        slots
    }

    /// 清空某日全部科室格子
    pub(crate) fn clear_day(&mut self, day: u32) {
        let sectors = self.sector_snapshot.clone();
        for sector in &sectors {
            self.slots_mut(day, sector).iter_mut().for_each(Slot::clear);
        }
    }

    pub(crate) fn set_rotation_pointer(&mut self, pointer: usize) {
        self.rotation_pointer = pointer;
    }

    /// 设置选中日期 (去重 + 升序)
    pub(crate) fn set_selected_days(&mut self, mut days: Vec<u32>) {
        days.sort_unstable();
        days.dedup();
        self.selected_days = days;
    }
}
