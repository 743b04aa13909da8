// ==========================================
// 技师排班系统 - 人员名册领域模型
// ==========================================
// 职责: 技师 (Technician) 与不可用登记 (Occurrence)
// 红线: 引擎只读名册, 名册由外部 (RosterApi) 维护
// ==========================================

use crate::domain::types::{Shift, Unit, WorkloadClass};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Technician - 技师
// ==========================================
// 姓名唯一 (大小写不敏感)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub id: String,
    pub name: String,

    // ===== 单位资格 =====
    pub upa: bool,
    pub hob: bool,

    // ===== 班次资格 =====
    pub dia: bool,
    pub noite: bool,

    // ===== 工时类别 =====
    pub workload: WorkloadClass,
}

impl Technician {
    /// 新建技师: 默认 UPA + 白夜两班
    pub fn new(name: &str, workload: WorkloadClass) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: normalize_name(name),
            upa: true,
            hob: false,
            dia: true,
            noite: true,
            workload,
        }
    }

    pub fn serves_unit(&self, unit: Unit) -> bool {
        match unit {
            Unit::Upa => self.upa,
            Unit::Hob => self.hob,
        }
    }

    pub fn serves_shift(&self, shift: Shift) -> bool {
        match shift {
            Shift::Dia => self.dia,
            Shift::Noite => self.noite,
        }
    }

    /// 姓名精确匹配 (规范化 + 大小写不敏感)
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == normalize_name(name).to_lowercase()
    }
}

// ==========================================
// Occurrence - 不可用登记 (请假/培训等)
// ==========================================
// 日期区间两端均包含; 同一技师允许重叠, 不合并
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: String,
    pub technician_id: String,
    pub kind: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Occurrence {
    pub fn new(technician_id: &str, kind: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            technician_id: technician_id.to_string(),
            kind: normalize_name(kind),
            start_date,
            end_date,
        }
    }

    /// 日期是否落在区间内 (两端包含)
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// 姓名规范化: 去首尾空白, 连续空白折叠为单个空格
pub fn normalize_name(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Ana   Maria  "), "Ana Maria");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_name_matches_case_insensitive() {
        let t = Technician::new("Ana Maria", WorkloadClass::H40);
        assert!(t.name_matches("ana  maria"));
        assert!(t.name_matches(" ANA MARIA "));
        assert!(!t.name_matches("ana"));
    }

    #[test]
    fn test_occurrence_covers_inclusive_bounds() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
        let occ = Occurrence::new("T1", "Férias", d(10), d(12));
        assert!(!occ.covers(d(9)));
        assert!(occ.covers(d(10)));
        assert!(occ.covers(d(12)));
        assert!(!occ.covers(d(13)));
    }

    #[test]
    fn test_default_capabilities() {
        let t = Technician::new("João", WorkloadClass::H30);
        assert!(t.serves_unit(Unit::Upa));
        assert!(!t.serves_unit(Unit::Hob));
        assert!(t.serves_shift(Shift::Dia));
        assert!(t.serves_shift(Shift::Noite));
    }
}
