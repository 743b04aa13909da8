// ==========================================
// 技师排班系统 - 领域类型定义
// ==========================================
// 职责: 单位/班次/覆盖类型/工时类别/年月等值类型
// 序列化格式: 与持久化文档一致 (UPA/HOB, DIA/NOITE, NORMAL/EXTRA, "30"/"40")
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 单位 (Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Unit {
    Upa, // 急诊单元
    Hob, // 医院单元
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Upa => write!(f, "UPA"),
            Unit::Hob => write!(f, "HOB"),
        }
    }
}

// ==========================================
// 班次 (Shift)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Dia,   // 白班
    Noite, // 夜班
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Dia => write!(f, "DIA"),
            Shift::Noite => write!(f, "NOITE"),
        }
    }
}

// ==========================================
// 覆盖类型 (Coverage Kind)
// ==========================================
// NORMAL: 当日独占; EXTRA: 仅允许对向班次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageKind {
    #[default]
    Normal,
    Extra,
}

impl fmt::Display for CoverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageKind::Normal => write!(f, "NORMAL"),
            CoverageKind::Extra => write!(f, "EXTRA"),
        }
    }
}

// ==========================================
// 工时类别 (Workload Class)
// ==========================================
// 红线: 40h 工作后休 1 天, 30h 工作后休 2 天
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkloadClass {
    #[serde(rename = "30")]
    H30,
    #[default]
    #[serde(rename = "40")]
    H40,
}

impl WorkloadClass {
    /// 工作一天之后需要的休息天数
    pub fn rest_days(&self) -> u32 {
        match self {
            WorkloadClass::H30 => 2,
            WorkloadClass::H40 => 1,
        }
    }

    /// 宽松解析: "30" 为 30h, 其余一律 40h
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim() == "30" {
            WorkloadClass::H30
        } else {
            WorkloadClass::H40
        }
    }
}

impl fmt::Display for WorkloadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadClass::H30 => write!(f, "30"),
            WorkloadClass::H40 => write!(f, "40"),
        }
    }
}

// ==========================================
// 自动分配模式 (Auto Fill Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoFillMode {
    #[default]
    FillEmpty,    // 只填空位
    ClearAndFill, // 先清空目标日再填
}

impl fmt::Display for AutoFillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoFillMode::FillEmpty => write!(f, "FILL_EMPTY"),
            AutoFillMode::ClearAndFill => write!(f, "CLEAR_AND_FILL"),
        }
    }
}

// ==========================================
// 年月 (Year Month)
// ==========================================
// 序列化格式: "YYYY-MM" (作为文档中的 map key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32, // 1..=12
}

impl YearMonth {
    /// 创建年月, month 取值 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 当月天数
    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .map(|d| d.day())
            .unwrap_or(28)
    }

    pub fn contains_day(&self, day: u32) -> bool {
        day >= 1 && day <= self.days_in_month()
    }

    /// 当月第 day 天的日期 (越界返回 None)
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// 当月全部日期 1..=N
    pub fn all_days(&self) -> Vec<u32> {
        (1..=self.days_in_month()).collect()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("年月格式错误(期望 YYYY-MM): {}", s))?;
        let year: i32 = y.parse().map_err(|_| format!("年份无效: {}", s))?;
        let month: u32 = m.parse().map_err(|_| format!("月份无效: {}", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("年月越界: {}", s))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_days_in_month() {
        assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2025, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2025, 12).unwrap().days_in_month(), 31);
        assert_eq!(YearMonth::new(2025, 4).unwrap().days_in_month(), 30);
    }

    #[test]
    fn test_year_month_parse_and_display() {
        let ym: YearMonth = "2026-03".parse().unwrap();
        assert_eq!(ym.year(), 2026);
        assert_eq!(ym.month(), 3);
        assert_eq!(ym.to_string(), "2026-03");

        assert!("2026-13".parse::<YearMonth>().is_err());
        assert!("202603".parse::<YearMonth>().is_err());
        assert!(YearMonth::new(2026, 0).is_none());
    }

    #[test]
    fn test_year_month_contains_day() {
        let ym = YearMonth::new(2026, 2).unwrap();
        assert!(!ym.contains_day(0));
        assert!(ym.contains_day(28));
        assert!(!ym.contains_day(29));
        assert_eq!(ym.date(29), None);
    }

    #[test]
    fn test_workload_serde_matches_document_format() {
        let json = serde_json::to_string(&WorkloadClass::H30).unwrap();
        assert_eq!(json, "\"30\"");
        let parsed: WorkloadClass = serde_json::from_str("\"40\"").unwrap();
        assert_eq!(parsed, WorkloadClass::H40);
        assert_eq!(WorkloadClass::parse_lenient(" 30 "), WorkloadClass::H30);
        assert_eq!(WorkloadClass::parse_lenient("abc"), WorkloadClass::H40);
    }

    #[test]
    fn test_year_month_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(YearMonth::new(2026, 1).unwrap(), 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2026-01":1}"#);
        let back: std::collections::BTreeMap<YearMonth, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
