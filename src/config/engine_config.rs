// ==========================================
// 技师排班系统 - 引擎配置
// ==========================================
// 职责: 默认科室模板、需求人数默认值、显示天数、默认工时
// 来源: 内置默认值, 可被 config_kv (global) 覆写
// ==========================================

use crate::config::sector_label::sector_from_label;
use crate::domain::schedule::{ScheduleId, ScheduleTemplate, Sector};
use crate::domain::types::{Unit, WorkloadClass};
use serde::{Deserialize, Serialize};

/// 持久化文档的应用键
pub const DEFAULT_APP_KEY: &str = "escala_web_final_v1";

/// 标签未带 "(n)" 时的默认需求人数
pub const DEFAULT_REQUIRED_COUNT: u32 = 4;

/// 未选择日期时默认显示的天数 (从 1 号起)
pub const DEFAULT_DISPLAY_DAYS: u32 = 3;

const DEFAULT_SECTORS_UPA: [&str; 15] = [
    "SALA DE EMERGÊNCIA - LEITO 1-2 (4)",
    "SALA DE EMERGÊNCIA - LEITO 3-4 (4)",
    "SALA DE EMERGÊNCIA - LEITO 5-6 (4)",
    "SALA DE EMERGÊNCIA - LEITO 7-8 (4)",
    "FLUXISTA (1)",
    "FAST (1)",
    "MEDICAÇÃO (2)",
    "UDC (2)",
    "MACAS (2)",
    "AMARELINHA ISOLADO (2)",
    "AMARELA GRANDE - LEITO 1-5 (4)",
    "AMARELA GRANDE - LEITO 6-9 (4)",
    "AMARELA GRANDE - LEITO 10-14 (4)",
    "AMARELA GRANDE - LEITO 15-18 (4)",
    "MATERIAL (1)",
];

const DEFAULT_SECTORS_HOB: [&str; 11] = [
    "SALA DE EMERGÊNCIA - LEITO 1-2 (4)",
    "SALA DE EMERGÊNCIA - LEITO 3-4 (4)",
    "SALA DE EMERGÊNCIA - LEITO 5-6 (4)",
    "SALA DE EMERGÊNCIA - LEITO 7-8 (4)",
    "CORREDOR (4)",
    "VASCULAR (2)",
    "FLUXISTA P.S (1)",
    "UPP (1)",
    "OBSERVAÇÃO TRAUMA (2)",
    "FLUXISTA EXT/DV (1)",
    "ORTOPEDIA (1)",
];

// ==========================================
// EngineConfig - 引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 持久化文档的应用键
    pub app_key: String,
    /// UPA 默认科室标签 ("名称 (n)")
    pub default_sectors_upa: Vec<String>,
    /// HOB 默认科室标签
    pub default_sectors_hob: Vec<String>,
    /// 标签缺省需求人数
    pub default_required_count: u32,
    /// 默认显示天数
    pub display_default_days: u32,
    /// 新增技师默认工时
    pub default_workload: WorkloadClass,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_key: DEFAULT_APP_KEY.to_string(),
            default_sectors_upa: DEFAULT_SECTORS_UPA.iter().map(|s| s.to_string()).collect(),
            default_sectors_hob: DEFAULT_SECTORS_HOB.iter().map(|s| s.to_string()).collect(),
            default_required_count: DEFAULT_REQUIRED_COUNT,
            display_default_days: DEFAULT_DISPLAY_DAYS,
            default_workload: WorkloadClass::H40,
        }
    }
}

impl EngineConfig {
    /// 按单位取默认科室标签
    pub fn default_sector_labels(&self, unit: Unit) -> &[String] {
        match unit {
            Unit::Upa => &self.default_sectors_upa,
            Unit::Hob => &self.default_sectors_hob,
        }
    }

    /// 解析默认标签生成科室列表
    pub fn default_sectors(&self, unit: Unit) -> Vec<Sector> {
        self.default_sector_labels(unit)
            .iter()
            .map(|label| sector_from_label(label, self.default_required_count))
            .collect()
    }

    /// 四套排班的默认模板
    pub fn default_templates(&self) -> Vec<ScheduleTemplate> {
        ScheduleId::ALL
            .iter()
            .map(|id| ScheduleTemplate::new(*id, self.default_sectors(id.unit())))
            .collect()
    }
}
