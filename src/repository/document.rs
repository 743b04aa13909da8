// ==========================================
// 技师排班系统 - 持久化文档
// ==========================================
// 职责: 全量状态 (排班模板/名册/不可用登记/月度记录) 的单一可序列化文档
// 说明: 引擎只关心此处定义的结构, 存储方式由 StateStore 决定
// ==========================================

use crate::config::EngineConfig;
use crate::domain::roster::{Occurrence, Technician};
use crate::domain::schedule::{ScheduleId, ScheduleTemplate, Sector};
use crate::repository::month_repo::MonthRepository;
use serde::{Deserialize, Serialize};

/// 文档格式版本
pub const DOCUMENT_VERSION: u32 = 1;

// ==========================================
// RosterState - 全量状态文档
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterState {
    pub version: u32,
    /// 四套排班的科室模板
    pub templates: Vec<ScheduleTemplate>,
    /// 技师名册 (插入顺序即轮转顺序)
    #[serde(default)]
    pub technicians: Vec<Technician>,
    /// 不可用登记
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
    /// 月度记录: schedule_id -> "YYYY-MM" -> MonthRecord
    #[serde(default)]
    pub months: MonthRepository,
}

impl RosterState {
    /// 默认文档: 四套排班使用配置中的默认科室, 名册为空
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            templates: config.default_templates(),
            technicians: Vec::new(),
            occurrences: Vec::new(),
            months: MonthRepository::new(),
        }
    }

    /// 加载后的结构修复: 保证四套排班模板齐全且顺序固定
    pub fn normalize(&mut self, config: &EngineConfig) {
        let mut templates = Vec::with_capacity(ScheduleId::ALL.len());
        for id in ScheduleId::ALL {
            let existing = self
                .templates
                .iter()
                .position(|t| t.schedule_id == id)
                .map(|idx| self.templates.swap_remove(idx));
            templates.push(existing.unwrap_or_else(|| {
                tracing::warn!(schedule_id = %id, "文档缺少排班模板，使用默认科室补齐");
                ScheduleTemplate::new(id, config.default_sectors(id.unit()))
            }));
        }
        self.templates = templates;
    }

    // ==========================================
    // 模板
    // ==========================================

    pub fn template(&self, schedule_id: ScheduleId) -> Option<&ScheduleTemplate> {
        self.templates.iter().find(|t| t.schedule_id == schedule_id)
    }

    pub fn template_mut(&mut self, schedule_id: ScheduleId) -> Option<&mut ScheduleTemplate> {
        self.templates.iter_mut().find(|t| t.schedule_id == schedule_id)
    }

    /// 当前模板科室 (缺失时为空)
    pub fn template_sectors(&self, schedule_id: ScheduleId) -> &[Sector] {
        self.template(schedule_id)
            .map(|t| t.sectors.as_slice())
            .unwrap_or(&[])
    }

    // ==========================================
    // 名册
    // ==========================================

    pub fn technician(&self, technician_id: &str) -> Option<&Technician> {
        self.technicians.iter().find(|t| t.id == technician_id)
    }

    pub fn technician_mut(&mut self, technician_id: &str) -> Option<&mut Technician> {
        self.technicians.iter_mut().find(|t| t.id == technician_id)
    }

    /// 姓名精确匹配 (规范化 + 大小写不敏感)
    pub fn find_technician_by_name(&self, name: &str) -> Option<&Technician> {
        self.technicians.iter().find(|t| t.name_matches(name))
    }

    pub fn occurrences_of<'a>(&'a self, technician_id: &'a str) -> impl Iterator<Item = &'a Occurrence> + 'a {
        self.occurrences
            .iter()
            .filter(move |o| o.technician_id == technician_id)
    }
}
