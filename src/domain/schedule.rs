// ==========================================
// 技师排班系统 - 排班目录 (Catalog)
// ==========================================
// 职责: 四套固定排班定义 + 科室 (Sector) 模板
// 红线: 排班定义在系统生命周期内不可变, 恰好 4 套
// ==========================================

use crate::domain::types::{Shift, Unit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 科室需求人数下限
pub const MIN_REQUIRED_COUNT: u32 = 1;
/// 科室需求人数上限
pub const MAX_REQUIRED_COUNT: u32 = 12;

// ==========================================
// ScheduleId - 排班标识
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleId {
    UpaDia,
    UpaNoite,
    HobDia,
    HobNoite,
}

impl ScheduleId {
    /// 固定顺序: UPA_DIA, UPA_NOITE, HOB_DIA, HOB_NOITE
    pub const ALL: [ScheduleId; 4] = [
        ScheduleId::UpaDia,
        ScheduleId::UpaNoite,
        ScheduleId::HobDia,
        ScheduleId::HobNoite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleId::UpaDia => "UPA_DIA",
            ScheduleId::UpaNoite => "UPA_NOITE",
            ScheduleId::HobDia => "HOB_DIA",
            ScheduleId::HobNoite => "HOB_NOITE",
        }
    }

    /// 从字符串解析 (大小写不敏感)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "UPA_DIA" => Some(ScheduleId::UpaDia),
            "UPA_NOITE" => Some(ScheduleId::UpaNoite),
            "HOB_DIA" => Some(ScheduleId::HobDia),
            "HOB_NOITE" => Some(ScheduleId::HobNoite),
            _ => None,
        }
    }

    pub fn definition(&self) -> &'static ScheduleDefinition {
        match self {
            ScheduleId::UpaDia => &SCHEDULE_DEFS[0],
            ScheduleId::UpaNoite => &SCHEDULE_DEFS[1],
            ScheduleId::HobDia => &SCHEDULE_DEFS[2],
            ScheduleId::HobNoite => &SCHEDULE_DEFS[3],
        }
    }

    pub fn unit(&self) -> Unit {
        self.definition().unit
    }

    pub fn shift(&self) -> Shift {
        self.definition().shift
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// ScheduleDefinition - 排班定义
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleDefinition {
    pub id: ScheduleId,
    pub name: &'static str,
    pub unit: Unit,
    pub shift: Shift,
}

/// 四套固定排班
pub const SCHEDULE_DEFS: [ScheduleDefinition; 4] = [
    ScheduleDefinition {
        id: ScheduleId::UpaDia,
        name: "UPA DIA",
        unit: Unit::Upa,
        shift: Shift::Dia,
    },
    ScheduleDefinition {
        id: ScheduleId::UpaNoite,
        name: "UPA NOITE",
        unit: Unit::Upa,
        shift: Shift::Noite,
    },
    ScheduleDefinition {
        id: ScheduleId::HobDia,
        name: "HOB DIA",
        unit: Unit::Hob,
        shift: Shift::Dia,
    },
    ScheduleDefinition {
        id: ScheduleId::HobNoite,
        name: "HOB NOITE",
        unit: Unit::Hob,
        shift: Shift::Noite,
    },
];

// ==========================================
// Sector - 科室
// ==========================================
// required_count 取值 [1, 12]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: String,
    pub name: String,
    pub required_count: u32,
}

impl Sector {
    /// 新建科室 (生成 uuid, 需求人数夹取到合法区间)
    pub fn new(name: impl Into<String>, required_count: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: name.into(),
            required_count: clamp_required(required_count),
        }
    }

    /// 需求人数 (读取时再次夹取, 兼容旧文档中的越界值)
    pub fn capacity(&self) -> usize {
        clamp_required(self.required_count) as usize
    }
}

/// 需求人数夹取到 [MIN_REQUIRED_COUNT, MAX_REQUIRED_COUNT]
pub fn clamp_required(n: u32) -> u32 {
    n.clamp(MIN_REQUIRED_COUNT, MAX_REQUIRED_COUNT)
}

// ==========================================
// ScheduleTemplate - 排班的可配置科室模板
// ==========================================
// 修改模板不影响已物化的月份 (月份持有快照)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTemplate {
    pub schedule_id: ScheduleId,
    pub sectors: Vec<Sector>,
}

impl ScheduleTemplate {
    pub fn new(schedule_id: ScheduleId, sectors: Vec<Sector>) -> Self {
        Self {
            schedule_id,
            sectors,
        }
    }

    pub fn find_sector(&self, sector_id: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.id == sector_id)
    }

    pub fn find_sector_mut(&mut self, sector_id: &str) -> Option<&mut Sector> {
        self.sectors.iter_mut().find(|s| s.id == sector_id)
    }
}
