// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持葡萄牙语 pt-BR (默认) 和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::engine::error::EngineError;

/// 默认语言
pub const DEFAULT_LOCALE: &str = "pt-BR";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"pt-BR" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use escala_tecnicos::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use escala_tecnicos::i18n::t_with_args;
/// let msg = t_with_args("errors.invalid_day", &[("day", "31"), ("ym", "2026-02")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 悬空技师的显示文本
pub fn removed_technician_label() -> String {
    t("render.removed_technician")
}

/// 疲劳周期确认提示
pub fn fatigue_warning(name: &str, workload: &str) -> String {
    t_with_args("warnings.fatigue", &[("name", name), ("workload", workload)])
}

/// 引擎错误的本地化文案
pub fn engine_error_message(err: &EngineError) -> String {
    match err {
        EngineError::NotRegistered { reference } => {
            t_with_args("errors.not_registered", &[("reference", reference)])
        }
        EngineError::Unavailable { date, .. } => {
            t_with_args("errors.unavailable", &[("date", &date.to_string())])
        }
        EngineError::Ineligible { schedule_id, .. } => t_with_args(
            "errors.ineligible",
            &[("schedule", schedule_id.definition().name)],
        ),
        EngineError::Duplicate { coverage, .. } => match coverage {
            crate::domain::types::CoverageKind::Normal => t("errors.duplicate_normal"),
            crate::domain::types::CoverageKind::Extra => t("errors.duplicate_extra"),
        },
        EngineError::NoCapacity { day, .. } => {
            t_with_args("errors.no_capacity", &[("day", &day.to_string())])
        }
        EngineError::NothingToDo { .. } => t("errors.nothing_to_do"),
        EngineError::UnknownSector { sector_id, .. } => {
            t_with_args("errors.unknown_sector", &[("sector", sector_id)])
        }
        EngineError::InvalidDay { ym, day } => t_with_args(
            "errors.invalid_day",
            &[("day", &day.to_string()), ("ym", &ym.to_string())],
        ),
        EngineError::InvalidSlot {
            index, capacity, ..
        } => t_with_args(
            "errors.invalid_slot",
            &[("index", &index.to_string()), ("capacity", &capacity.to_string())],
        ),
    }
}
