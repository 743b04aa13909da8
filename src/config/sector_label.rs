// ==========================================
// 技师排班系统 - 科室标签解析 (UI 边界辅助)
// ==========================================
// 格式: "名称 (n)", 末尾括号内为需求人数, 可省略
// 红线: 引擎内部不解析自由文本, 仅在 UI/配置边界使用
// ==========================================

use crate::domain::roster::normalize_name;
use crate::domain::schedule::{clamp_required, Sector};

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorLabel {
    pub name: String,
    /// 标签中显式给出的人数 (已夹取到 [1, 12])
    pub required_count: Option<u32>,
}

/// 解析科室标签
///
/// # 示例
/// - "FAST (1)" → name="FAST", required=Some(1)
/// - "CORREDOR" → name="CORREDOR", required=None
/// - "UDC (40)" → required=Some(12)
pub fn parse_sector_label(label: &str) -> SectorLabel {
    let trimmed = label.trim();
    if let Some(head) = trimmed.strip_suffix(')') {
        if let Some(open) = head.rfind('(') {
            let digits = &head[open + 1..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                let n = digits.bytes().fold(0u32, |acc, b| {
                    acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
                });
                return SectorLabel {
                    name: normalize_name(&head[..open]),
                    required_count: Some(clamp_required(n)),
                };
            }
        }
    }
    SectorLabel {
        name: normalize_name(trimmed),
        required_count: None,
    }
}

/// 由标签生成科室 (缺省人数使用 default_required)
pub fn sector_from_label(label: &str, default_required: u32) -> Sector {
    let parsed = parse_sector_label(label);
    Sector::new(
        parsed.name,
        parsed.required_count.unwrap_or(default_required),
    )
}

/// 渲染为 "名称 (n)"
pub fn format_sector_label(sector: &Sector) -> String {
    format!("{} ({})", sector.name, sector.required_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_count() {
        let parsed = parse_sector_label("  AMARELA GRANDE - LEITO 1-5   (4) ");
        assert_eq!(parsed.name, "AMARELA GRANDE - LEITO 1-5");
        assert_eq!(parsed.required_count, Some(4));
    }

    #[test]
    fn test_parse_without_count() {
        let parsed = parse_sector_label("CORREDOR");
        assert_eq!(parsed.name, "CORREDOR");
        assert_eq!(parsed.required_count, None);

        // 括号内非数字: 整体作为名称
        let parsed = parse_sector_label("UPP (adulto)");
        assert_eq!(parsed.name, "UPP (adulto)");
        assert_eq!(parsed.required_count, None);
    }

    #[test]
    fn test_parse_clamps_count() {
        assert_eq!(parse_sector_label("X (0)").required_count, Some(1));
        assert_eq!(parse_sector_label("X (99999999999999)").required_count, Some(12));
    }

    #[test]
    fn test_sector_from_label_default() {
        let sector = sector_from_label("VASCULAR", 4);
        assert_eq!(sector.required_count, 4);
        assert_eq!(format_sector_label(&sector), "VASCULAR (4)");
    }
}
