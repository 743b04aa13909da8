// ==========================================
// 技师排班系统 - 表格导出
// ==========================================
// 职责: 日期 x 科室 -> 技师姓名 的只读矩阵 + CSV 渲染
// 格式: 表头 "DIA" + 科室名; 日期两位; 多人以 " | " 连接
// CSV: 分号分隔, 仅在必要时加引号
// ==========================================

use crate::domain::month::MonthRecord;
use crate::domain::schedule::ScheduleId;
use crate::domain::types::YearMonth;
use crate::engine::summary::display_days;
use crate::repository::document::RosterState;
use serde::Serialize;
use thiserror::Error;

pub const DAY_COLUMN: &str = "DIA";
pub const NAME_SEPARATOR: &str = " | ";
pub const CSV_DELIMITER: u8 = b';';

// ==========================================
// 导出错误
// ==========================================
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV 缓冲区错误: {0}")]
    Buffer(String),

    #[error("CSV 编码错误: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

// ==========================================
// ExportMatrix - 导出矩阵
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportMatrix {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportMatrix {
    /// 构建矩阵 (行 = 展示日期, 列 = 科室快照)
    ///
    /// # 参数
    /// - removed_label: 悬空技师 id 的显示文本
    pub fn build(
        state: &RosterState,
        record: &MonthRecord,
        ym: YearMonth,
        display_default_days: u32,
        removed_label: &str,
    ) -> Self {
        let sectors = record.sector_snapshot();

        let mut header = Vec::with_capacity(sectors.len() + 1);
        header.push(DAY_COLUMN.to_string());
        header.extend(sectors.iter().map(|s| s.name.clone()));

        let rows = display_days(record, ym, display_default_days)
            .into_iter()
            .map(|day| {
                let mut row = Vec::with_capacity(sectors.len() + 1);
                row.push(format!("{:02}", day));
                for sector in sectors {
                    let names: Vec<&str> = record
                        .slots(day, sector)
                        .iter()
                        .filter_map(|slot| slot.technician_id.as_deref())
                        .map(|id| {
                            state
                                .technician(id)
                                .map(|t| t.name.as_str())
                                .unwrap_or(removed_label)
                        })
                        .collect();
                    row.push(names.join(NAME_SEPARATOR));
                }
                row
            })
            .collect();

        Self { header, rows }
    }

    /// 渲染为 CSV 文本
    pub fn to_csv(&self) -> ExportResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(CSV_DELIMITER)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Buffer(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// 导出文件名: "<排班名>_<YYYY-MM>.csv", 空白替换为下划线
pub fn csv_file_name(schedule_id: ScheduleId, ym: YearMonth) -> String {
    format!("{}_{}.csv", schedule_id.definition().name, ym)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
