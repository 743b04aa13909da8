// ==========================================
// 技师排班系统 - 命令行入口
// ==========================================
// 用法: escala-tecnicos [YYYY-MM]
// 输出: 月度汇总 + 四套排班的 CSV 导出
// 数据库: ESCALA_DB_PATH 或用户数据目录
// 注意: 汇总/导出会物化该月四套排班 (冻结科室快照并保存一次)
// ==========================================

use anyhow::{anyhow, Context};
use chrono::Local;
use escala_tecnicos::app::{get_default_db_path, AppState};
use escala_tecnicos::domain::{ScheduleId, YearMonth};
use escala_tecnicos::logging;

fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 版本 {}", escala_tecnicos::APP_NAME, escala_tecnicos::VERSION);
    tracing::info!("==================================================");

    let ym = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<YearMonth>()
            .map_err(|e| anyhow!("月份参数无效 ({}): {}", arg, e))?,
        None => YearMonth::from_date(Local::now().date_naive()),
    };

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let app = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    let summaries = app
        .schedule_api
        .monthly_summary(ym)
        .context("月度汇总失败")?;
    for summary in &summaries {
        println!("== {} ({}) ==", summary.schedule_name, ym);
        if summary.rows.is_empty() {
            println!("  -");
        }
        for row in &summary.rows {
            println!("  {:<32} {:>3}h {:>3}", row.name, row.workload, row.days);
        }
    }
    println!();

    for schedule_id in ScheduleId::ALL {
        let export = app
            .schedule_api
            .export_csv(schedule_id, ym)
            .with_context(|| format!("导出失败: {}", schedule_id))?;
        println!("# {}", export.file_name);
        println!("{}", export.content);
    }

    Ok(())
}
