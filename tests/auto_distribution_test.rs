// ==========================================
// 自动分配集成测试
// ==========================================
// 测试范围:
// 1. 轮转指针跨运行延续
// 2. 跨四套排班的 NORMAL 同日唯一
// 3. 疲劳周期 (30h/40h) 不被自动分配违反
// 4. 确定性 / FILL_EMPTY 幂等 / CLEAR_AND_FILL 覆盖
// 5. 科室快照冻结
// ==========================================


use chrono::NaiveDate;
use escala_tecnicos::api::TechnicianUpdate;
use escala_tecnicos::app::AppState;
use escala_tecnicos::{AutoFillMode, CoverageKind, ScheduleId, WorkloadClass, YearMonth};
use std::collections::{BTreeMap, BTreeSet};
use test_helpers::{
    add_technicians, assign_request, in_memory_app, names_in, single_sector_template, ym,
    TechnicianBuilder,
};

/// 整月格子 -> 每日每格的技师姓名
fn name_grid(app: &AppState, schedule_id: ScheduleId, month: YearMonth) -> Vec<Vec<Option<String>>> {
    let technicians = app.roster_api.list_technicians().unwrap();
    app.schedule_api
        .slot_grid(schedule_id, month)
        .unwrap()
        .into_iter()
        .map(|day| {
            day.sectors
                .into_iter()
                .flat_map(|s| s.slots)
                .map(|slot| {
                    slot.technician_id.map(|id| {
                        technicians
                            .iter()
                            .find(|t| t.id == id)
                            .map(|t| t.name.clone())
                            .unwrap_or(id)
                    })
                })
                .collect()
        })
        .collect()
}

fn hob_enabled() -> TechnicianUpdate {
    TechnicianUpdate {
        hob: Some(true),
        ..Default::default()
    }
}

/// 技师 id -> 当月上班日期 (所有排班)
fn worked_days(app: &AppState, month: YearMonth) -> BTreeMap<String, BTreeSet<u32>> {
    let mut worked: BTreeMap<String, BTreeSet<u32>> = BTreeMap::new();
    for schedule_id in ScheduleId::ALL {
        for day in app.schedule_api.slot_grid(schedule_id, month).unwrap() {
            for slot in day.sectors.iter().flat_map(|s| s.slots.iter()) {
                if let Some(id) = &slot.technician_id {
                    worked.entry(id.clone()).or_default().insert(day.day);
                }
            }
        }
    }
    worked
}

#[test]
fn test_pointer_continues_across_runs() {
    println!("\n=== 测试：轮转指针跨运行延续 ===");

    let app = in_memory_app();
    add_technicians(&app, &["A", "B"]);
    let month = ym(2026, 3);
    let sector = single_sector_template(&app, ScheduleId::UpaDia, 1);

    let report = app
        .schedule_api
        .run_auto_distribution(ScheduleId::UpaDia, month, &[5], AutoFillMode::FillEmpty)
        .unwrap();
    assert_eq!(report.slots_filled, 1);
    assert_eq!(report.final_pointer, 1);
    assert_eq!(names_in(&app, ScheduleId::UpaDia, month, 5, &sector), vec![Some("A".to_string())]);

    app.schedule_api
        .run_auto_distribution(ScheduleId::UpaDia, month, &[6], AutoFillMode::FillEmpty)
        .unwrap();
    assert_eq!(names_in(&app, ScheduleId::UpaDia, month, 6, &sector), vec![Some("B".to_string())]);

    app.schedule_api
        .run_auto_distribution(ScheduleId::UpaDia, month, &[7], AutoFillMode::FillEmpty)
        .unwrap();
    assert_eq!(names_in(&app, ScheduleId::UpaDia, month, 7, &sector), vec![Some("A".to_string())]);
    assert_eq!(app.schedule_api.rotation_pointer(ScheduleId::UpaDia, month).unwrap(), 1);

    println!("✓ 指针按运行延续");
}

#[test]
fn test_normal_unique_across_all_schedules() {
    println!("\n=== 测试：四套排班同日 NORMAL 唯一 ===");

    let app = in_memory_app();
    for name in ["Ana", "Bia", "Caio", "Duda", "Eva", "Fabi", "Gabi", "Hugo"] {
        TechnicianBuilder::new(name).both_units().add_to(&app);
    }
    let month = ym(2026, 2);
    let days = month.all_days();

    for schedule_id in ScheduleId::ALL {
        app.schedule_api
            .run_auto_distribution(schedule_id, month, &days, AutoFillMode::FillEmpty)
            .unwrap();
    }

    for day in &days {
        let mut normal_count: BTreeMap<String, usize> = BTreeMap::new();
        for schedule_id in ScheduleId::ALL {
            let view = app.schedule_api.day_view(schedule_id, month, *day).unwrap();
            for slot in view.sectors.iter().flat_map(|s| s.slots.iter()) {
                if let Some(id) = &slot.technician_id {
                    assert_eq!(slot.coverage, CoverageKind::Normal);
                    *normal_count.entry(id.clone()).or_default() += 1;
                }
            }
        }
        assert!(
            normal_count.values().all(|c| *c <= 1),
            "第 {} 天存在重复 NORMAL: {:?}",
            day,
            normal_count
        );
    }

    println!("✓ 无同日重复 NORMAL");
}

#[test]
fn test_auto_run_respects_fatigue_cycle() {
    println!("\n=== 测试：自动分配遵守疲劳周期 ===");

    let app = in_memory_app();
    let techs = vec![
        TechnicianBuilder::new("Ana").h30().add_to(&app),
        TechnicianBuilder::new("Bia").add_to(&app),
        TechnicianBuilder::new("Caio").h30().add_to(&app),
        TechnicianBuilder::new("Duda").add_to(&app),
        TechnicianBuilder::new("Eva").add_to(&app),
    ];
    let month = ym(2026, 3);
    single_sector_template(&app, ScheduleId::UpaDia, 2);

    let report = app
        .schedule_api
        .run_auto_distribution(ScheduleId::UpaDia, month, &month.all_days(), AutoFillMode::FillEmpty)
        .unwrap();
    assert_eq!(report.days_processed.len(), 31);
    assert!(report.slots_filled > 0);

    let worked = worked_days(&app, month);
    for tech in &techs {
        let Some(days) = worked.get(&tech.id) else {
            continue;
        };
        let rest = match tech.workload {
            WorkloadClass::H30 => 2,
            WorkloadClass::H40 => 1,
        };
        for day in days {
            for back in 1..=rest {
                if *day > back {
                    assert!(
                        !days.contains(&(day - back)),
                        "{} 在第 {} 天违反疲劳周期",
                        tech.name,
                        day
                    );
                }
            }
        }
    }

    println!("✓ 所有自动分配满足休息间隔");
}

#[test]
fn test_same_input_same_grid() {
    println!("\n=== 测试：相同输入产生相同结果 ===");

    let build = || {
        let app = in_memory_app();
        add_technicians(&app, &["Lia", "Mel", "Nina", "Otto", "Paulo"]);
        TechnicianBuilder::new("Quim").h30().add_to(&app);
        single_sector_template(&app, ScheduleId::UpaDia, 3);
        app
    };
    let days: Vec<u32> = (1..=10).collect();

    let month = ym(2026, 5);
    let first = build();
    let second = build();
    for app in [&first, &second] {
        app.schedule_api
            .run_auto_distribution(ScheduleId::UpaDia, month, &days, AutoFillMode::ClearAndFill)
            .unwrap();
    }

    let grid = name_grid(&first, ScheduleId::UpaDia, month);
    assert_eq!(grid, name_grid(&second, ScheduleId::UpaDia, month));
    assert_eq!(
        first.schedule_api.rotation_pointer(ScheduleId::UpaDia, month).unwrap(),
        second.schedule_api.rotation_pointer(ScheduleId::UpaDia, month).unwrap()
    );

    // 重置后重跑得到同样结果
    first.schedule_api.reset_month(ScheduleId::UpaDia, month).unwrap();
    first
        .schedule_api
        .run_auto_distribution(ScheduleId::UpaDia, month, &days, AutoFillMode::ClearAndFill)
        .unwrap();
    assert_eq!(name_grid(&first, ScheduleId::UpaDia, month), grid);

    println!("✓ 结果确定");
}

#[test]
fn test_fill_empty_is_idempotent_and_keeps_manual_work() {
    println!("\n=== 测试：FILL_EMPTY 幂等并保留手工分配 ===");

    let app = in_memory_app();
    let techs = add_technicians(&app, &["Rita", "Saulo", "Tina", "Ugo"]);
    let month = ym(2026, 3);
    let sector = single_sector_template(&app, ScheduleId::UpaNoite, 2);

    app.schedule_api
        .manual_assign(&assign_request(&techs[3].id, ScheduleId::UpaNoite, month, 1, &sector, CoverageKind::Normal))
        .unwrap();

    let report = app
        .schedule_api
        .run_auto_distribution(ScheduleId::UpaNoite, month, &[1, 2, 3], AutoFillMode::FillEmpty)
        .unwrap();
    assert_eq!(report.slots_kept, 1);
    assert_eq!(names_in(&app, ScheduleId::UpaNoite, month, 1, &sector)[0], Some("Ugo".to_string()));

    let before = name_grid(&app, ScheduleId::UpaNoite, month);
    let again = app
        .schedule_api
        .run_auto_distribution(ScheduleId::UpaNoite, month, &[1, 2, 3], AutoFillMode::FillEmpty)
        .unwrap();
    assert_eq!(again.slots_filled, 0);
    assert_eq!(name_grid(&app, ScheduleId::UpaNoite, month), before);

    println!("✓ 第二次运行不改变格子");
}

#[test]
fn test_clear_and_fill_replaces_existing_assignments() {
    println!("\n=== 测试：CLEAR_AND_FILL 清空后重新分配 ===");

    let app = in_memory_app();
    let techs = add_technicians(&app, &["Vera", "Wil"]);
    let month = ym(2026, 3);
    let sector = single_sector_template(&app, ScheduleId::UpaDia, 1);

    app.schedule_api
        .manual_assign(&assign_request(&techs[1].id, ScheduleId::UpaDia, month, 9, &sector, CoverageKind::Extra))
        .unwrap();

    let report = app
        .schedule_api
        .run_auto_distribution(ScheduleId::UpaDia, month, &[9], AutoFillMode::ClearAndFill)
        .unwrap();
    assert_eq!(report.slots_kept, 0);
    assert_eq!(report.slots_filled, 1);

    let view = app.schedule_api.day_view(ScheduleId::UpaDia, month, 9).unwrap();
    let slot = &view.sectors[0].slots[0];
    assert_eq!(slot.technician_id.as_deref(), Some(techs[0].id.as_str()));
    assert_eq!(slot.coverage, CoverageKind::Normal);

    println!("✓ 目标日被清空后按轮转重新分配");
}

#[test]
fn test_unavailable_and_ineligible_never_offered() {
    println!("\n=== 测试：不可用与无资格技师不参与轮转 ===");

    let app = in_memory_app();
    let ferias = TechnicianBuilder::new("Xande").add_to(&app);
    let noturno = TechnicianBuilder::new("Yara").night_only().add_to(&app);
    let hob = TechnicianBuilder::new("Zilda").hob_only().add_to(&app);
    let disponivel = TechnicianBuilder::new("Alan").add_to(&app);
    let month = ym(2026, 3);
    single_sector_template(&app, ScheduleId::UpaDia, 1);

    app.roster_api
        .add_occurrence(
            &ferias.id,
            "Férias",
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
        .unwrap();

    let eligible = app.schedule_api.list_eligible(ScheduleId::UpaDia, month, 4).unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].id, disponivel.id);

    let report = app
        .schedule_api
        .run_auto_distribution(ScheduleId::UpaDia, month, &[1, 2, 3, 4], AutoFillMode::FillEmpty)
        .unwrap();
    assert_eq!(report.slots_filled, 2);
    assert_eq!(report.slots_left_empty, 2);

    let worked = worked_days(&app, month);
    for id in [&ferias.id, &noturno.id, &hob.id] {
        assert!(!worked.contains_key(id));
    }
    assert_eq!(
        worked.get(&disponivel.id).cloned().unwrap_or_default(),
        BTreeSet::from([1, 3])
    );

    println!("✓ 仅合格技师被分配");
}

#[test]
fn test_snapshot_frozen_after_materialization() {
    println!("\n=== 测试：物化后模板修改不影响当月 ===");

    let app = in_memory_app();
    add_technicians(&app, &["Bela", "Cris", "Davi", "Enzo", "Fred"]);
    let month = ym(2026, 6);
    let sector = single_sector_template(&app, ScheduleId::HobDia, 1);
    for tech in app.roster_api.list_technicians().unwrap() {
        app.roster_api
            .update_technician(&tech.id, &hob_enabled())
            .unwrap();
    }

    assert_eq!(app.schedule_api.sector_snapshot(ScheduleId::HobDia, month).unwrap().len(), 1);
    app.sector_api.set_required_count(ScheduleId::HobDia, &sector, 4).unwrap();
    app.sector_api.add_sector(ScheduleId::HobDia).unwrap();

    let report = app
        .schedule_api
        .run_auto_distribution(ScheduleId::HobDia, month, &[1], AutoFillMode::FillEmpty)
        .unwrap();
    assert_eq!(report.slots_filled, 1);

    // 下一个月按新模板物化
    let next = ym(2026, 7);
    let report = app
        .schedule_api
        .run_auto_distribution(ScheduleId::HobDia, next, &[1], AutoFillMode::FillEmpty)
        .unwrap();
    assert_eq!(report.slots_filled, 5);

    println!("✓ 快照冻结");
}

#[test]
fn test_nothing_to_do_leaves_state_untouched() {
    println!("\n=== 测试：无事可做时不修改状态 ===");

    let app = in_memory_app();
    let month = ym(2026, 2);

    let err = app
        .schedule_api
        .run_auto_distribution(ScheduleId::UpaDia, month, &[1, 2], AutoFillMode::FillEmpty)
        .unwrap_err();
    assert_eq!(err.code(), "NOTHING_TO_DO");

    add_technicians(&app, &["Gil"]);
    for days in [&[][..], &[0, 29, 30][..]] {
        let err = app
            .schedule_api
            .run_auto_distribution(ScheduleId::UpaDia, month, days, AutoFillMode::ClearAndFill)
            .unwrap_err();
        assert_eq!(err.code(), "NOTHING_TO_DO");
    }
    assert_eq!(app.schedule_api.rotation_pointer(ScheduleId::UpaDia, month).unwrap(), 0);

    println!("✓ 错误返回且指针未变");
}
