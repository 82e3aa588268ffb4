// End-to-end behavior of the scheduler and delivery gate against an
// in-memory store: exact-day milestones, seasonal watering cadence,
// idempotent re-runs, and hour-gated delivery.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use rusqlite::Connection;

use saien_core::config::{AdjustmentMode, DedupPolicy, EngineConfig};
use saien_engine::{DeliveryGate, SchedulerEngine};
use saien_store::types::{
    MilestoneTask, NewCultivation, ScheduleTemplate, SpeciesSchedule, StartMethod,
};
use saien_store::Store;

/// A UTC instant corresponding to the given JST wall-clock time.
fn at_jst(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
    FixedOffset::east_opt(9 * 3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, hour, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tomato_schedule() -> SpeciesSchedule {
    SpeciesSchedule {
        from_seed: Some(ScheduleTemplate {
            tasks: vec![MilestoneTask {
                day_offset: 14,
                task_type: "thinning".to_string(),
                description: "Thin to the strongest seedling".to_string(),
            }],
            watering_base_interval_days: 7,
            fertilizer_interval_days: Some(10),
        }),
        from_seedling: Some(ScheduleTemplate {
            tasks: vec![MilestoneTask {
                day_offset: 14,
                task_type: "staking".to_string(),
                description: "Tie the main stem to a stake".to_string(),
            }],
            watering_base_interval_days: 7,
            fertilizer_interval_days: None,
        }),
        germination_offset_days: 0,
    }
}

struct Fixture {
    store: Arc<Store>,
    cultivation_id: String,
}

fn fixture(schedule: SpeciesSchedule, new: NewCultivation) -> Fixture {
    let store = Arc::new(Store::new(Connection::open_in_memory().unwrap()).unwrap());
    store.upsert_species("tomato", "Tomato", &schedule).unwrap();
    let cultivation_id = store.add_cultivation(&new).unwrap();
    Fixture {
        store,
        cultivation_id,
    }
}

fn seed_planted(planted: NaiveDate) -> NewCultivation {
    NewCultivation {
        user_id: "u-1".to_string(),
        species_id: "tomato".to_string(),
        planted_date: planted,
        start_method: StartMethod::FromSeed,
        adjustments: HashMap::new(),
        last_feedback_date: None,
    }
}

fn engine(store: &Arc<Store>) -> SchedulerEngine {
    SchedulerEngine::new(Arc::clone(store), EngineConfig::default())
}

fn task_types_on(store: &Store, day: NaiveDate) -> Vec<String> {
    let mut types: Vec<String> = store
        .pending_notifications(day)
        .unwrap()
        .into_iter()
        .map(|n| n.task_type)
        .collect();
    types.sort();
    types
}

// --- scheduler ---------------------------------------------------------------

#[test]
fn milestone_fires_on_the_exact_day_only() {
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 3, 1)));
    let eng = engine(&f.store);

    // Day 13: nothing milestone-shaped.
    eng.run(at_jst(2026, 3, 14, 9)).unwrap();
    assert!(!task_types_on(&f.store, date(2026, 3, 14)).contains(&"thinning".to_string()));

    // Day 14: thinning fires.
    eng.run(at_jst(2026, 3, 15, 9)).unwrap();
    assert!(task_types_on(&f.store, date(2026, 3, 15)).contains(&"thinning".to_string()));

    // Day 15: no catch-up.
    eng.run(at_jst(2026, 3, 16, 9)).unwrap();
    assert!(!task_types_on(&f.store, date(2026, 3, 16)).contains(&"thinning".to_string()));
}

#[test]
fn july_interval_skips_day_fourteen() {
    // Scenario A: base 7 × summer 0.7 → 5; elapsed 14, 14 % 5 != 0.
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 7, 1)));
    let summary = engine(&f.store).run(at_jst(2026, 7, 15, 9)).unwrap();

    let types = task_types_on(&f.store, date(2026, 7, 15));
    assert!(!types.contains(&"watering".to_string()));
    // The day-14 thinning milestone still fires.
    assert_eq!(types, vec!["thinning".to_string()]);
    assert_eq!(summary.created, 1);
}

#[test]
fn july_interval_fires_on_day_fifteen() {
    // Scenario B: elapsed 15, 15 % 5 == 0.
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 7, 1)));
    let summary = engine(&f.store).run(at_jst(2026, 7, 16, 9)).unwrap();

    assert_eq!(task_types_on(&f.store, date(2026, 7, 16)), vec!["watering"]);
    assert_eq!(summary.created, 1);
}

#[test]
fn fertilizer_fires_on_its_own_cadence() {
    // Scenario C: fertilizer interval 10, elapsed 20 (and watering at 20 % 5).
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 7, 1)));
    let summary = engine(&f.store).run(at_jst(2026, 7, 21, 9)).unwrap();

    assert_eq!(
        task_types_on(&f.store, date(2026, 7, 21)),
        vec!["fertilizing", "watering"]
    );
    assert_eq!(summary.created, 2);
}

#[test]
fn rerunning_the_scheduler_creates_no_duplicates() {
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 7, 1)));
    let eng = engine(&f.store);
    let now = at_jst(2026, 7, 21, 9);

    let first = eng.run(now).unwrap();
    assert_eq!(first.created, 2);

    let second = eng.run(now).unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(f.store.pending_notifications(date(2026, 7, 21)).unwrap().len(), 2);
}

#[test]
fn future_planting_date_is_quietly_skipped() {
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 8, 1)));
    let summary = engine(&f.store).run(at_jst(2026, 7, 20, 9)).unwrap();

    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped, 1);
    assert!(summary.errors.is_empty());
}

#[test]
fn germination_offset_shifts_seed_milestones_only() {
    let mut schedule = tomato_schedule();
    schedule.germination_offset_days = 7;

    // Seed-started: thinning moves from day 14 to day 21.
    let f = fixture(schedule.clone(), seed_planted(date(2026, 3, 1)));
    let eng = engine(&f.store);
    eng.run(at_jst(2026, 3, 15, 9)).unwrap();
    assert!(!task_types_on(&f.store, date(2026, 3, 15)).contains(&"thinning".to_string()));
    eng.run(at_jst(2026, 3, 22, 9)).unwrap();
    assert!(task_types_on(&f.store, date(2026, 3, 22)).contains(&"thinning".to_string()));

    // Seedling-started: the offset does not apply.
    let mut new = seed_planted(date(2026, 3, 1));
    new.start_method = StartMethod::FromSeedling;
    let g = fixture(schedule, new);
    engine(&g.store).run(at_jst(2026, 3, 15, 9)).unwrap();
    assert!(task_types_on(&g.store, date(2026, 3, 15)).contains(&"staking".to_string()));
}

#[test]
fn milestone_adjustment_moves_the_due_day() {
    let mut new = seed_planted(date(2026, 3, 1));
    new.adjustments
        .insert("thinning_adjustment".to_string(), 2.0);
    let f = fixture(tomato_schedule(), new);
    let eng = engine(&f.store);

    eng.run(at_jst(2026, 3, 15, 9)).unwrap(); // day 14: moved away
    assert!(!task_types_on(&f.store, date(2026, 3, 15)).contains(&"thinning".to_string()));
    eng.run(at_jst(2026, 3, 17, 9)).unwrap(); // day 16: effective due day
    assert!(task_types_on(&f.store, date(2026, 3, 17)).contains(&"thinning".to_string()));
}

#[test]
fn multiplicative_mode_changes_the_watering_cadence() {
    // Base 7, October (×1.0), delta -0.2 → round(7 × 0.8) = 6.
    let mut new = seed_planted(date(2026, 10, 1));
    new.adjustments
        .insert("watering_interval_adjustment".to_string(), -0.2);
    let f = fixture(tomato_schedule(), new);
    let eng = SchedulerEngine::new(
        Arc::clone(&f.store),
        EngineConfig {
            adjustment_mode: AdjustmentMode::Multiplicative,
            ..EngineConfig::default()
        },
    );

    eng.run(at_jst(2026, 10, 13, 9)).unwrap(); // day 12, 12 % 6 == 0
    assert!(task_types_on(&f.store, date(2026, 10, 13)).contains(&"watering".to_string()));
    eng.run(at_jst(2026, 10, 15, 9)).unwrap(); // day 14, 14 % 6 != 0
    assert!(!task_types_on(&f.store, date(2026, 10, 15)).contains(&"watering".to_string()));
}

#[test]
fn feedback_cooldown_suppresses_watering_but_not_fertilizer() {
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 7, 1)));
    f.store
        .apply_feedback(
            &f.cultivation_id,
            "watering_interval_adjustment",
            0.0,
            date(2026, 7, 20),
        )
        .unwrap();
    let eng = SchedulerEngine::new(
        Arc::clone(&f.store),
        EngineConfig {
            dedup_policy: DedupPolicy::FeedbackCooldown,
            ..EngineConfig::default()
        },
    );

    // Day 20 (feedback yesterday): watering suppressed, fertilizer unaffected.
    let summary = eng.run(at_jst(2026, 7, 21, 9)).unwrap();
    assert_eq!(task_types_on(&f.store, date(2026, 7, 21)), vec!["fertilizing"]);
    assert_eq!(summary.skipped, 1);
}

// --- delivery gate -----------------------------------------------------------

fn pending_watering(f: &Fixture, day: NaiveDate) {
    engine(&f.store).run(at_jst(2026, 7, 16, 2)).unwrap();
    assert_eq!(task_types_on(&f.store, day), vec!["watering"]);
}

#[test]
fn default_hour_delivers_at_seven_and_only_seven() {
    // Scenario D: no preferred hour → 07:00 JST.
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 7, 1)));
    f.store.set_preference("u-1", true, None).unwrap();
    pending_watering(&f, date(2026, 7, 16));
    let gate = DeliveryGate::new(Arc::clone(&f.store), 7);

    let at_eight = gate.run(at_jst(2026, 7, 16, 8)).unwrap();
    assert_eq!(at_eight.delivered, 0);
    assert_eq!(at_eight.skipped, 1);
    assert_eq!(f.store.pending_notifications(date(2026, 7, 16)).unwrap().len(), 1);

    let at_seven = gate.run(at_jst(2026, 7, 16, 7)).unwrap();
    assert_eq!(at_seven.delivered, 1);
    assert!(f.store.pending_notifications(date(2026, 7, 16)).unwrap().is_empty());
}

#[test]
fn preferred_hour_overrides_the_default() {
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 7, 1)));
    f.store.set_preference("u-1", true, Some(21)).unwrap();
    pending_watering(&f, date(2026, 7, 16));
    let gate = DeliveryGate::new(Arc::clone(&f.store), 7);

    assert_eq!(gate.run(at_jst(2026, 7, 16, 7)).unwrap().delivered, 0);
    assert_eq!(gate.run(at_jst(2026, 7, 16, 21)).unwrap().delivered, 1);
}

#[test]
fn disabled_reminders_never_deliver() {
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 7, 1)));
    f.store.set_preference("u-1", false, Some(7)).unwrap();
    pending_watering(&f, date(2026, 7, 16));
    let gate = DeliveryGate::new(Arc::clone(&f.store), 7);

    for hour in 0..24 {
        let summary = gate.run(at_jst(2026, 7, 16, hour)).unwrap();
        assert_eq!(summary.delivered, 0);
    }
    assert_eq!(f.store.pending_notifications(date(2026, 7, 16)).unwrap().len(), 1);
}

#[test]
fn missing_preferences_skip_without_failing_the_pass() {
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 7, 1)));
    pending_watering(&f, date(2026, 7, 16));
    let gate = DeliveryGate::new(Arc::clone(&f.store), 7);

    let summary = gate.run(at_jst(2026, 7, 16, 7)).unwrap();
    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.delivered, 0);
    assert_eq!(summary.skipped, 1);
    assert!(summary.errors.is_empty());
}

#[test]
fn rerunning_the_gate_on_a_delivered_record_is_a_noop() {
    let f = fixture(tomato_schedule(), seed_planted(date(2026, 7, 1)));
    f.store.set_preference("u-1", true, None).unwrap();
    pending_watering(&f, date(2026, 7, 16));
    let gate = DeliveryGate::new(Arc::clone(&f.store), 7);

    assert_eq!(gate.run(at_jst(2026, 7, 16, 7)).unwrap().delivered, 1);
    let again = gate.run(at_jst(2026, 7, 16, 7)).unwrap();
    assert_eq!(again.scanned, 0);
    assert_eq!(again.delivered, 0);
}
