use std::{fs, sync::Arc};

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::tempdir;
use uuid::Uuid;

use tally_core::{
    storage::ObligationStore, CommitmentService, CoreError, FixedClock, ObligationService,
    ScheduleSettings,
};
use tally_domain::{Amounted, BillerConfig, CommitmentKind, CommitmentRequest, Obligation};
use tally_storage_json::JsonStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn services(store: Arc<JsonStore>) -> (CommitmentService, ObligationService) {
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()));
    let commitments = CommitmentService::new(store.clone(), store.clone(), clock.clone())
        .with_ledger(store.clone())
        .with_settings(ScheduleSettings {
            ledger_category: Some(Uuid::new_v4()),
            ..ScheduleSettings::default()
        });
    let obligations = ObligationService::new(store, clock);
    (commitments, obligations)
}

#[test]
fn card_schedule_survives_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tally.json");

    let store = Arc::new(JsonStore::open(path.clone()).expect("open store"));
    let biller = BillerConfig::new("Nubank", 25, 5).expect("biller");
    store.register_biller(biller.clone()).expect("register biller");
    let (commitments, obligations) = services(store.clone());

    let request = CommitmentRequest::new("Laptop", CommitmentKind::CardInstallment, date(2025, 3, 10))
        .with_total(300.0)
        .with_count(3)
        .with_biller(biller.id);
    let summary = commitments.create(&request).expect("create card commitment");
    let first = obligations.list(summary.commitment.id).expect("list")[0].id;
    obligations.settle(first, true, 5.0).expect("settle first");
    drop(commitments);
    drop(obligations);
    drop(store);

    let reopened = Arc::new(JsonStore::open(path).expect("reopen store"));
    let rows = reopened
        .load_obligations(summary.commitment.id)
        .expect("load obligations");
    let due: Vec<NaiveDate> = rows.iter().map(|row| row.due_date).collect();
    assert_eq!(due, vec![date(2025, 4, 5), date(2025, 5, 5), date(2025, 6, 5)]);
    assert!(rows[0].paid);
    assert_eq!(rows[0].extra_amount, 5.0);
    assert!(rows.iter().all(|row| row.ledger_entry_id.is_some()));

    let ledger = reopened.ledger_entries().expect("ledger");
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger[2].request.title, "Laptop (3/3)");
    let mirrored: f64 = ledger.iter().map(Amounted::amount).sum();
    assert_eq!(mirrored, 300.0);
    assert_eq!(reopened.list_billers().expect("billers"), vec![biller]);

    let (commitments, _) = services(reopened);
    let summary = commitments.get(summary.commitment.id).expect("get");
    assert_eq!(summary.obligations_paid, 1);
    assert_eq!(summary.amount_paid, 105.0);
}

#[test]
fn batch_without_commitment_leaves_file_untouched() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tally.json");
    let store = JsonStore::open(path.clone()).expect("open store");
    store
        .register_biller(BillerConfig::new("Inter", 10, 20).expect("biller"))
        .expect("register");
    let before = fs::read_to_string(&path).expect("read data file");

    let orphan = Uuid::new_v4();
    let rows = vec![Obligation::new(orphan, 1, date(2025, 1, 1), 10.0)];
    let err = store
        .save_obligations_batch(orphan, &rows)
        .expect_err("must reject orphan batch");

    assert!(matches!(err, CoreError::Storage(_)));
    assert_eq!(fs::read_to_string(&path).expect("reread"), before);
    assert!(store.load_obligations(orphan).expect("load").is_empty());
}

#[test]
fn invalid_biller_is_rejected_before_write() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tally.json");
    let store = JsonStore::open(path.clone()).expect("open store");

    let mut biller = BillerConfig::new("Broken", 10, 20).expect("biller");
    biller.cycle.closing_day = 32;

    let err = store.register_biller(biller).expect_err("day 32 is invalid");
    assert!(matches!(err, CoreError::Validation(_)));
    assert!(!path.exists());
}

#[test]
fn backups_are_pruned_to_retention() {
    let dir = tempdir().expect("tempdir");
    let store = JsonStore::with_retention(dir.path().join("tally.json"), 2).expect("open store");

    for day in 1..=6 {
        let biller = BillerConfig::new(format!("Card {day}"), day, day + 1).expect("biller");
        store.register_biller(biller).expect("register");
    }

    let backups = store.list_backups().expect("list backups");
    assert!(!backups.is_empty());
    assert!(backups.len() <= 2);
    assert!(backups.iter().all(|path| path.starts_with(store.backups_dir())));
    assert_eq!(store.list_billers().expect("billers").len(), 6);
}

#[test]
fn delete_cascades_on_disk() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tally.json");
    let store = Arc::new(JsonStore::open(path.clone()).expect("open store"));
    let (commitments, obligations) = services(store.clone());

    let request = CommitmentRequest::new("Gym", CommitmentKind::Recurring, date(2025, 1, 15))
        .with_unit_amount(99.9);
    let summary = commitments.create(&request).expect("create recurring");
    let any_row = obligations.list(summary.commitment.id).expect("list")[0].id;
    commitments.delete(summary.commitment.id).expect("delete");

    let reopened = JsonStore::open(path).expect("reopen");
    assert!(reopened
        .load_commitment(summary.commitment.id)
        .expect("load")
        .is_none());
    assert!(reopened.load_obligation(any_row).expect("load row").is_none());
}

#[test]
fn malformed_file_reports_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tally.json");
    fs::write(&path, "[not a snapshot").expect("write garbage");

    let err = JsonStore::open(path).expect_err("must fail");
    assert!(matches!(err, CoreError::Serde(_)));
}

#[test]
fn card_create_keeps_pre_create_backup() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tally.json");
    let store = Arc::new(JsonStore::open(path.clone()).expect("open store"));
    let biller = BillerConfig::new("Visa", 25, 5).expect("biller");
    store.register_biller(biller.clone()).expect("register biller");
    let before_create = fs::read_to_string(&path).expect("read data file");
    let (commitments, _) = services(store.clone());

    let request = CommitmentRequest::new("Television", CommitmentKind::CardInstallment, date(2025, 3, 10))
        .with_total(1200.0)
        .with_count(12)
        .with_biller(biller.id);
    commitments.create(&request).expect("create card commitment");

    assert_eq!(store.ledger_entries().expect("ledger").len(), 12);
    let backups = store.list_backups().expect("list backups");
    assert!(backups.len() <= 5);
    let kept_pre_create = backups.iter().any(|backup| {
        fs::read_to_string(backup).expect("read backup") == before_create
    });
    assert!(kept_pre_create, "no backup holds the state before the create");
}
