//! Integration tests for the repository layer.
//!
//! Each test gets its own migrated database via `#[sqlx::test]`.

use attsync_core::sync::SyncStatus;
use attsync_db::models::machine::CreateMachine;
use attsync_db::models::punch::CreatePunchRecord;
use attsync_db::models::sync_log::CreateSyncLog;
use attsync_db::models::transfer::CreateTransferLog;
use attsync_db::repositories::{MachineRepo, PunchRepo, SyncLogRepo, TransferRepo};
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

fn machine_dto(name: &str, ip: &str, active: bool) -> CreateMachine {
    CreateMachine {
        name: name.to_string(),
        ip_address: ip.to_string(),
        port: 4370,
        is_active: active,
        is_fetch_all: false,
        serial_number: None,
        description: None,
        device_model: None,
    }
}

fn punch(emp_no: &str, ip: &str, day: u32, hour: u32) -> CreatePunchRecord {
    CreatePunchRecord {
        emp_no: emp_no.to_string(),
        punch_time: NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap(),
        shift_in: true,
        shift_out: false,
        remarks: None,
        device_log_id: None,
        machine_ip: ip.to_string(),
        machine_port: 4370,
    }
}

// ---------------------------------------------------------------------------
// Machine registry
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn list_active_excludes_inactive_machines(pool: PgPool) {
    MachineRepo::create(&pool, &machine_dto("lobby", "10.0.0.1", true))
        .await
        .unwrap();
    MachineRepo::create(&pool, &machine_dto("store", "10.0.0.2", false))
        .await
        .unwrap();

    let active = MachineRepo::list_active(&pool).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].ip_address, "10.0.0.1");

    let all = MachineRepo::list_all(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[sqlx::test]
async fn find_by_id_returns_none_for_unknown_machine(pool: PgPool) {
    assert!(MachineRepo::find_by_id(&pool, 999).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Punch records and watermarks
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn insert_batch_writes_all_rows(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &machine_dto("lobby", "10.0.0.1", true))
        .await
        .unwrap();

    let batch = vec![
        punch("100", "10.0.0.1", 1, 8),
        punch("100", "10.0.0.1", 1, 17),
        punch("200", "10.0.0.1", 2, 9),
    ];
    let written = PunchRepo::insert_batch(&pool, machine.id, &batch)
        .await
        .unwrap();
    assert_eq!(written, 3);

    let listed = PunchRepo::list_for_machine(&pool, machine.id, 10)
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);
    // Newest device time first.
    assert_eq!(listed[0].emp_no, "200");
}

#[sqlx::test]
async fn insert_batch_with_empty_slice_is_a_no_op(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &machine_dto("lobby", "10.0.0.1", true))
        .await
        .unwrap();
    let written = PunchRepo::insert_batch(&pool, machine.id, &[]).await.unwrap();
    assert_eq!(written, 0);
}

#[sqlx::test]
async fn max_punch_time_is_none_without_history(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &machine_dto("lobby", "10.0.0.1", true))
        .await
        .unwrap();
    let watermark = PunchRepo::max_punch_time(&pool, machine.id, "10.0.0.1")
        .await
        .unwrap();
    assert!(watermark.is_none());
}

#[sqlx::test]
async fn max_punch_time_returns_latest_device_time(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &machine_dto("lobby", "10.0.0.1", true))
        .await
        .unwrap();
    let batch = vec![punch("100", "10.0.0.1", 1, 8), punch("100", "10.0.0.1", 3, 7)];
    PunchRepo::insert_batch(&pool, machine.id, &batch).await.unwrap();

    let watermark = PunchRepo::max_punch_time(&pool, machine.id, "10.0.0.1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        watermark,
        NaiveDate::from_ymd_opt(2025, 6, 3)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
    );
}

#[sqlx::test]
async fn watermark_is_scoped_to_machine_and_address(pool: PgPool) {
    let a = MachineRepo::create(&pool, &machine_dto("lobby", "10.0.0.1", true))
        .await
        .unwrap();
    let b = MachineRepo::create(&pool, &machine_dto("store", "10.0.0.2", true))
        .await
        .unwrap();
    PunchRepo::insert_batch(&pool, a.id, &[punch("100", "10.0.0.1", 1, 8)])
        .await
        .unwrap();

    let other = PunchRepo::max_punch_time(&pool, b.id, "10.0.0.2")
        .await
        .unwrap();
    assert!(other.is_none());
}

#[sqlx::test]
async fn max_created_at_is_populated_after_insert(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &machine_dto("lobby", "10.0.0.1", true))
        .await
        .unwrap();
    PunchRepo::insert_batch(&pool, machine.id, &[punch("100", "10.0.0.1", 1, 8)])
        .await
        .unwrap();

    let watermark = PunchRepo::max_created_at(&pool, machine.id, "10.0.0.1")
        .await
        .unwrap();
    assert!(watermark.is_some());
}

// ---------------------------------------------------------------------------
// Sync audit trail
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn sync_log_roundtrips_without_end_time(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &machine_dto("lobby", "10.0.0.1", true))
        .await
        .unwrap();

    let entry = SyncLogRepo::insert(
        &pool,
        &CreateSyncLog {
            machine_id: machine.id,
            machine_ip: "10.0.0.1".to_string(),
            status: SyncStatus::Failed,
            records_read: 0,
            message: "Connection failed.".to_string(),
            started_at: Utc::now(),
            ended_at: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(entry.status, "Failed");
    assert_eq!(entry.records_read, 0);
    assert!(entry.ended_at.is_none());

    let listed = SyncLogRepo::list_for_machine(&pool, machine.id, 10)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

// ---------------------------------------------------------------------------
// Transfer audit trail
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn transfer_log_roundtrips(pool: PgPool) {
    let entry = TransferRepo::insert(
        &pool,
        &CreateTransferLog {
            emp_no: "100".to_string(),
            emp_name: "Alex".to_string(),
            source_ip: "10.0.0.1".to_string(),
            destination_ip: "10.0.0.2".to_string(),
            created_by: "hr-portal".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(entry.emp_no, "100");

    let recent = TransferRepo::list_recent(&pool, 5).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].destination_ip, "10.0.0.2");
}
