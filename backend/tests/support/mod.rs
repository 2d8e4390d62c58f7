//! Shared helpers for integration tests.
//!
//! Each test binary compiles this module separately and uses a different
//! subset of it.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use coil_warehouse::db::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use coil_warehouse::db::repositories::PostgresRepository;
use coil_warehouse::db::repository::{CoilRepository, RepositoryError};
use coil_warehouse::models::{utc_now, Coil, CoilFilter, CoilId, NewCoil};

// ==================== Environment ====================

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Variables are restored on unwind, and a process-wide lock serializes
/// callers because tests run in parallel threads.
///
/// `Some(v)` sets a variable, `None` removes it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::apply(changes);
    f()
}

struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let saved = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (key, value) in changes {
            set_or_remove(key, *value);
        }

        Self { saved }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            set_or_remove(&key, value.as_deref());
        }
    }
}

fn set_or_remove(key: &str, value: Option<&str>) {
    match value {
        Some(val) => std::env::set_var(key, val),
        None => std::env::remove_var(key),
    }
}

// ==================== Fixtures ====================

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Repositories that can be reset and seeded with coils at arbitrary times.
#[async_trait]
pub trait SeedCoils: CoilRepository {
    async fn seed(
        &self,
        length: f64,
        weight: f64,
        added: DateTime<Utc>,
        removed: Option<DateTime<Utc>>,
    ) -> Coil;

    async fn reset(&self);
}

#[async_trait]
impl SeedCoils for LocalRepository {
    async fn seed(
        &self,
        length: f64,
        weight: f64,
        added: DateTime<Utc>,
        removed: Option<DateTime<Utc>>,
    ) -> Coil {
        self.insert_coil(NewCoil::new(length, weight).unwrap(), added, removed)
            .unwrap()
    }

    async fn reset(&self) {
        self.clear();
    }
}

#[cfg(feature = "postgres-repo")]
#[async_trait]
impl SeedCoils for PostgresRepository {
    async fn seed(
        &self,
        length: f64,
        weight: f64,
        added: DateTime<Utc>,
        removed: Option<DateTime<Utc>>,
    ) -> Coil {
        self.insert_coil(NewCoil::new(length, weight).unwrap(), added, removed)
            .await
            .unwrap()
    }

    async fn reset(&self) {
        self.clear().await.unwrap();
    }
}

// ==================== Repository contract ====================
//
// Every backend must pass these. Each check starts from an empty store.

pub async fn check_create_and_remove<R: SeedCoils>(repo: &R) {
    repo.reset().await;

    let before = utc_now();
    let coil = repo
        .create_coil(&NewCoil::new(10.0, 20.0).unwrap())
        .await
        .unwrap();
    let after = utc_now();

    assert!(coil.date_removed.is_none());
    assert!(before <= coil.date_added && coil.date_added <= after);
    assert_eq!((coil.length, coil.weight), (10.0, 20.0));

    let removed = repo.remove_coil(coil.id, None).await.unwrap().unwrap();
    assert_eq!(removed.id, coil.id);
    assert_eq!(removed.date_added, coil.date_added);
    assert!(removed.date_removed.unwrap() >= coil.date_added);

    // Second removal and unknown ids are "not found", not errors
    assert!(repo.remove_coil(coil.id, None).await.unwrap().is_none());
    assert!(repo.remove_coil(CoilId::new(987_654), None).await.unwrap().is_none());
}

pub async fn check_ids_increase<R: SeedCoils>(repo: &R) {
    repo.reset().await;

    let mut last = None;
    for i in 1..=5 {
        let coil = repo
            .create_coil(&NewCoil::new(i as f64, 1.0).unwrap())
            .await
            .unwrap();
        if let Some(prev) = last {
            assert!(coil.id > prev);
        }
        last = Some(coil.id);
    }
}

pub async fn check_remove_at_explicit_time<R: SeedCoils>(repo: &R) {
    repo.reset().await;

    let added = at(2024, 3, 1, 8, 0);
    let coil = repo.seed(5.0, 6.0, added, None).await;

    let err = repo
        .remove_coil(coil.id, Some(added - Duration::minutes(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));

    // The failed attempt left the coil active
    let removed_at = added + Duration::hours(4);
    let removed = repo
        .remove_coil(coil.id, Some(removed_at))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.date_removed, Some(removed_at));
}

pub async fn check_list_filters<R: SeedCoils>(repo: &R) {
    repo.reset().await;

    let a = repo.seed(10.0, 100.0, at(2024, 1, 1, 0, 0), None).await;
    let b = repo
        .seed(20.0, 200.0, at(2024, 1, 2, 0, 0), Some(at(2024, 1, 5, 0, 0)))
        .await;
    let c = repo
        .seed(30.0, 300.0, at(2024, 1, 3, 0, 0), Some(at(2024, 1, 10, 0, 0)))
        .await;

    let ids = |coils: Vec<Coil>| coils.into_iter().map(|c| c.id).collect::<Vec<_>>();

    let all = repo.list_coils(&CoilFilter::new()).await.unwrap();
    assert_eq!(ids(all), vec![a.id, b.id, c.id]);

    let only_b = repo
        .list_coils(&CoilFilter::new().with_id_range(b.id, b.id))
        .await
        .unwrap();
    assert_eq!(only_b, vec![b.clone()]);

    let by_weight = repo
        .list_coils(&CoilFilter::new().with_weight_range(150.0, 300.0))
        .await
        .unwrap();
    assert_eq!(ids(by_weight), vec![b.id, c.id]);

    let by_length = repo
        .list_coils(&CoilFilter::new().with_length_range(10.0, 20.0))
        .await
        .unwrap();
    assert_eq!(ids(by_length), vec![a.id, b.id]);

    let added_early = repo
        .list_coils(
            &CoilFilter::new().with_date_added_range(at(2024, 1, 1, 0, 0), at(2024, 1, 2, 0, 0)),
        )
        .await
        .unwrap();
    assert_eq!(ids(added_early), vec![a.id, b.id]);

    // Active coil `a` never matches a removal range
    let removed_any = repo
        .list_coils(
            &CoilFilter::new().with_date_removed_range(at(2000, 1, 1, 0, 0), at(2100, 1, 1, 0, 0)),
        )
        .await
        .unwrap();
    assert_eq!(ids(removed_any), vec![b.id, c.id]);

    let combined = repo
        .list_coils(
            &CoilFilter::new()
                .with_weight_range(0.0, 250.0)
                .with_date_removed_range(at(2024, 1, 1, 0, 0), at(2024, 1, 31, 0, 0)),
        )
        .await
        .unwrap();
    assert_eq!(ids(combined), vec![b.id]);

    let reversed = repo
        .list_coils(&CoilFilter::new().with_id_range(c.id, a.id))
        .await
        .unwrap();
    assert!(reversed.is_empty());
}

pub async fn check_statistics_scenarios<R: SeedCoils>(repo: &R) {
    let now = at(2024, 5, 10, 15, 0);

    // Empty store
    repo.reset().await;
    let stats = repo.get_statistics(now - Duration::days(1), now).await.unwrap();
    assert!(stats.is_empty());

    // One coil added yesterday, removed now
    repo.reset().await;
    let yesterday = now - Duration::days(1);
    repo.seed(10.0, 20.0, yesterday, Some(now)).await;
    let stats = repo.get_statistics(yesterday, now).await.unwrap();
    assert_eq!(stats.added_count, 1);
    assert_eq!(stats.removed_count, 1);
    assert_eq!(stats.avg_length, Some(10.0));
    assert_eq!(stats.avg_weight, Some(20.0));
    assert_eq!(stats.total_weight, Some(20.0));
    assert_eq!(stats.max_time_diff, Some(86_400.0));

    // Two coils, one still active
    repo.reset().await;
    let start = now - Duration::days(2);
    repo.seed(10.0, 20.0, start + Duration::days(1), None).await;
    repo.seed(15.0, 25.0, start, Some(now - Duration::hours(1))).await;
    let stats = repo.get_statistics(start, now).await.unwrap();
    assert_eq!(stats.added_count, 2);
    assert_eq!(stats.removed_count, 1);
    assert_eq!(stats.avg_length, Some(12.5));
    assert_eq!(stats.avg_weight, Some(22.5));
    assert_eq!(stats.total_weight, Some(45.0));
    assert_eq!(stats.day_max_count, Some(at(2024, 5, 10, 0, 0)));
    assert_eq!(stats.day_min_count, Some(at(2024, 5, 8, 0, 0)));

    // Idempotent
    assert_eq!(stats, repo.get_statistics(start, now).await.unwrap());

    // Removals only: the empty shape, including removed_count
    let quiet_start = now - Duration::hours(2);
    let stats = repo.get_statistics(quiet_start, now).await.unwrap();
    assert!(stats.is_empty());
    assert_eq!(stats.removed_count, 0);
}

pub async fn check_statistics_ignore_later_arrivals<R: SeedCoils>(repo: &R) {
    repo.reset().await;

    let start = at(2024, 7, 1, 0, 0);
    let end = at(2024, 7, 3, 0, 0);
    repo.seed(10.0, 10.0, at(2024, 7, 1, 6, 0), None).await;
    let baseline = repo.get_statistics(start, end).await.unwrap();

    repo.seed(999.0, 999.0, at(2024, 8, 1, 0, 0), None).await;
    assert_eq!(repo.get_statistics(start, end).await.unwrap(), baseline);
}

pub async fn check_instants_stored_at_microseconds<R: SeedCoils>(repo: &R) {
    repo.reset().await;

    let added = at(2024, 4, 1, 9, 0) + Duration::nanoseconds(1_234_567);
    let removed = added + Duration::hours(1);
    let seeded = repo.seed(1.0, 2.0, added, Some(removed)).await;
    assert_eq!(seeded.date_added, at(2024, 4, 1, 9, 0) + Duration::microseconds(1_234));
    assert_eq!(
        seeded.date_removed,
        Some(at(2024, 4, 1, 10, 0) + Duration::microseconds(1_234))
    );

    let active = repo.seed(1.0, 2.0, at(2024, 4, 1, 9, 0), None).await;
    let removed = repo
        .remove_coil(active.id, Some(at(2024, 4, 2, 0, 0) + Duration::nanoseconds(999)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.date_removed, Some(at(2024, 4, 2, 0, 0)));

    let listed = repo.list_coils(&CoilFilter::new()).await.unwrap();
    assert_eq!(listed, vec![seeded, removed]);
}

/// Run the whole contract against one repository.
pub async fn run_repository_contract<R: SeedCoils>(repo: &R) {
    check_create_and_remove(repo).await;
    check_ids_increase(repo).await;
    check_remove_at_explicit_time(repo).await;
    check_list_filters(repo).await;
    check_statistics_scenarios(repo).await;
    check_statistics_ignore_later_arrivals(repo).await;
    check_instants_stored_at_microseconds(repo).await;
}
