#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::db::repositories::LocalRepository;
    use crate::db::repository::{CoilRepository, RepositoryError};
    use crate::db::services;
    use crate::models::{utc_now, CoilFilter, CoilId, NewCoil};

    #[tokio::test]
    async fn test_create_coil_validates_dimensions() {
        let repo = LocalRepository::new();

        for (length, weight) in [(0.0, 1.0), (1.0, 0.0), (-2.0, 5.0), (f64::NAN, 1.0)] {
            let err = services::create_coil(&repo, length, weight)
                .await
                .unwrap_err();
            assert!(
                matches!(err, RepositoryError::ValidationError { .. }),
                "({length}, {weight}) should be rejected, got {err:?}"
            );
        }
        assert_eq!(repo.coil_count(), 0);
    }

    #[tokio::test]
    async fn test_create_coil_sets_date_added_now() {
        let repo = LocalRepository::new();
        let before = utc_now();
        let coil = services::create_coil(&repo, 10.0, 20.0).await.unwrap();
        let after = utc_now();

        assert!(coil.date_removed.is_none());
        assert!(before <= coil.date_added && coil.date_added <= after);
    }

    #[tokio::test]
    async fn test_remove_twice_reports_missing() {
        let repo = LocalRepository::new();
        let coil = services::create_coil(&repo, 10.0, 20.0).await.unwrap();

        let removed = services::remove_coil(&repo, coil.id).await.unwrap().unwrap();
        assert!(removed.date_removed.is_some());
        assert!(services::remove_coil(&repo, coil.id).await.unwrap().is_none());
        assert!(services::remove_coil(&repo, CoilId::new(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_statistics_rejects_reversed_window() {
        let repo = LocalRepository::new();
        let now = utc_now();

        let err = services::get_statistics(&repo, now, now - Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidWindow { .. }));

        // A zero-length window is valid
        assert!(services::get_statistics(&repo, now, now).await.is_ok());
    }

    #[tokio::test]
    async fn test_services_accept_trait_objects() {
        let repo: std::sync::Arc<dyn CoilRepository> = std::sync::Arc::new(LocalRepository::new());
        services::create_coil(repo.as_ref(), 1.0, 2.0).await.unwrap();

        let coils = services::list_coils(repo.as_ref(), &CoilFilter::new())
            .await
            .unwrap();
        assert_eq!(coils.len(), 1);
        assert!(services::health_check(repo.as_ref()).await.unwrap());
    }

    #[tokio::test]
    async fn test_statistics_for_seeded_coils() {
        let repo = LocalRepository::new();
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        repo.insert_coil(
            NewCoil::new(4.0, 8.0).unwrap(),
            start + Duration::hours(2),
            Some(start + Duration::hours(5)),
        )
        .unwrap();

        let stats = services::get_statistics(&repo, start, start + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(stats.added_count, 1);
        assert_eq!(stats.removed_count, 1);
        assert_eq!(stats.max_time_diff, Some(3.0 * 3600.0));
    }
}
