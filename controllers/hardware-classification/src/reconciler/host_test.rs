//! Unit tests for the BareMetalHost reconciler

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use crds::{Cpu, HardwareCharacteristics};
    use metal3_client::MockMetal3Client;

    const GOLD: &str = "hardwareclassification.metal3.io/gold";
    const SILVER: &str = "hardwareclassification.metal3.io/silver";

    fn silver() -> HardwareCharacteristics {
        HardwareCharacteristics {
            cpu: Some(Cpu {
                minimum_count: 1,
                maximum_count: 4,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_host_is_a_no_op() {
        let mock = MockMetal3Client::new();
        mock.add_profile(active_profile("gold", valid_characteristics()));

        test_reconciler(&mock)
            .reconcile_host(NAMESPACE, "worker-0")
            .await
            .unwrap();
        assert_eq!(mock.writes().total(), 0);
    }

    #[tokio::test]
    async fn test_all_profiles_applied_in_one_write() {
        let mock = MockMetal3Client::new();
        mock.add_profile(active_profile("gold", valid_characteristics()));
        mock.add_profile(active_profile("silver", silver()));
        mock.add_host(labelled(
            test_host("worker-0", "ready", Some(matching_details())),
            SILVER,
            "matches",
        ));
        let reconciler = test_reconciler(&mock);

        reconciler.reconcile_host(NAMESPACE, "worker-0").await.unwrap();

        assert_eq!(mock.host_label(NAMESPACE, "worker-0", GOLD).as_deref(), Some("matches"));
        assert_eq!(mock.host_label(NAMESPACE, "worker-0", SILVER), None);
        assert_eq!(mock.writes().label_writes, 1);

        mock.reset_writes();
        reconciler.reconcile_host(NAMESPACE, "worker-0").await.unwrap();
        assert_eq!(mock.writes().total(), 0);
    }

    #[tokio::test]
    async fn test_terminating_profile_label_removed_from_any_host() {
        let mock = MockMetal3Client::new();
        mock.add_profile(terminating(active_profile("gold", valid_characteristics())));
        mock.add_host(labelled(test_host("worker-0", "provisioned", None), GOLD, "matches"));

        test_reconciler(&mock)
            .reconcile_host(NAMESPACE, "worker-0")
            .await
            .unwrap();

        assert_eq!(mock.host_label(NAMESPACE, "worker-0", GOLD), None);
    }

    #[tokio::test]
    async fn test_inactive_profiles_leave_labels() {
        let mock = MockMetal3Client::new();
        // No finalizer yet.
        mock.add_profile(test_profile("gold", valid_characteristics()));
        // Invalid: empty characteristics.
        mock.add_profile(active_profile("silver", HardwareCharacteristics::default()));
        mock.add_host(labelled(
            labelled(test_host("worker-0", "ready", Some(small_details())), GOLD, "matches"),
            SILVER,
            "matches",
        ));

        test_reconciler(&mock)
            .reconcile_host(NAMESPACE, "worker-0")
            .await
            .unwrap();

        assert_eq!(mock.host_label(NAMESPACE, "worker-0", GOLD).as_deref(), Some("matches"));
        assert_eq!(mock.host_label(NAMESPACE, "worker-0", SILVER).as_deref(), Some("matches"));
        assert_eq!(mock.writes().total(), 0);
    }

    #[tokio::test]
    async fn test_uninspected_host_never_labelled() {
        let mock = MockMetal3Client::new();
        mock.add_profile(active_profile("gold", valid_characteristics()));
        mock.add_host(test_host("worker-0", "ready", None));

        test_reconciler(&mock)
            .reconcile_host(NAMESPACE, "worker-0")
            .await
            .unwrap();

        assert_eq!(mock.host_label(NAMESPACE, "worker-0", GOLD), None);
        assert_eq!(mock.writes().total(), 0);
    }
}
