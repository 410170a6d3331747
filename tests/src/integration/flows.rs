//! # Integration Test Flows
//!
//! Engine, stores, session controller and history reader wired together the
//! way a station runs them.
//!
//! ## Flows Tested:
//!
//! 1. **Operator scenario**: grant, duplicate, invalid, then history
//! 2. **Grant race**: two engines sharing one store, in memory and on disk
//! 3. **Restart**: a grant recorded before a restart still blocks re-entry
//! 4. **Faults**: failed writes leave no trace and the code stays usable
//! 5. **Station**: the console built from files on disk

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use futures::future::join_all;
    use tempfile::tempdir;
    use tokio::io::BufReader;

    use scan_gate::{
        AllowList, DecodeEvent, FaultInjectingStore, FileScanStore, HistoryReader, HistoryView,
        Identifier, InMemoryScanStore, RecordOutcome, ScanDecisionApi, ScanDecisionEngine,
        ScanGateConfig, ScanOutcome, ScanSessionController, ScanStore, SessionPhase,
        MSG_DUPLICATE, MSG_GRANTED, MSG_INVALID,
    };
    use scan_runtime::{build_console, RuntimeConfig};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn allow_list() -> Arc<AllowList> {
        Arc::new(AllowList::new(["A1", "A2", "A3"]))
    }

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    // =============================================================================
    // OPERATOR SCENARIO
    // =============================================================================

    #[tokio::test]
    async fn test_grant_duplicate_invalid_then_history() {
        let config = ScanGateConfig::for_testing();
        let store = Arc::new(InMemoryScanStore::new());
        let engine = ScanDecisionEngine::new(allow_list(), store.clone(), &config);

        let first = engine.decide("A1").await;
        assert_eq!(first.outcome, ScanOutcome::Granted);
        assert_eq!(first.message(), MSG_GRANTED);

        let second = engine.decide("A1").await;
        assert_eq!(second.outcome, ScanOutcome::DeniedDuplicate);
        assert_eq!(second.message(), MSG_DUPLICATE);

        let third = engine.decide("B9").await;
        assert_eq!(third.outcome, ScanOutcome::DeniedInvalid);
        assert_eq!(third.message(), MSG_INVALID);

        let history = HistoryReader::new(store.clone());
        let records = match history.load(3).await {
            HistoryView::Loaded(records) => records,
            other => panic!("expected records, got {:?}", other),
        };
        let seen: Vec<(&str, RecordOutcome)> = records
            .iter()
            .map(|r| (r.identifier.as_str(), r.outcome))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("B9", RecordOutcome::DeniedInvalid),
                ("A1", RecordOutcome::DeniedDuplicate),
                ("A1", RecordOutcome::Granted),
            ]
        );
        assert_eq!(store.granted_count(&id("A1")), 1);
    }

    #[tokio::test]
    async fn test_session_debounce_and_dismiss_over_real_engine() {
        let config = ScanGateConfig::for_testing();
        let store = Arc::new(InMemoryScanStore::new());
        let engine = ScanDecisionEngine::new(allow_list(), store.clone(), &config);
        let controller = ScanSessionController::new(Arc::new(engine), &config);
        let t = Instant::now();

        assert!(controller.submit(DecodeEvent::new("A1", t)).is_accepted());
        let shown = controller.wait_for_result().await.unwrap();
        assert_eq!(shown.outcome, ScanOutcome::Granted);
        assert!(controller.dismiss());

        // Inside the window: never reaches the engine.
        let early = controller.submit(DecodeEvent::new("A2", t + Duration::from_millis(500)));
        assert!(!early.is_accepted());
        assert_eq!(controller.phase(), SessionPhase::Idle);

        assert!(controller
            .submit(DecodeEvent::new("A1", t + Duration::from_millis(2500)))
            .is_accepted());
        let shown = controller.wait_for_result().await.unwrap();
        assert_eq!(shown.outcome, ScanOutcome::DeniedDuplicate);

        assert_eq!(store.len(), 2);
    }

    // =============================================================================
    // GRANT RACE
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_stations_race_for_one_grant() {
        let config = ScanGateConfig::for_testing();
        let store = Arc::new(InMemoryScanStore::new());
        let stations: Vec<Arc<dyn ScanDecisionApi>> = (0..2)
            .map(|_| {
                Arc::new(ScanDecisionEngine::new(allow_list(), store.clone(), &config))
                    as Arc<dyn ScanDecisionApi>
            })
            .collect();

        let handles = (0..64).map(|i| {
            let station = stations[i % 2].clone();
            tokio::spawn(async move { station.decide("A2").await })
        });
        let outcomes: Vec<ScanOutcome> = join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap().outcome)
            .collect();

        let granted = outcomes.iter().filter(|o| o.is_granted()).count();
        let duplicates = outcomes
            .iter()
            .filter(|o| **o == ScanOutcome::DeniedDuplicate)
            .count();
        assert_eq!(granted, 1);
        assert_eq!(duplicates, 63);
        assert_eq!(store.granted_count(&id("A2")), 1);
        assert_eq!(store.len(), 64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_stations_race_on_file_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scans.jsonl");
        let config = ScanGateConfig::for_testing();

        {
            let store = Arc::new(FileScanStore::open(&path).unwrap());
            let stations: Vec<Arc<dyn ScanDecisionApi>> = (0..2)
                .map(|_| {
                    Arc::new(ScanDecisionEngine::new(allow_list(), store.clone(), &config))
                        as Arc<dyn ScanDecisionApi>
                })
                .collect();

            let handles = (0..64).map(|i| {
                let station = stations[i % 2].clone();
                tokio::spawn(async move { station.decide("A2").await })
            });
            let outcomes: Vec<ScanOutcome> = join_all(handles)
                .await
                .into_iter()
                .map(|r| r.unwrap().outcome)
                .collect();

            assert_eq!(outcomes.iter().filter(|o| o.is_granted()).count(), 1);
            assert_eq!(
                outcomes
                    .iter()
                    .filter(|o| **o == ScanOutcome::DeniedDuplicate)
                    .count(),
                63
            );
        }

        let store = FileScanStore::open(&path).unwrap();
        assert_eq!(store.len(), 64);
        assert_eq!(store.granted_identifiers(), 1);

        let records = store.recent(64).await.unwrap();
        let granted = records
            .iter()
            .filter(|r| r.outcome == RecordOutcome::Granted)
            .count();
        assert_eq!(granted, 1);
        let mut ids: Vec<u64> = records.iter().map(|r| r.record_id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 64);
    }

    // =============================================================================
    // RESTART
    // =============================================================================

    #[tokio::test]
    async fn test_grant_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("station").join("scans.jsonl");
        let config = ScanGateConfig::for_testing();

        {
            let store = Arc::new(FileScanStore::open(&path).unwrap());
            let engine = ScanDecisionEngine::new(allow_list(), store, &config);
            assert_eq!(engine.decide("A3").await.outcome, ScanOutcome::Granted);
        }

        let store = Arc::new(FileScanStore::open(&path).unwrap());
        let engine = ScanDecisionEngine::new(allow_list(), store.clone(), &config);
        assert_eq!(
            engine.decide("A3").await.outcome,
            ScanOutcome::DeniedDuplicate
        );

        let records = store.recent(10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcome, RecordOutcome::DeniedDuplicate);
        assert_eq!(records[1].outcome, RecordOutcome::Granted);
        assert!(records[0].record_id > records[1].record_id);
    }

    // =============================================================================
    // FAULTS
    // =============================================================================

    #[tokio::test]
    async fn test_failed_write_is_not_counted() {
        let config = ScanGateConfig::for_testing();
        let store = Arc::new(FaultInjectingStore::new(InMemoryScanStore::new()));
        let engine = ScanDecisionEngine::new(allow_list(), store.clone(), &config);

        store.set_fail_writes(true);
        let failed = engine.decide("A1").await;
        assert_eq!(failed.outcome, ScanOutcome::Error);
        assert!(failed.record.is_none());
        assert!(store.inner().is_empty());

        store.heal();
        assert_eq!(engine.decide("A1").await.outcome, ScanOutcome::Granted);
        assert_eq!(store.inner().len(), 1);
    }

    #[tokio::test]
    async fn test_history_failure_is_reported() {
        let store = Arc::new(FaultInjectingStore::new(InMemoryScanStore::new()));
        store.set_fail_reads(true);
        let history = HistoryReader::new(store);
        assert!(matches!(history.load(20).await, HistoryView::Failed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_store_surfaces_as_error_then_session_recovers() {
        let config = ScanGateConfig::for_testing();
        let store = Arc::new(FaultInjectingStore::new(InMemoryScanStore::new()));
        store.set_stall(Duration::from_secs(30));
        let engine = ScanDecisionEngine::new(allow_list(), store.clone(), &config);
        let controller = ScanSessionController::new(Arc::new(engine), &config);

        controller.submit(DecodeEvent::now("A1"));
        let shown = controller.wait_for_result().await.unwrap();
        assert_eq!(shown.outcome, ScanOutcome::Error);
        assert!(store.inner().is_empty());

        store.heal();
        assert!(controller.dismiss());
        let later = DecodeEvent::new("A1", Instant::now() + Duration::from_secs(3));
        assert!(controller.submit(later).is_accepted());
        let shown = controller.wait_for_result().await.unwrap();
        assert_eq!(shown.outcome, ScanOutcome::Granted);
    }

    // =============================================================================
    // STATION
    // =============================================================================

    #[tokio::test]
    async fn test_station_console_from_files() {
        let dir = tempdir().unwrap();
        let allow_list_path = dir.path().join("valid_uids.json");
        std::fs::write(&allow_list_path, r#"{"uids": ["A1", "A2"]}"#).unwrap();

        let config = RuntimeConfig {
            allow_list_path,
            store_path: dir.path().join("scans.jsonl"),
            gate: ScanGateConfig {
                debounce_window_ms: 0,
                ..ScanGateConfig::for_testing()
            },
        };

        let console = build_console(&config).unwrap();
        let mut output = Vec::new();
        console
            .run(BufReader::new("A1\nagain\nZ7\nagain\nhistory\nquit\n".as_bytes()), &mut output)
            .await
            .unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains(MSG_GRANTED));
        assert!(output.contains(MSG_INVALID));
        drop(console);

        // The log is released on drop and holds both records.
        let store = FileScanStore::open(&config.store_path).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.has_granted_record(&id("A1")).await.unwrap());
    }

    #[test]
    fn test_station_refuses_missing_allow_list() {
        let dir = tempdir().unwrap();
        let config = RuntimeConfig {
            allow_list_path: dir.path().join("missing.json"),
            store_path: dir.path().join("scans.jsonl"),
            gate: ScanGateConfig::for_testing(),
        };
        let err = build_console(&config).err().unwrap();
        assert!(err.to_string().contains("failed to load allow-list"));
    }
}
