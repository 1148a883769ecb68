use super::common::{application, minute, seed};
use crate::memory::MemoryApplicationStore;
use crate::workflows::admissions::{
    ApplicationId, ApplicationStatus, ApplicationStore, ApplicationWrite, StoreError, WriteBatch,
    WriteGuard, RELEASED_NOTE,
};

#[tokio::test]
async fn failed_guard_leaves_every_record_untouched() {
    let store = MemoryApplicationStore::default();
    seed(
        &store,
        application(
            "app-1",
            "stu-1",
            "inst-a",
            "crs-a",
            ApplicationStatus::Admitted,
            minute(0),
        ),
    )
    .await;
    seed(
        &store,
        application(
            "app-2",
            "stu-1",
            "inst-b",
            "crs-b",
            ApplicationStatus::Admitted,
            minute(0),
        ),
    )
    .await;
    seed(
        &store,
        application(
            "app-3",
            "stu-9",
            "inst-b",
            "crs-b",
            ApplicationStatus::Waiting,
            minute(1),
        ),
    )
    .await;

    // Confirm + release + promote batch whose first guard is stale.
    let batch = WriteBatch {
        guards: vec![
            WriteGuard::StatusIs {
                id: ApplicationId("app-1".to_string()),
                expected: ApplicationStatus::Pending,
            },
            WriteGuard::StatusIs {
                id: ApplicationId("app-2".to_string()),
                expected: ApplicationStatus::Admitted,
            },
            WriteGuard::StatusIs {
                id: ApplicationId("app-3".to_string()),
                expected: ApplicationStatus::Waiting,
            },
        ],
        writes: vec![
            ApplicationWrite::SetStatus {
                id: ApplicationId("app-1".to_string()),
                to: ApplicationStatus::Confirmed,
                note: None,
                updated_at: minute(10),
            },
            ApplicationWrite::SetStatus {
                id: ApplicationId("app-2".to_string()),
                to: ApplicationStatus::Rejected,
                note: Some(RELEASED_NOTE.to_string()),
                updated_at: minute(10),
            },
            ApplicationWrite::SetStatus {
                id: ApplicationId("app-3".to_string()),
                to: ApplicationStatus::Admitted,
                note: None,
                updated_at: minute(10),
            },
        ],
    };

    let outcome = store.commit(batch).await;
    match outcome {
        Err(StoreError::Precondition(WriteGuard::StatusIs { id, expected })) => {
            assert_eq!(id, ApplicationId("app-1".to_string()));
            assert_eq!(expected, ApplicationStatus::Pending);
        }
        other => panic!("expected a precondition rejection, got {other:?}"),
    }

    for (id, status) in [
        ("app-1", ApplicationStatus::Admitted),
        ("app-2", ApplicationStatus::Admitted),
        ("app-3", ApplicationStatus::Waiting),
    ] {
        let record = store
            .fetch(&ApplicationId(id.to_string()))
            .await
            .expect("fetch")
            .expect("record present");
        assert_eq!(record.status, status, "record {id} status");
        assert_eq!(record.updated_at, record.applied_at, "record {id} timestamp");
        assert!(record.decision_note.is_none(), "record {id} note");
    }
}

#[tokio::test]
async fn guards_passing_commits_the_whole_batch() {
    let store = MemoryApplicationStore::default();
    seed(
        &store,
        application(
            "app-1",
            "stu-1",
            "inst-a",
            "crs-a",
            ApplicationStatus::Admitted,
            minute(0),
        ),
    )
    .await;
    seed(
        &store,
        application(
            "app-2",
            "stu-9",
            "inst-a",
            "crs-a",
            ApplicationStatus::Waiting,
            minute(1),
        ),
    )
    .await;

    let batch = WriteBatch {
        guards: vec![
            WriteGuard::StatusIs {
                id: ApplicationId("app-1".to_string()),
                expected: ApplicationStatus::Admitted,
            },
            WriteGuard::StatusIs {
                id: ApplicationId("app-2".to_string()),
                expected: ApplicationStatus::Waiting,
            },
        ],
        writes: vec![
            ApplicationWrite::SetStatus {
                id: ApplicationId("app-1".to_string()),
                to: ApplicationStatus::Confirmed,
                note: None,
                updated_at: minute(10),
            },
            ApplicationWrite::SetStatus {
                id: ApplicationId("app-2".to_string()),
                to: ApplicationStatus::Admitted,
                note: None,
                updated_at: minute(10),
            },
        ],
    };

    store.commit(batch).await.expect("commit");

    for (id, status) in [
        ("app-1", ApplicationStatus::Confirmed),
        ("app-2", ApplicationStatus::Admitted),
    ] {
        let record = store
            .fetch(&ApplicationId(id.to_string()))
            .await
            .expect("fetch")
            .expect("record present");
        assert_eq!(record.status, status, "record {id} status");
        assert_eq!(record.updated_at, minute(10), "record {id} timestamp");
    }
}
