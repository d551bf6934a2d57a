//! REST client and sync queue behavior against a mock backend.

use chrono::Utc;
use focusfarm_core::remote::{
    AuthContext, ProgressPatch, ProgressStore, RestProgressStore, StudySession, SyncOutcome,
    SyncQueue, WriteIntent,
};
use mockito::Matcher;
use uuid::Uuid;

fn auth() -> Option<AuthContext> {
    Some(AuthContext {
        user_id: "u1".into(),
        token: "t0ken".into(),
    })
}

fn sample_session() -> StudySession {
    let started_at = Utc::now();
    StudySession {
        id: Uuid::new_v4(),
        duration_min: 25,
        started_at,
        ended_at: started_at + chrono::Duration::minutes(25),
        leave_count: 0,
        task_name: Some("physics".into()),
        category_id: None,
    }
}

#[tokio::test]
async fn get_progress_returns_existing_row() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/progress")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user_id".into(), "eq.u1".into()),
            Matcher::UrlEncoded("limit".into(), "1".into()),
        ]))
        .match_header("authorization", "Bearer t0ken")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{
                "user_id": "u1",
                "hens": 7, "goats": 2, "cows": 1,
                "today_minutes": 90,
                "last_day_reset": "2026-08-05",
                "daily_goal_claimed": false
            }]"#,
        )
        .create_async()
        .await;

    let store = RestProgressStore::new(&server.url(), auth()).unwrap();
    let counters = store.get_progress().await.unwrap().unwrap();
    assert_eq!(counters.hens, 7);
    assert_eq!(counters.today_minutes, 90);
    // Absent goal targets come back as the defaults.
    assert_eq!(counters.daily_goal_hours, 6.0);
    mock.assert_async().await;
}

#[tokio::test]
async fn first_contact_creates_starter_row() {
    let mut server = mockito::Server::new_async().await;
    let empty = server
        .mock("GET", "/progress")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    let created = server
        .mock("POST", "/progress")
        .match_body(Matcher::PartialJsonString(
            r#"{"user_id": "u1", "hens": 1, "goats": 1, "cows": 1}"#.into(),
        ))
        .with_status(201)
        .create_async()
        .await;

    let store = RestProgressStore::new(&server.url(), auth()).unwrap();
    let counters = store.get_progress().await.unwrap().unwrap();
    assert_eq!((counters.hens, counters.goats, counters.cows), (1, 1, 1));
    empty.assert_async().await;
    created.assert_async().await;
}

#[tokio::test]
async fn unauthenticated_operations_are_noops() {
    // No server at all: a signed-out store must not touch the network.
    let store = RestProgressStore::new("http://127.0.0.1:1", None).unwrap();
    assert!(store.get_progress().await.unwrap().is_none());
    assert!(!store
        .update_progress(&ProgressPatch::default())
        .await
        .unwrap());
    assert!(!store.insert_session(&sample_session()).await.unwrap());
    assert!(store.list_sessions(365).await.unwrap().is_empty());
    assert!(store.list_categories().await.unwrap().is_empty());
    assert!(!store.delete_category(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn insert_session_posts_row() {
    let mut server = mockito::Server::new_async().await;
    let session = sample_session();
    let mock = server
        .mock("POST", "/study_sessions")
        .match_body(Matcher::PartialJsonString(format!(
            r#"{{"user_id": "u1", "id": "{}", "duration_min": 25}}"#,
            session.id
        )))
        .with_status(201)
        .create_async()
        .await;

    let store = RestProgressStore::new(&server.url(), auth()).unwrap();
    assert!(store.insert_session(&session).await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn api_error_surfaces_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PATCH", "/progress")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("expired token")
        .create_async()
        .await;

    let store = RestProgressStore::new(&server.url(), auth()).unwrap();
    let err = store
        .update_progress(&ProgressPatch::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn sync_queue_reports_outcomes_in_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/study_sessions")
        .with_status(201)
        .create_async()
        .await;
    server
        .mock("PATCH", "/progress")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let store = RestProgressStore::new(&server.url(), auth()).unwrap();
    let (queue, mut outcomes) = SyncQueue::spawn(store);
    queue.enqueue(WriteIntent::InsertSession(sample_session()));
    queue.enqueue(WriteIntent::UpdateProgress(ProgressPatch::default()));
    drop(queue);

    let first = outcomes.recv().await.unwrap();
    assert_eq!(
        first,
        SyncOutcome::Completed {
            intent: "insert_session"
        }
    );
    let second = outcomes.recv().await.unwrap();
    match second {
        SyncOutcome::Failed { intent, error } => {
            assert_eq!(intent, "update_progress");
            assert!(error.contains("500"));
        }
        other => panic!("expected a failed outcome, got {other:?}"),
    }
    // Queue dropped and drained: the channel closes.
    assert!(outcomes.recv().await.is_none());
}
