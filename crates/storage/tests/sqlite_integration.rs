use chrono::Duration;
use quiz_core::model::{
    AnswerRecord, QuestionId, ScoreId, ScoreRecord, SessionId, SessionMode, User, UserId,
};
use quiz_core::scoring::percentage;
use quiz_core::time::fixed_now;
use storage::repository::{ScoreRepository, StorageError, UserRepository};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn record(id: &str, user: &str, session: &str, score: u32, minutes: i64) -> ScoreRecord {
    ScoreRecord {
        id: ScoreId::new(id),
        user_id: UserId::new(format!("user_{user}")),
        user_name: user.into(),
        session_id: SessionId::new(session),
        session_name: format!("Session {session}"),
        score,
        total_questions: 3,
        percentage: percentage(score, 3),
        timestamp: fixed_now() + Duration::minutes(minutes),
        mode: if session == SessionId::TEST {
            SessionMode::Test
        } else {
            SessionMode::Quiz
        },
        answers: (0..3)
            .map(|i| AnswerRecord {
                question_id: QuestionId::new(format!("q{i}")),
                user_answer: if i == 2 { None } else { Some(i as usize) },
                correct_answer: Some(0),
                is_correct: i < score,
            })
            .collect(),
    }
}

#[tokio::test]
async fn sqlite_round_trips_scores_with_answers() {
    let repo = connect("memdb_scores_roundtrip").await;
    let original = record("s1", "ali", "adab", 2, 0);
    repo.append_score(&original).await.unwrap();

    let all = repo.list_scores().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], original);
    assert_eq!(all[0].answers[2].user_answer, None);
}

#[tokio::test]
async fn sqlite_rejects_duplicate_score_ids() {
    let repo = connect("memdb_scores_conflict").await;
    repo.append_score(&record("s1", "ali", "adab", 2, 0))
        .await
        .unwrap();
    let err = repo
        .append_score(&record("s1", "ali", "adab", 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
    assert_eq!(repo.list_scores().await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_filters_and_ranks_scores() {
    let repo = connect("memdb_scores_rank").await;
    repo.append_score(&record("a", "ali", "adab", 2, 0)).await.unwrap();
    repo.append_score(&record("b", "abu", "adab", 3, 1)).await.unwrap();
    repo.append_score(&record("c", "siti", "adab", 2, 5)).await.unwrap();
    repo.append_score(&record("d", "ali", "test", 3, 2)).await.unwrap();

    let by_user = repo.scores_by_user("ali").await.unwrap();
    assert_eq!(by_user.len(), 2);

    let by_session = repo.scores_by_session(&SessionId::test()).await.unwrap();
    assert_eq!(by_session.len(), 1);
    assert_eq!(by_session[0].mode, SessionMode::Test);

    let top = repo.top_scores(&SessionId::new("adab"), 10).await.unwrap();
    let ids: Vec<_> = top.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);

    let top_one = repo.top_scores(&SessionId::new("adab"), 1).await.unwrap();
    assert_eq!(top_one.len(), 1);
}

#[tokio::test]
async fn sqlite_users_and_current_pointer() {
    let repo = connect("memdb_users").await;
    let ali = User::new("Ali", fixed_now()).unwrap();
    let abu = User::new("Abu", fixed_now() + Duration::seconds(1)).unwrap();
    repo.upsert_user(&ali).await.unwrap();
    repo.upsert_user(&abu).await.unwrap();

    let mut renamed = ali.clone();
    renamed.rename("Ali Imran").unwrap();
    repo.upsert_user(&renamed).await.unwrap();

    let users = repo.list_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name(), "Ali Imran");
    assert_eq!(users[1].name(), "Abu");

    assert_eq!(repo.current_user().await.unwrap(), None);
    repo.set_current_user(Some(ali.id())).await.unwrap();
    assert_eq!(repo.current_user().await.unwrap().as_ref(), Some(ali.id()));

    repo.delete_user(ali.id()).await.unwrap();
    assert_eq!(repo.current_user().await.unwrap(), None);
    assert!(repo.get_user(ali.id()).await.unwrap().is_none());

    let err = repo
        .set_current_user(Some(&UserId::new("ghost")))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
