use std::sync::Arc;

use catalog::{Catalog, CatalogItem, UnlockRequirement, rules::default_rules};
use frequency::{
    database::MemoryProgressStore,
    engine::UnlockEngine,
    error::AppError,
    evaluator::Submission,
};

fn test_engine() -> UnlockEngine {
    let items = vec![
        CatalogItem {
            id: "liner-notes".to_string(),
            name: "Liner Notes".to_string(),
            unlock_requirement: UnlockRequirement::Free,
            score_required: 0,
        },
        CatalogItem {
            id: "earl-analysis-collection".to_string(),
            name: "Earl Analysis Collection".to_string(),
            unlock_requirement: UnlockRequirement::GameScore,
            score_required: 150,
        },
        CatalogItem {
            id: "vinyl-pressing".to_string(),
            name: "Vinyl Pressing".to_string(),
            unlock_requirement: UnlockRequirement::Purchase,
            score_required: 0,
        },
    ];

    UnlockEngine::new(
        Arc::new(MemoryProgressStore::default()),
        Catalog::from_parts(items, default_rules()),
    )
}

fn submission(score: u32, play_time: u32) -> Submission {
    Submission {
        score,
        play_time,
        perfect_matches: None,
    }
}

#[tokio::test]
async fn test_first_submission_below_thresholds() {
    let engine = test_engine();

    let outcome = engine
        .submit_score("s1", submission(80, 20))
        .await
        .unwrap();

    assert_eq!(outcome.score, 80);
    assert_eq!(outcome.best_score, 80);
    assert_eq!(outcome.games_played, 1);
    assert_eq!(outcome.total_play_time, 20);
    assert!(outcome.new_unlocks.is_empty());
    assert!(outcome.new_achievements.is_empty());
}

#[tokio::test]
async fn test_qualifying_score_unlocks_item_once() {
    let engine = test_engine();

    engine.submit_score("s1", submission(80, 20)).await.unwrap();
    let outcome = engine
        .submit_score("s1", submission(150, 10))
        .await
        .unwrap();

    let ids: Vec<&str> = outcome.new_unlocks.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, ["earl-analysis-collection"]);

    let status = engine
        .unlock_status("s1", "earl-analysis-collection")
        .await
        .unwrap();
    assert!(status.is_unlocked);
    assert_eq!(status.reason, "Unlocked through gameplay");

    // Re-qualifying must not grant again.
    let repeat = engine
        .submit_score("s1", submission(180, 10))
        .await
        .unwrap();
    assert!(repeat.new_unlocks.is_empty());
    assert_eq!(repeat.all_unlocks, ["earl-analysis-collection"]);
}

#[tokio::test]
async fn test_lower_score_keeps_best_and_counts_game() {
    let engine = test_engine();

    engine.submit_score("s1", submission(80, 20)).await.unwrap();
    engine.submit_score("s1", submission(150, 10)).await.unwrap();
    let outcome = engine
        .submit_score("s1", submission(120, 5))
        .await
        .unwrap();

    assert_eq!(outcome.best_score, 150);
    assert_eq!(outcome.games_played, 3);
    assert_eq!(outcome.total_play_time, 35);
    assert!(outcome.new_unlocks.is_empty());
}

#[tokio::test]
async fn test_achievements_granted_once_in_order() {
    let engine = test_engine();

    let outcome = engine
        .submit_score("s1", submission(160, 10))
        .await
        .unwrap();

    let names: Vec<&str> = outcome
        .new_achievements
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, ["Cosmic Cadet", "Frequency Master"]);

    let repeat = engine
        .submit_score("s1", submission(160, 10))
        .await
        .unwrap();
    assert!(repeat.new_achievements.is_empty());
    assert_eq!(repeat.achievements.len(), 2);
}

#[tokio::test]
async fn test_games_played_rule_fires_exactly_on_fifth() {
    let engine = test_engine();

    for _ in 0..4 {
        let outcome = engine.submit_score("s1", submission(0, 0)).await.unwrap();
        assert!(
            !outcome
                .new_achievements
                .iter()
                .any(|a| a.name == "Dedicated Explorer")
        );
    }

    let fifth = engine.submit_score("s1", submission(0, 0)).await.unwrap();
    assert_eq!(fifth.games_played, 5);
    assert!(
        fifth
            .new_achievements
            .iter()
            .any(|a| a.name == "Dedicated Explorer")
    );

    let sixth = engine.submit_score("s1", submission(0, 0)).await.unwrap();
    assert!(
        !sixth
            .new_achievements
            .iter()
            .any(|a| a.name == "Dedicated Explorer")
    );
}

#[tokio::test]
async fn test_unknown_session_reports_zeros() {
    let engine = test_engine();

    let summary = engine.progress_summary("never-seen").await.unwrap();

    assert_eq!(summary.best_score, 0);
    assert_eq!(summary.games_played, 0);
    assert!(summary.unlocked_items.is_empty());
    assert!(summary.achievements.is_empty());
    assert!(summary.last_active.is_none());
}

#[tokio::test]
async fn test_free_item_unlocked_without_progress_record() {
    let engine = test_engine();

    let status = engine.unlock_status("s2", "liner-notes").await.unwrap();

    assert!(status.is_unlocked);
    assert_eq!(status.reason, "Always available");

    // The check must not have created a record.
    let summary = engine.progress_summary("s2").await.unwrap();
    assert_eq!(summary.games_played, 0);
    assert!(summary.last_active.is_none());
}

#[tokio::test]
async fn test_purchase_item_never_game_unlocked() {
    let engine = test_engine();

    engine.submit_score("s1", submission(500, 10)).await.unwrap();
    let status = engine.unlock_status("s1", "vinyl-pressing").await.unwrap();

    assert!(!status.is_unlocked);
    assert_eq!(status.reason, "Available for purchase");
    assert_eq!(status.current_score, 500);
}

#[tokio::test]
async fn test_locked_reason_names_required_score() {
    let engine = test_engine();

    let status = engine
        .unlock_status("s1", "earl-analysis-collection")
        .await
        .unwrap();

    assert!(!status.is_unlocked);
    assert_eq!(
        status.reason,
        "Score 150 points in Frequency Match to unlock"
    );
    assert_eq!(status.score_required, 150);
    assert_eq!(status.current_score, 0);
}

#[tokio::test]
async fn test_unknown_item_is_not_found() {
    let engine = test_engine();

    let result = engine.unlock_status("s1", "missing").await;

    assert!(matches!(result, Err(AppError::ItemNotFound)));
}

#[tokio::test]
async fn test_concurrent_submissions_merge() {
    let engine = Arc::new(test_engine());

    let a = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.submit_score("s1", submission(100, 10)).await })
    };
    let b = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.submit_score("s1", submission(150, 10)).await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let summary = engine.progress_summary("s1").await.unwrap();
    assert_eq!(summary.best_score, 150);
    assert_eq!(summary.games_played, 2);
    assert_eq!(summary.total_play_time, 20);
    assert_eq!(summary.unlocked_items, ["earl-analysis-collection"]);
}
