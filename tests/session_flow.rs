use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use ellinaki_backend::lexicon::{Level, Lexicon, WordRecord};
use ellinaki_backend::services::daily_practice::{PracticeService, PracticeStatus};
use ellinaki_backend::services::lists::{ListService, LEARNED_LIST_ID, UNSTUDIED_LIST_ID};
use ellinaki_backend::session::{
    CardPhase, MemorySnapshots, PracticeMode, Session, SessionActionError,
};

mod common;

async fn seeded_list(user: &str, words: &[(&str, &str)]) -> (ListService, String) {
    let service = ListService::new(common::test_store());
    let list = service.create_list(user, "Practice").await.expect("create list");
    for (greek, english) in words {
        service
            .add_word(user, &list.id, &WordRecord::new(*greek, *english))
            .await
            .expect("add word");
    }
    (service, list.id)
}

async fn open_session(
    service: &ListService,
    user: &str,
    list_id: &str,
    mode: PracticeMode,
    snapshots: &MemorySnapshots,
    rng: &mut StdRng,
) -> Session {
    let lists = service.get_lists(user).await.expect("lists");
    let list = lists
        .into_iter()
        .find(|list| list.id == list_id)
        .expect("practice list");
    Session::start(user, list, mode, snapshots, Arc::new(Lexicon::seed()), rng)
}

#[tokio::test]
async fn flashcard_run_marks_every_word_and_completes() {
    let user = "session-full-run";
    let words = [("ένα", "one"), ("δύο", "two"), ("τρία", "three")];
    let (service, list_id) = seeded_list(user, &words).await;

    let snapshots = MemorySnapshots::new();
    let mut rng = StdRng::seed_from_u64(11);
    let mut session = open_session(
        &service,
        user,
        &list_id,
        PracticeMode::GreekToEnglish,
        &snapshots,
        &mut rng,
    )
    .await;

    for _ in 0..words.len() {
        assert!(!session.is_complete());
        session.reveal().expect("reveal");
        session
            .mark_current_learned(&service, &snapshots, &mut rng)
            .await
            .expect("mark learned");
    }
    assert!(session.is_complete());
    assert!(session.current_card().is_none());

    let lists = service.get_lists(user).await.expect("lists");
    let learned = lists.iter().find(|list| list.id == LEARNED_LIST_ID).unwrap();
    let learned_keys: HashSet<&str> = learned
        .words
        .iter()
        .map(|word| word.greek.as_str())
        .collect();
    assert_eq!(learned_keys, HashSet::from(["ένα", "δύο", "τρία"]));

    // Reopening finds nothing left to practice.
    let session = open_session(
        &service,
        user,
        &list_id,
        PracticeMode::GreekToEnglish,
        &snapshots,
        &mut rng,
    )
    .await;
    assert!(session.is_complete());
}

#[tokio::test]
async fn mark_learned_is_gated_on_seeing_the_answer() {
    let user = "session-gate";
    let (service, list_id) = seeded_list(user, &[("ένα", "one")]).await;

    let snapshots = MemorySnapshots::new();
    let mut rng = StdRng::seed_from_u64(11);
    let mut session = open_session(
        &service,
        user,
        &list_id,
        PracticeMode::EnglishToGreek,
        &snapshots,
        &mut rng,
    )
    .await;
    assert_eq!(session.prompt_text(), Some("one"));

    let err = session
        .mark_current_learned(&service, &snapshots, &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionActionError::NotAllowed));

    session.reveal().expect("reveal");
    session
        .mark_current_learned(&service, &snapshots, &mut rng)
        .await
        .expect("mark after reveal");
    assert!(session.is_complete());
}

#[tokio::test]
async fn answering_enables_marking_in_multiple_choice() {
    let user = "session-mc";
    let (service, list_id) = seeded_list(user, &[("ένα", "one"), ("δύο", "two")]).await;

    let snapshots = MemorySnapshots::new();
    let mut rng = StdRng::seed_from_u64(11);
    let mut session = open_session(
        &service,
        user,
        &list_id,
        PracticeMode::MultipleChoice,
        &snapshots,
        &mut rng,
    )
    .await;

    let correct = session.current_card().unwrap().english.clone();
    assert!(session.answer(&correct).expect("answer"));
    assert!(matches!(
        session.phase(),
        CardPhase::Answered { correct: true, .. }
    ));
    session
        .mark_current_learned(&service, &snapshots, &mut rng)
        .await
        .expect("mark after answer");
    assert!(!session.is_complete());
    assert_eq!(session.remaining(), 1);
}

#[tokio::test]
async fn options_are_present_and_unique_per_card() {
    let user = "session-options";
    let (service, list_id) =
        seeded_list(user, &[("ένα", "one"), ("δύο", "two"), ("τρία", "three")]).await;

    let snapshots = MemorySnapshots::new();
    let mut rng = StdRng::seed_from_u64(11);
    let mut session = open_session(
        &service,
        user,
        &list_id,
        PracticeMode::MultipleChoice,
        &snapshots,
        &mut rng,
    )
    .await;

    for _ in 0..3 {
        let card = session.current_card().unwrap().clone();
        let options = session.options();
        assert_eq!(options.len(), 3);
        assert!(options.iter().any(|option| option.english == card.english));
        let english: HashSet<&str> =
            options.iter().map(|option| option.english.as_str()).collect();
        assert_eq!(english.len(), options.len());
        session.advance(&snapshots, &mut rng);
    }
}

#[tokio::test]
async fn session_resumes_from_its_snapshot() {
    let user = "session-resume";
    let (service, list_id) =
        seeded_list(user, &[("ένα", "one"), ("δύο", "two"), ("τρία", "three")]).await;

    let snapshots = MemorySnapshots::new();
    let mut rng = StdRng::seed_from_u64(11);
    let mut first = open_session(
        &service,
        user,
        &list_id,
        PracticeMode::GreekToEnglish,
        &snapshots,
        &mut rng,
    )
    .await;
    first.advance(&snapshots, &mut rng);
    let expected = first.current_card().unwrap().greek.clone();

    let second = open_session(
        &service,
        user,
        &list_id,
        PracticeMode::GreekToEnglish,
        &snapshots,
        &mut rng,
    )
    .await;
    assert_eq!(second.current_card().unwrap().greek, expected);
}

#[tokio::test]
async fn list_changes_invalidate_the_snapshot() {
    let user = "session-invalidate";
    let (service, list_id) = seeded_list(user, &[("ένα", "one"), ("δύο", "two")]).await;

    let snapshots = MemorySnapshots::new();
    let mut rng = StdRng::seed_from_u64(11);
    let mut first = open_session(
        &service,
        user,
        &list_id,
        PracticeMode::GreekToEnglish,
        &snapshots,
        &mut rng,
    )
    .await;
    first.advance(&snapshots, &mut rng);

    service
        .add_word(user, &list_id, &WordRecord::new("τρία", "three"))
        .await
        .expect("add word");

    let second = open_session(
        &service,
        user,
        &list_id,
        PracticeMode::GreekToEnglish,
        &snapshots,
        &mut rng,
    )
    .await;
    // A fresh shuffle covers the grown word set from the start.
    assert_eq!(second.remaining(), 3);
}

// Word lists and the daily practice live in separate files behind separate
// locks, with no transaction spanning both. The generators read the learned
// keys, release that lock, then write the practice set, so a word learned in
// between stays in today's stored set until the next regeneration. That
// last-write-wins window is accepted behavior; this test pins it down.
#[tokio::test]
async fn daily_set_keeps_a_word_learned_after_sampling() {
    let user = "practice-stale-set";
    let store = common::test_store();
    let lists = ListService::new(Arc::clone(&store));
    let practice = PracticeService::new(store, lists.clone(), Arc::new(Lexicon::seed()));

    let generated = practice
        .set_level(user, Level::A1)
        .await
        .expect("set level");
    let target = generated.words[0].clone();

    lists
        .add_word(user, UNSTUDIED_LIST_ID, &target)
        .await
        .expect("add word");
    lists
        .mark_learned(user, UNSTUDIED_LIST_ID, &target.greek)
        .await
        .expect("mark learned");
    assert!(lists
        .learned_keys(user)
        .await
        .expect("learned keys")
        .contains(&target.greek));

    // Same day, same level: the stored set is served as-is, learned word
    // included. Only the next regeneration consults the learned keys again.
    let status = practice.get(user).await.expect("practice");
    let PracticeStatus::Ready { practice: today } = status else {
        panic!("expected a ready practice");
    };
    assert!(today.words.iter().any(|word| word.greek == target.greek));
}

#[tokio::test]
async fn learning_points_stay_within_bounds() {
    let user = "session-points";
    let (service, list_id) = seeded_list(user, &[("ένα", "one"), ("δύο", "two")]).await;

    let snapshots = MemorySnapshots::new();
    let mut rng = StdRng::seed_from_u64(11);
    let mut session = open_session(
        &service,
        user,
        &list_id,
        PracticeMode::GreekToEnglish,
        &snapshots,
        &mut rng,
    )
    .await;

    // Five full passes over two words: each card is revealed five times but
    // its counter stops at the cap.
    for _ in 0..10 {
        session.reveal().expect("reveal");
        session.advance(&snapshots, &mut rng);
    }
    for greek in ["ένα", "δύο"] {
        assert_eq!(session.learning_points(greek), 4);
    }
}
