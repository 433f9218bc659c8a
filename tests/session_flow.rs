use std::collections::BTreeSet;
use std::path::Path;

use blankquiz::{Action, Banks, CheckResult, Phase, SessionState};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn demo_banks() -> Banks {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    Banks::load(&root.join("problems.json"), &root.join("answers.json")).unwrap()
}

fn started(banks: &Banks, count: usize, rng: &mut StdRng) -> SessionState {
    SessionState::new()
        .apply(Action::SelectType("Forklift".into()), banks, rng)
        .apply(Action::StartQuiz(count), banks, rng)
}

/// Answers every question, getting every `miss_every`-th one wrong.
fn play_pass(
    mut state: SessionState,
    banks: &Banks,
    rng: &mut StdRng,
    miss_every: usize,
) -> SessionState {
    let mut judged = 0;
    while state.phase() == Phase::InProgress {
        let question = state.current_question(banks).unwrap().clone();
        let miss = (judged + 1) % miss_every == 0;
        for (blank, answer) in question.answers.iter().enumerate() {
            let value = if miss {
                String::from("?")
            } else {
                // extra whitespace must not matter
                format!("  {} ", answer.replace(' ', "   "))
            };
            state = state.apply(Action::RecordInput { blank, value }, banks, rng);
        }
        state = state.apply(Action::CheckAnswer, banks, rng);
        judged += 1;

        assert!(state.score() <= state.answered());
        assert_eq!(state.answered(), judged);
        assert!(state.answered() <= state.pool().len());

        state = state.apply(Action::NextQuestion, banks, rng);
    }
    state
}

#[test]
fn demo_pass_scores_and_collects_wrong_notes() {
    let banks = demo_banks();
    let mut rng = StdRng::seed_from_u64(2024);
    let state = started(&banks, 6, &mut rng);
    assert_eq!(state.pool().len(), 6);

    let state = play_pass(state, &banks, &mut rng, 3);
    assert_eq!(state.phase(), Phase::Finished);
    assert_eq!(state.score(), 4);
    assert_eq!(state.wrong_notes().len(), 2);
    assert!((state.accuracy() - 4.0 / 6.0).abs() < f64::EPSILON);
}

#[test]
fn requesting_more_than_available_uses_whole_bank() {
    let banks = demo_banks();
    let mut rng = StdRng::seed_from_u64(1);
    let state = started(&banks, 1_000, &mut rng);

    let pool: BTreeSet<&str> = state.pool().iter().map(String::as_str).collect();
    let all: BTreeSet<&str> = banks.ids().collect();
    assert_eq!(pool, all);
}

#[test]
fn retry_replays_only_missed_questions() {
    let banks = demo_banks();
    let mut rng = StdRng::seed_from_u64(77);
    let state = play_pass(started(&banks, 5, &mut rng), &banks, &mut rng, 2);
    let missed: BTreeSet<String> = state.wrong_notes().iter().map(|n| n.id.clone()).collect();
    assert_eq!(missed.len(), 2);

    let retry = state.apply(Action::StartWrongQuiz, &banks, &mut rng);
    assert_eq!(retry.phase(), Phase::InProgress);
    assert!(retry.wrong_notes().is_empty());
    assert_eq!(retry.pool().iter().cloned().collect::<BTreeSet<_>>(), missed);

    // the new pass records its own notes only
    let retry = retry.apply(Action::CheckAnswer, &banks, &mut rng);
    assert_eq!(retry.result(), CheckResult::Incorrect);
    assert_eq!(retry.wrong_notes().len(), 1);
}

#[test]
fn clean_pass_then_retry_finishes_at_once() {
    let banks = demo_banks();
    let mut rng = StdRng::seed_from_u64(5);
    let state = play_pass(started(&banks, 3, &mut rng), &banks, &mut rng, usize::MAX);
    assert!(state.wrong_notes().is_empty());
    assert_eq!(state.score(), 3);

    let retry = state.apply(Action::StartWrongQuiz, &banks, &mut rng);
    assert_eq!(retry.phase(), Phase::Finished);
    assert_eq!(retry.pool().len(), 0);
    assert_eq!(retry.accuracy(), 0.0);

    let again = retry.apply(Action::Restart, &banks, &mut rng);
    assert_eq!(again.phase(), Phase::SelectCount);
}
