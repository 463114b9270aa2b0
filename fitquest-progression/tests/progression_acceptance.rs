use fitquest_progression::{
    LedgerError, ProgressionState, QuestRewards, RewardEvent, apply_complete_quest, apply_event,
    apply_gain_xp, apply_increment_streak, level_for_xp, xp_to_next_level,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn level_curve_matches_band_formula_across_range() {
    init_logs();
    for xp in 0..5_000u64 {
        assert_eq!(u64::from(level_for_xp(xp)), xp / 1_000 + 1, "xp {xp}");
        assert!(level_for_xp(xp) >= 1);
    }
}

#[test]
fn level_curve_boundaries() {
    assert_eq!(level_for_xp(0), 1);
    assert_eq!(level_for_xp(999), 1);
    assert_eq!(level_for_xp(1_000), 2);
    assert_eq!(level_for_xp(2_500), 3);
}

#[test]
fn xp_and_level_are_monotone_over_gain_sequences() {
    init_logs();
    let mut state = ProgressionState::default();
    let mut last_xp = 0;
    let mut last_level = 1;
    // A varied but deterministic sequence of positive amounts.
    for step in 1..200i64 {
        let amount = (step * 37) % 400 + 1;
        apply_gain_xp(&mut state, amount).unwrap();
        assert!(state.xp_total >= last_xp);
        assert!(state.level >= last_level);
        assert_eq!(state.level, level_for_xp(state.xp_total));
        last_xp = state.xp_total;
        last_level = state.level;
    }
}

#[test]
fn streak_best_invariant_holds_across_event_mixes() {
    init_logs();
    let mut state = ProgressionState {
        streak_current: 3,
        streak_best: 5,
        ..ProgressionState::default()
    };
    let events = [
        RewardEvent::IncrementStreak,
        RewardEvent::GainXp { amount: 50 },
        RewardEvent::IncrementStreak,
        RewardEvent::CompleteQuest {
            quest_id: "q3".to_string(),
            rewards: QuestRewards { xp: 100, coins: 10 },
        },
        RewardEvent::IncrementStreak,
        RewardEvent::IncrementStreak,
    ];
    for event in &events {
        apply_event(&mut state, event).unwrap();
        assert!(state.streak_best >= state.streak_current);
    }
    assert_eq!(state.streak_current, 7);
    assert_eq!(state.streak_best, 7);
}

#[test]
fn fresh_account_quest_completion_scenario() {
    let mut state = ProgressionState::default();
    let outcome = apply_complete_quest(&mut state, "q1", QuestRewards { xp: 200, coins: 20 });
    assert_eq!(state.xp_total, 200);
    assert_eq!(state.level, 1);
    assert_eq!(state.coins_balance, 20);
    assert_eq!(state.quests_completed_count, 1);
    assert_eq!(outcome.xp_awarded, 200);
    assert_eq!(outcome.coins_awarded, 20);
}

#[test]
fn gain_crossing_threshold_levels_up() {
    let mut state = ProgressionState {
        xp_total: 950,
        ..ProgressionState::default()
    };
    state.normalize();
    let outcome = apply_gain_xp(&mut state, 100).unwrap();
    assert_eq!(state.xp_total, 1_050);
    assert_eq!(state.level, 2);
    assert!(outcome.leveled_up());
}

#[test]
fn negative_gain_fails_and_leaves_state_unchanged() {
    let mut state = ProgressionState {
        xp_total: 333,
        coins_balance: 9,
        streak_current: 2,
        streak_best: 2,
        ..ProgressionState::default()
    };
    let before = state.clone();
    let err = apply_gain_xp(&mut state, -5).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount { .. }));
    assert_eq!(state, before);
}

#[test]
fn streak_scenario_three_five() {
    let mut state = ProgressionState {
        streak_current: 3,
        streak_best: 5,
        ..ProgressionState::default()
    };
    apply_increment_streak(&mut state);
    assert_eq!((state.streak_current, state.streak_best), (4, 5));
    apply_increment_streak(&mut state);
    assert_eq!((state.streak_current, state.streak_best), (5, 5));
    apply_increment_streak(&mut state);
    assert_eq!((state.streak_current, state.streak_best), (6, 6));
}

#[test]
fn snapshot_reports_xp_to_next_level() {
    let mut state = ProgressionState::default();
    apply_gain_xp(&mut state, 950).unwrap();
    assert_eq!(state.snapshot().xp_to_next_level, 50);
    apply_gain_xp(&mut state, 50).unwrap();
    // Exactly at the threshold a full band remains.
    assert_eq!(state.snapshot().xp_to_next_level, 1_000);
    assert_eq!(xp_to_next_level(state.xp_total), 1_000);
}

#[test]
fn loose_payload_amounts_are_validated_end_to_end() {
    let mut state = ProgressionState::default();

    let event = RewardEvent::gain_xp_from(200.0).unwrap();
    apply_event(&mut state, &event).unwrap();
    assert_eq!(state.xp_total, 200);

    assert!(RewardEvent::gain_xp_from(12.5).is_err());
    assert!(RewardEvent::gain_coins_from(f64::INFINITY).is_err());

    // Integral but negative passes construction and fails application.
    let negative = RewardEvent::gain_coins_from(-10.0).unwrap();
    let before = state.clone();
    assert!(apply_event(&mut state, &negative).is_err());
    assert_eq!(state, before);
}
