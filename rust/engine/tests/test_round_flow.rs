mod helpers;

use alea_engine::bankroll::INITIAL_BANKROLL;
use alea_engine::dice::Face::{self, *};
use alea_engine::errors::GameError;
use alea_engine::hand::{HandRank, Outcome};
use alea_engine::impulse::RollRequest;
use alea_engine::roll::RollState;
use alea_engine::round::{Phase, ROLLS_PER_ROUND, RoundConfig};

use helpers::{HoldAll, HoldNothing, Rig, parse};

const FILLER: [Face; 5] = [Nine, Ten, Jack, Queen, Ace];

fn opponent_rolls(last: [Face; 5]) -> Vec<Face> {
    let mut v = Vec::new();
    v.extend_from_slice(&FILLER);
    v.extend_from_slice(&FILLER);
    v.extend_from_slice(&last);
    v
}

fn seated(table: &str, opponent: &[Face]) -> Rig {
    let mut rig = Rig::new(Box::new(HoldNothing), opponent);
    assert_eq!(rig.machine.select_table(table), Ok(true));
    rig
}

#[test]
fn rolls_count_down_and_third_roll_scores() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    assert_eq!(rig.machine.state().rolls_remaining, ROLLS_PER_ROUND);

    rig.queue_all(FILLER);
    rig.roll();
    assert_eq!(rig.machine.state().rolls_remaining, 2);
    assert_eq!(rig.machine.state().phase, Phase::Rolling);

    rig.queue_all(FILLER);
    rig.roll();
    assert_eq!(rig.machine.state().rolls_remaining, 1);

    rig.queue_all(parse("A A A A K"));
    rig.roll();
    let s = rig.machine.state();
    assert_eq!(s.rolls_remaining, 0);
    assert_eq!(s.phase, Phase::Scoring);
    assert_eq!(s.current_hand.as_ref().unwrap().rank, HandRank::FourOfAKind);
    assert_eq!(s.round_outcome, Some(Outcome::Win));

    // no fourth roll
    assert!(!rig.machine.place_bet_and_roll(RollRequest::default()));
}

#[test]
fn winning_credits_payout_once() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    rig.play_round([FILLER, FILLER, parse("A A A A K")]);
    let s = rig.machine.state();
    assert_eq!(s.bankroll.balance(), INITIAL_BANKROLL - 10 + 20);
    assert_eq!(s.last_win, 20);
}

#[test]
fn tie_refunds_the_bet() {
    let mut rig = seated("silver", &opponent_rolls(parse("A K Q J 10")));
    rig.play_round([FILLER, FILLER, parse("10 J Q K A")]);
    let s = rig.machine.state();
    assert_eq!(s.round_outcome, Some(Outcome::Tie));
    assert_eq!(s.bankroll.balance(), INITIAL_BANKROLL);
    assert_eq!(s.last_win, 0);
}

#[test]
fn four_of_a_kind_beats_a_higher_full_house() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 9 9 9 10")));
    rig.play_round([FILLER, FILLER, parse("A A A K K")]);
    let s = rig.machine.state();
    assert_eq!(s.round_outcome, Some(Outcome::Lose));
    assert_eq!(s.bankroll.balance(), INITIAL_BANKROLL - 10);
    assert_eq!(s.opponent_hand.as_ref().unwrap().rank, HandRank::FourOfAKind);
}

#[test]
fn free_table_pays_fixed_amount_without_a_bet() {
    let mut rig = seated("free", &opponent_rolls(parse("9 10 J Q A")));
    rig.play_round([FILLER, FILLER, parse("K K 9 10 J")]);
    let s = rig.machine.state();
    assert_eq!(s.round_outcome, Some(Outcome::Win));
    assert_eq!(s.bankroll.balance(), INITIAL_BANKROLL + 5);
}

#[test]
fn hold_toggle_needs_a_completed_roll() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    assert!(!rig.machine.toggle_hold(0), "betting phase");

    rig.queue_all(FILLER);
    assert!(rig.machine.place_bet_and_roll(RollRequest::default()));
    assert!(!rig.machine.toggle_hold(0), "nothing has settled yet");
    assert!(!rig.machine.state().dice[0].held);
    assert!(rig.run_until_idle());

    assert!(rig.machine.toggle_hold(0));
    assert!(rig.machine.state().dice[0].held);
    assert!(rig.machine.toggle_hold(0));
    assert!(!rig.machine.state().dice[0].held);
    assert!(!rig.machine.toggle_hold(7), "no such die");
}

#[test]
fn held_dice_keep_their_faces_across_rolls() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    rig.queue_all(parse("A A 9 10 J"));
    rig.roll();
    assert!(rig.machine.toggle_hold(0));
    assert!(rig.machine.toggle_hold(1));

    rig.queue([None, None, Some(Ace), Some(King), Some(King)]);
    rig.roll();
    let s = rig.machine.state();
    assert_eq!(s.player_faces(), parse("A A A K K"));
    assert_eq!(rig.bodies[0].launches, 1);
    assert_eq!(rig.bodies[2].launches, 2);
    assert_eq!(rig.machine.controllers()[0].state(), RollState::Held);
    assert_eq!(
        rig.machine.held_hand().map(|h| h.rank),
        Some(HandRank::OnePair)
    );
}

#[test]
fn rolling_with_every_die_held_still_finishes() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    rig.queue_all(parse("Q Q Q Q Q"));
    rig.roll();
    for i in 0..5 {
        assert!(rig.machine.toggle_hold(i));
    }
    rig.roll();
    assert_eq!(rig.machine.state().rolls_remaining, 1);
    assert_eq!(
        rig.machine.state().current_hand.as_ref().unwrap().rank,
        HandRank::FiveOfAKind
    );
}

#[test]
fn rolls_are_refused_while_dice_or_opponent_are_busy() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    rig.queue_all(FILLER);
    assert!(rig.machine.place_bet_and_roll(RollRequest::default()));
    assert!(!rig.machine.place_bet_and_roll(RollRequest::default()));

    // run past the finish step into the opponent's spin
    while !rig.machine.state().opponent_resolving {
        rig.step();
    }
    assert!(!rig.machine.state().is_rolling);
    assert!(!rig.machine.place_bet_and_roll(RollRequest::default()));
    assert!(rig.run_until_idle());
    rig.queue_all(FILLER);
    assert!(rig.machine.place_bet_and_roll(RollRequest::default()));
}

#[test]
fn roll_without_a_table_is_ignored() {
    let mut rig = Rig::new(Box::new(HoldNothing), &[]);
    assert!(!rig.machine.place_bet_and_roll(RollRequest::default()));
    assert_eq!(rig.machine.state().phase, Phase::Betting);
}

#[test]
fn broke_player_cannot_start_a_paid_round() {
    let config = RoundConfig {
        initial_bankroll: 10,
        ..RoundConfig::default()
    };
    let mut rig = Rig::with_config(config, Box::new(HoldNothing), &opponent_rolls(parse("A A A A A")));
    assert_eq!(rig.machine.select_table("silver"), Ok(false));
    assert_eq!(rig.machine.select_table("bronze"), Ok(true));
    rig.play_round([FILLER, FILLER, FILLER]);
    assert_eq!(rig.machine.state().bankroll.balance(), 0);

    rig.machine.new_round();
    assert!(!rig.machine.place_bet_and_roll(RollRequest::default()));
    assert_eq!(rig.machine.state().phase, Phase::Betting);
    assert_eq!(rig.machine.select_table("free"), Ok(true));
    assert!(rig.machine.place_bet_and_roll(RollRequest::default()));
}

#[test]
fn table_selection_rules() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    assert_eq!(
        rig.machine.select_table("diamond"),
        Err(GameError::UnknownTable("diamond".into()))
    );
    rig.queue_all(FILLER);
    rig.roll();
    assert_eq!(rig.machine.select_table("gold"), Ok(false));
    assert_eq!(rig.machine.state().selected_table.as_deref(), Some("bronze"));
    assert_eq!(rig.machine.state().current_bet, 10);
}

#[test]
fn stale_reveal_after_new_round_changes_nothing() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    rig.queue_all(FILLER);
    assert!(rig.machine.place_bet_and_roll(RollRequest::default()));
    while !rig.machine.state().opponent_resolving {
        rig.step();
    }
    let old_round = rig.machine.state().round_id;
    rig.machine.new_round();
    rig.run_for(2.0);

    let s = rig.machine.state();
    assert_eq!(s.round_id, old_round + 1);
    assert_eq!(s.phase, Phase::Betting);
    assert_eq!(s.rolls_remaining, ROLLS_PER_ROUND);
    assert!(s.opponent_hand.is_none());
    assert!(s.current_hand.is_none());
    assert!(s.round_outcome.is_none());
    assert!(s.dice.iter().all(|d| d.face == Ace && !d.held));
    assert!(s.opponent_dice.iter().all(|d| d.face == Ace && !d.held));
    assert_eq!(s.bankroll.balance(), INITIAL_BANKROLL - 10);
}

#[test]
fn stale_reveal_after_returning_to_lobby_changes_nothing() {
    use alea_engine::events::RoundEvent;

    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    let mut sub = rig.machine.subscribe();
    rig.queue_all(FILLER);
    assert!(rig.machine.place_bet_and_roll(RollRequest::default()));
    while !rig.machine.state().opponent_resolving {
        rig.step();
    }
    let old_round = rig.machine.state().round_id;
    sub.drain();
    rig.machine.return_to_lobby();
    rig.run_for(2.0);

    let s = rig.machine.state();
    assert_eq!(s.round_id, old_round + 1);
    assert_eq!(s.phase, Phase::Betting);
    assert_eq!(s.selected_table, None);
    assert_eq!(s.current_bet, 0);
    assert_eq!(s.rolls_remaining, ROLLS_PER_ROUND);
    assert!(!s.opponent_resolving);
    assert!(s.opponent_hand.is_none());
    assert!(s.round_outcome.is_none());
    assert!(s.opponent_dice.iter().all(|d| d.face == Ace && !d.held));
    assert_eq!(s.bankroll.balance(), INITIAL_BANKROLL - 10);
    assert!(rig.machine.is_idle());

    let events = sub.drain();
    assert_eq!(events, vec![RoundEvent::ReturnedToLobby]);
}

#[test]
fn opponent_holds_follow_the_strategy() {
    let mut rig = Rig::new(Box::new(HoldAll), &parse("K K K 9 10"));
    assert_eq!(rig.machine.select_table("bronze"), Ok(true));
    rig.queue_all(FILLER);
    rig.roll();
    let s = rig.machine.state();
    assert_eq!(s.opponent_faces(), parse("K K K 9 10"));
    assert!(s.opponent_dice.iter().all(|d| d.held));

    // held opponent dice are not rerolled, so the roller is never asked again
    rig.queue_all(FILLER);
    rig.roll();
    assert_eq!(rig.machine.state().opponent_faces(), parse("K K K 9 10"));
}

#[test]
fn lobby_and_bankroll_resets() {
    let mut rig = seated("gold", &opponent_rolls(parse("A A A A A")));
    rig.play_round([FILLER, FILLER, FILLER]);
    assert_eq!(rig.machine.state().bankroll.balance(), INITIAL_BANKROLL - 250);

    rig.machine.return_to_lobby();
    let s = rig.machine.state();
    assert_eq!(s.selected_table, None);
    assert_eq!(s.current_bet, 0);
    assert_eq!(s.phase, Phase::Betting);
    assert_eq!(s.bankroll.balance(), INITIAL_BANKROLL - 250);

    rig.machine.reset_bankroll();
    assert_eq!(rig.machine.state().bankroll.balance(), INITIAL_BANKROLL);
}

#[test]
fn new_round_keeps_table_and_bankroll() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    rig.play_round([FILLER, FILLER, parse("A A A A K")]);
    let bankroll = rig.machine.state().bankroll;
    rig.machine.new_round();
    let s = rig.machine.state();
    assert_eq!(s.bankroll, bankroll);
    assert_eq!(s.selected_table.as_deref(), Some("bronze"));
    assert_eq!(s.last_win, 0);
    assert!(
        rig.machine
            .controllers()
            .iter()
            .all(|c| c.state() == RollState::Parked)
    );
}

#[test]
fn scored_round_leaves_a_record() {
    let mut rig = seated("bronze", &opponent_rolls(parse("9 10 J Q A")));
    rig.play_round([FILLER, parse("K K K 9 9"), parse("A A A A K")]);
    let rec = rig.machine.last_record().expect("record");
    assert_eq!(rec.rolls.len(), 3);
    assert_eq!(rec.rolls[1], parse("K K K 9 9"));
    assert_eq!(rec.player_hand, HandRank::FourOfAKind);
    assert_eq!(rec.opponent_hand, HandRank::HighCard);
    assert_eq!(rec.outcome, Outcome::Win);
    assert_eq!(rec.payout, 20);
    assert_eq!(rec.net(), 10);
    assert_eq!(rec.table, "bronze");
}

#[test]
fn events_follow_the_roll_lifecycle() {
    use alea_engine::events::RoundEvent;

    let mut rig = Rig::new(Box::new(HoldNothing), &opponent_rolls(parse("9 10 J Q A")));
    let mut sub = rig.machine.subscribe();
    assert_eq!(rig.machine.select_table("bronze"), Ok(true));
    rig.queue_all(parse("K K K 9 9"));
    rig.roll();
    assert!(rig.machine.toggle_hold(3));

    let events = sub.drain();
    assert!(matches!(events[0], RoundEvent::TableSelected { bet: 10, .. }));
    assert!(matches!(
        events[1],
        RoundEvent::RollStarted { roll_id: 1, rolls_remaining: 3, ref dice, .. } if dice.len() == 5
    ));
    let settled = events
        .iter()
        .filter(|e| matches!(e, RoundEvent::DieSettled { .. }))
        .count();
    assert_eq!(settled, 5);
    let tail: Vec<&RoundEvent> = events.iter().skip(2 + settled).collect();
    assert!(matches!(
        tail[0],
        RoundEvent::PlayerHandEvaluated { rolls_remaining: 2, .. }
    ));
    assert!(matches!(tail[1], RoundEvent::OpponentRevealed { .. }));
    assert_eq!(*tail[2], RoundEvent::HoldToggled { die: 3, held: true });
    assert_eq!(tail.len(), 3);
}
