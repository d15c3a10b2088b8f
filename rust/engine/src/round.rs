//! The betting / rolling / scoring state machine.
//!
//! [`RoundMachine`] owns the only mutable copy of [`RoundState`]. Callers act
//! on it through a small action surface (`place_bet_and_roll`, `toggle_hold`,
//! `new_round`, `select_table`, ...) and drive time with [`RoundMachine::tick`],
//! which must be called once per simulation step after the physics engine has
//! advanced the five player dice.
//!
//! Actions issued outside their legal window are ignored and return `false`;
//! nothing about a rejected action is an error. Delayed steps (finishing a
//! roll, revealing the opponent) run through a [`Scheduler`] and are tagged
//! with the [`RoundToken`] current when they were queued, so work left over
//! from a superseded round or roll never touches the new one.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bankroll::{Bankroll, INITIAL_BANKROLL};
use crate::dice::{DICE_PER_HAND, DieView, Face, faces_of, fresh_dice};
use crate::errors::GameError;
use crate::events::{EventBus, EventSubscription, RoundEvent};
use crate::hand::{
    HandResult, Outcome, compare_player_vs_opponent, evaluate_hand, evaluate_partial,
};
use crate::impulse::RollRequest;
use crate::logger::RoundRecord;
use crate::physics::DieBody;
use crate::roll::{RollController, RollTuning};
use crate::scheduler::{RoundToken, Scheduler};
use crate::strategy::{FaceRoller, HoldStrategy, SeededRoller, roll_unheld};
use crate::table::{TableCatalog, TableConfig};

pub const ROLLS_PER_ROUND: u8 = 3;
pub const DEFAULT_SEED: u64 = 0xD1CE_5EED;
// Keeps the opponent's face stream independent of the impulse stream.
const OPPONENT_STREAM: u64 = 0x0BB0_4E47;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Betting,
    Rolling,
    Scoring,
}

/// Presentation delays between the steps of a roll, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTiming {
    /// From the last die settling to the player's hand being evaluated
    pub finish_delay: f32,
    /// From the player's hand being evaluated to the opponent's reveal
    pub reveal_delay: f32,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            finish_delay: 0.1,
            reveal_delay: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoundConfig {
    pub seed: u64,
    pub initial_bankroll: u32,
    pub tables: TableCatalog,
    pub timing: RoundTiming,
    pub tuning: RollTuning,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            initial_bankroll: INITIAL_BANKROLL,
            tables: TableCatalog::default(),
            timing: RoundTiming::default(),
            tuning: RollTuning::default(),
        }
    }
}

/// Read model exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: Phase,
    pub rolls_remaining: u8,
    pub bankroll: Bankroll,
    pub current_bet: u32,
    pub selected_table: Option<String>,
    pub dice: [DieView; DICE_PER_HAND],
    pub opponent_dice: [DieView; DICE_PER_HAND],
    pub current_hand: Option<HandResult>,
    pub opponent_hand: Option<HandResult>,
    pub round_outcome: Option<Outcome>,
    /// Payout of the last won round; 0 otherwise
    pub last_win: u32,
    pub round_id: u64,
    pub roll_id: u64,
    /// Player dice are in the air or waiting for the roll to finish
    pub is_rolling: bool,
    /// Opponent dice are spinning before their reveal
    pub opponent_resolving: bool,
}

impl RoundState {
    fn new(bankroll: u32) -> Self {
        Self {
            phase: Phase::Betting,
            rolls_remaining: ROLLS_PER_ROUND,
            bankroll: Bankroll::new(bankroll),
            current_bet: 0,
            selected_table: None,
            dice: fresh_dice(),
            opponent_dice: fresh_dice(),
            current_hand: None,
            opponent_hand: None,
            round_outcome: None,
            last_win: 0,
            round_id: 1,
            roll_id: 0,
            is_rolling: false,
            opponent_resolving: false,
        }
    }

    pub fn player_faces(&self) -> [Face; DICE_PER_HAND] {
        faces_of(&self.dice)
    }

    pub fn opponent_faces(&self) -> [Face; DICE_PER_HAND] {
        faces_of(&self.opponent_dice)
    }

    pub fn held(&self) -> [bool; DICE_PER_HAND] {
        std::array::from_fn(|i| self.dice[i].held)
    }

    /// Hold toggles are accepted right now.
    pub fn can_hold(&self) -> bool {
        self.phase == Phase::Rolling
            && !self.is_rolling
            && self.rolls_remaining < ROLLS_PER_ROUND
            && self.rolls_remaining > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTask {
    FinishRoll,
    RevealOpponent,
}

pub struct RoundMachine {
    config: RoundConfig,
    state: RoundState,
    controllers: [RollController; DICE_PER_HAND],
    scheduler: Scheduler<RoundTask>,
    strategy: Box<dyn HoldStrategy>,
    opponent_roller: Box<dyn FaceRoller>,
    rng: ChaCha20Rng,
    bus: EventBus,
    pending_opponent: Option<[Face; DICE_PER_HAND]>,
    finish_scheduled: bool,
    history: Vec<[Face; DICE_PER_HAND]>,
    last_record: Option<RoundRecord>,
}

impl RoundMachine {
    pub fn new(config: RoundConfig, strategy: Box<dyn HoldStrategy>) -> Self {
        let tuning = config.tuning;
        let mut controllers: [RollController; DICE_PER_HAND] =
            std::array::from_fn(|i| RollController::with_tuning(i, tuning));
        for c in controllers.iter_mut() {
            c.park();
        }
        Self {
            state: RoundState::new(config.initial_bankroll),
            rng: ChaCha20Rng::seed_from_u64(config.seed),
            opponent_roller: Box::new(SeededRoller::new(config.seed ^ OPPONENT_STREAM)),
            controllers,
            scheduler: Scheduler::new(),
            strategy,
            bus: EventBus::new(),
            pending_opponent: None,
            finish_scheduled: false,
            history: Vec::new(),
            last_record: None,
            config,
        }
    }

    /// Replaces the source of opponent face values.
    pub fn with_opponent_roller(mut self, roller: Box<dyn FaceRoller>) -> Self {
        self.opponent_roller = roller;
        self
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn controllers(&self) -> &[RollController; DICE_PER_HAND] {
        &self.controllers
    }

    pub fn scheduler(&self) -> &Scheduler<RoundTask> {
        &self.scheduler
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn subscribe(&self) -> EventSubscription {
        self.bus.subscribe()
    }

    pub fn token(&self) -> RoundToken {
        RoundToken::new(self.state.round_id, self.state.roll_id)
    }

    pub fn selected_table(&self) -> Option<&TableConfig> {
        self.state
            .selected_table
            .as_deref()
            .and_then(|id| self.config.tables.get(id).ok())
    }

    /// Record of the most recently scored round.
    pub fn last_record(&self) -> Option<&RoundRecord> {
        self.last_record.as_ref()
    }

    /// Pattern formed by the held dice, for live display.
    pub fn held_hand(&self) -> Option<HandResult> {
        let held: Vec<Face> = self
            .state
            .dice
            .iter()
            .filter(|d| d.held)
            .map(|d| d.face)
            .collect();
        evaluate_partial(&held)
    }

    /// Nothing is in flight and no deferred step is waiting.
    pub fn is_idle(&self) -> bool {
        !self.state.is_rolling && !self.state.opponent_resolving && self.scheduler.pending() == 0
    }

    /// Chooses a table. Only honoured while betting.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownTable`] when `table_id` is not in the catalog.
    /// Selecting a paid table the bankroll cannot cover is silently refused.
    pub fn select_table(&mut self, table_id: &str) -> Result<bool, GameError> {
        let table = self.config.tables.get(table_id)?.clone();
        if self.state.phase != Phase::Betting {
            debug!(table = table_id, phase = ?self.state.phase, "table change ignored outside betting");
            return Ok(false);
        }
        if !table.can_afford(self.state.bankroll.balance()) {
            debug!(
                table = table_id,
                bet = table.bet,
                bankroll = self.state.bankroll.balance(),
                "table refused, bankroll too small"
            );
            return Ok(false);
        }
        self.state.selected_table = Some(table.id.clone());
        self.state.current_bet = table.bet;
        info!(table = %table.id, bet = table.bet, "table selected");
        self.bus.broadcast(RoundEvent::TableSelected {
            table_id: table.id,
            bet: table.bet,
        });
        Ok(true)
    }

    /// Starts the next roll. From betting this also pays the table's bet.
    pub fn place_bet_and_roll(&mut self, request: RollRequest) -> bool {
        if self.state.is_rolling || self.state.opponent_resolving || self.state.rolls_remaining == 0 {
            debug!(
                rolling = self.state.is_rolling,
                opponent_resolving = self.state.opponent_resolving,
                rolls_remaining = self.state.rolls_remaining,
                "roll request ignored"
            );
            return false;
        }

        if self.state.phase == Phase::Betting && !self.open_round() {
            return false;
        }

        let held_opponent: [bool; DICE_PER_HAND] =
            std::array::from_fn(|i| self.state.opponent_dice[i].held);
        self.pending_opponent = Some(roll_unheld(
            &self.state.opponent_faces(),
            &held_opponent,
            self.opponent_roller.as_mut(),
        ));

        self.state.roll_id += 1;
        self.state.is_rolling = true;
        self.finish_scheduled = false;

        let mut rolled = Vec::with_capacity(DICE_PER_HAND);
        for (die, ctl) in self.state.dice.iter_mut().zip(self.controllers.iter_mut()) {
            if die.held {
                continue;
            }
            die.settled = false;
            ctl.arm(request);
            rolled.push(die.id);
        }
        if rolled.is_empty() {
            self.schedule_finish();
        }

        debug!(
            round = self.state.round_id,
            roll = self.state.roll_id,
            dice = ?rolled,
            "roll started"
        );
        self.bus.broadcast(RoundEvent::RollStarted {
            round_id: self.state.round_id,
            roll_id: self.state.roll_id,
            rolls_remaining: self.state.rolls_remaining,
            dice: rolled,
        });
        true
    }

    fn open_round(&mut self) -> bool {
        let Some(table) = self.selected_table().cloned() else {
            debug!("roll ignored, no table selected");
            return false;
        };
        if !table.can_afford(self.state.bankroll.balance()) {
            debug!(
                bet = table.bet,
                bankroll = self.state.bankroll.balance(),
                "roll ignored, bankroll too small for bet"
            );
            return false;
        }
        if let Err(e) = self.state.bankroll.debit(table.bet) {
            debug!(error = %e, "roll ignored");
            return false;
        }
        self.state.current_bet = table.bet;
        self.state.phase = Phase::Rolling;
        self.state.current_hand = None;
        self.state.opponent_hand = None;
        self.state.round_outcome = None;
        self.state.last_win = 0;
        self.history.clear();
        info!(
            round = self.state.round_id,
            table = %table.id,
            bet = table.bet,
            bankroll = self.state.bankroll.balance(),
            "round started"
        );
        true
    }

    /// Flips the hold flag of one player die.
    pub fn toggle_hold(&mut self, die: usize) -> bool {
        if die >= DICE_PER_HAND || !self.state.can_hold() {
            debug!(
                die,
                phase = ?self.state.phase,
                rolling = self.state.is_rolling,
                rolls_remaining = self.state.rolls_remaining,
                "hold toggle ignored"
            );
            return false;
        }
        let held = !self.state.dice[die].held;
        self.state.dice[die].held = held;
        self.controllers[die].set_held(held);
        self.bus.broadcast(RoundEvent::HoldToggled { die, held });
        true
    }

    /// Returns to betting with the same table, keeping the bankroll.
    pub fn new_round(&mut self) {
        self.reset_round();
        info!(round = self.state.round_id, "new round");
        self.bus.broadcast(RoundEvent::RoundReset {
            round_id: self.state.round_id,
        });
    }

    /// Leaves the table: clears the selection and bet and resets the round.
    pub fn return_to_lobby(&mut self) {
        self.reset_round();
        self.state.selected_table = None;
        self.state.current_bet = 0;
        info!(round = self.state.round_id, "returned to lobby");
        self.bus.broadcast(RoundEvent::ReturnedToLobby);
    }

    /// Restores the starting bankroll and returns to the lobby.
    pub fn reset_bankroll(&mut self) {
        self.state.bankroll = Bankroll::new(self.config.initial_bankroll);
        self.return_to_lobby();
        self.bus.broadcast(RoundEvent::BankrollReset {
            bankroll: self.state.bankroll.balance(),
        });
    }

    fn reset_round(&mut self) {
        let dropped = self.scheduler.cancel_all();
        if dropped > 0 {
            debug!(dropped, "cancelled deferred round steps");
        }
        self.state.round_id += 1;
        self.state.phase = Phase::Betting;
        self.state.rolls_remaining = ROLLS_PER_ROUND;
        self.state.current_hand = None;
        self.state.opponent_hand = None;
        self.state.round_outcome = None;
        self.state.last_win = 0;
        self.state.is_rolling = false;
        self.state.opponent_resolving = false;
        for d in self.state.dice.iter_mut().chain(self.state.opponent_dice.iter_mut()) {
            d.reset();
        }
        for c in self.controllers.iter_mut() {
            c.park();
        }
        self.pending_opponent = None;
        self.finish_scheduled = false;
        self.history.clear();
    }

    /// Advances controllers and deferred steps by `dt` seconds.
    pub fn tick<B: DieBody>(&mut self, bodies: &mut [B; DICE_PER_HAND], dt: f32) {
        for (i, body) in bodies.iter_mut().enumerate() {
            if let Some(face) = self.controllers[i].tick(body, dt, &mut self.rng) {
                self.on_settle(i, face);
            }
        }
        for (token, task) in self.scheduler.advance(dt) {
            self.run_task(token, task);
        }
    }

    fn on_settle(&mut self, die: usize, face: Face) {
        if !self.state.is_rolling {
            debug!(die, face = %face, "settle outside a roll ignored");
            return;
        }
        let d = &mut self.state.dice[die];
        d.face = face;
        d.settled = true;
        self.bus.broadcast(RoundEvent::DieSettled { die, face });

        let all_done = self.state.dice.iter().all(|d| d.held || d.settled);
        if all_done {
            self.schedule_finish();
        }
    }

    fn schedule_finish(&mut self) {
        if self.finish_scheduled {
            return;
        }
        self.finish_scheduled = true;
        self.scheduler
            .schedule(self.config.timing.finish_delay, self.token(), RoundTask::FinishRoll);
    }

    fn run_task(&mut self, token: RoundToken, task: RoundTask) {
        if token != self.token() {
            debug!(?task, ?token, current = ?self.token(), "stale round step ignored");
            return;
        }
        match task {
            RoundTask::FinishRoll => self.finish_roll(),
            RoundTask::RevealOpponent => self.reveal_opponent(),
        }
    }

    fn finish_roll(&mut self) {
        if !self.state.is_rolling {
            return;
        }
        self.state.is_rolling = false;
        self.finish_scheduled = false;
        self.state.rolls_remaining = self.state.rolls_remaining.saturating_sub(1);

        let faces = self.state.player_faces();
        self.history.push(faces);
        let hand = evaluate_hand(&faces);
        debug!(
            roll = self.state.roll_id,
            hand = hand.display_name(),
            rolls_remaining = self.state.rolls_remaining,
            "player hand evaluated"
        );
        self.state.current_hand = Some(hand.clone());
        self.bus.broadcast(RoundEvent::PlayerHandEvaluated {
            hand,
            rolls_remaining: self.state.rolls_remaining,
        });

        if let Some(pending) = self.pending_opponent.take() {
            for (d, face) in self.state.opponent_dice.iter_mut().zip(pending) {
                d.face = face;
                d.settled = d.held;
            }
        }
        self.state.opponent_resolving = true;
        self.scheduler.schedule(
            self.config.timing.reveal_delay,
            self.token(),
            RoundTask::RevealOpponent,
        );

        if self.state.rolls_remaining == 0 {
            for c in self.controllers.iter_mut() {
                c.send_to_tray();
            }
        }
    }

    fn reveal_opponent(&mut self) {
        if !self.state.opponent_resolving {
            return;
        }
        self.state.opponent_resolving = false;
        let faces = self.state.opponent_faces();
        let hand = evaluate_hand(&faces);
        for d in self.state.opponent_dice.iter_mut() {
            d.settled = true;
        }
        self.state.opponent_hand = Some(hand.clone());

        if self.state.rolls_remaining > 0 {
            let holds = self.strategy.decide_holds(&faces);
            for (d, held) in self.state.opponent_dice.iter_mut().zip(holds) {
                d.held = held;
            }
        }
        let holds: [bool; DICE_PER_HAND] = std::array::from_fn(|i| self.state.opponent_dice[i].held);
        debug!(hand = hand.display_name(), ?holds, "opponent revealed");
        self.bus.broadcast(RoundEvent::OpponentRevealed { faces, hand, holds });

        if self.state.rolls_remaining == 0 {
            self.score();
        }
    }

    fn score(&mut self) {
        let player_faces = self.state.player_faces();
        let opponent_faces = self.state.opponent_faces();
        let player = self
            .state
            .current_hand
            .clone()
            .unwrap_or_else(|| evaluate_hand(&player_faces));
        let opponent = self
            .state
            .opponent_hand
            .clone()
            .unwrap_or_else(|| evaluate_hand(&opponent_faces));

        let outcome = compare_player_vs_opponent(&player, &opponent);
        let bet = self.state.current_bet;
        let win_payout = self
            .selected_table()
            .map(|t| t.win_payout())
            .unwrap_or_else(|| bet.saturating_mul(2));
        let payout = match outcome {
            Outcome::Win => win_payout,
            Outcome::Tie => bet,
            Outcome::Lose => 0,
        };
        self.state.bankroll.credit(payout);
        self.state.last_win = if outcome == Outcome::Win { payout } else { 0 };
        self.state.round_outcome = Some(outcome);
        self.state.phase = Phase::Scoring;

        info!(
            round = self.state.round_id,
            outcome = ?outcome,
            player = player.display_name(),
            opponent = opponent.display_name(),
            payout,
            bankroll = self.state.bankroll.balance(),
            "round scored"
        );

        self.last_record = Some(RoundRecord {
            id: None,
            round: self.state.round_id,
            seed: Some(self.config.seed),
            table: self.state.selected_table.clone().unwrap_or_default(),
            bet,
            rolls: self.history.clone(),
            player: player_faces,
            opponent: opponent_faces,
            player_hand: player.rank,
            opponent_hand: opponent.rank,
            outcome,
            payout,
            bankroll_after: self.state.bankroll.balance(),
            ts: None,
            meta: Some(serde_json::json!({ "opponent_strategy": self.strategy.name() })),
        });
        self.bus.broadcast(RoundEvent::RoundScored {
            outcome,
            payout,
            bankroll: self.state.bankroll.balance(),
        });
    }
}
