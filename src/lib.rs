pub mod action;
pub mod agent;
pub mod ai;
pub mod config;
pub mod deck;
pub mod error;
pub mod event;
pub mod state;
pub mod stats;

pub use action::{ActionKind, Claim, ClaimContext, GameAction};
pub use agent::{ActionChoice, Agent, AgentError, ScriptedAgent};
pub use ai::{simulate, RandomAgent};
pub use config::GameConfig;
pub use deck::Deck;
pub use error::CoupError;
pub use event::{ChallengeOutcome, Event, EventKind, EventSink, TracingSink};
pub use state::{GameState, PendingAction, Phase, Player};
pub use stats::{LossCause, PlayerStats};

use std::{panic, thread};
use rand::seq::SliceRandom;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Character {
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
}

pub static CHARACTER_VARIANTS: [Character; 5] = [
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
];

pub const STARTING_COINS: u8 = 2;
pub const CARDS_PER_PLAYER: usize = 2;
pub const COPIES_PER_CHARACTER: usize = 3;
pub const TOTAL_CARDS: usize = COPIES_PER_CHARACTER * CHARACTER_VARIANTS.len();

pub const INCOME: u8 = 1;
pub const FOREIGN_AID: u8 = 2;
pub const TAX: u8 = 3;
pub const STEAL_AMOUNT: u8 = 2;
pub const ASSASSINATE_COST: u8 = 3;
pub const COUP_COST: u8 = 7;
pub const FORCED_COUP_THRESHOLD: u8 = 10;
pub const EXCHANGE_DRAW: usize = 2;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// A seat at the table: display name plus whatever makes the decisions for it.
pub struct Seat {
    pub name: String,
    pub agent: Box<dyn Agent>,
}

impl Seat {
    pub fn new(name: impl Into<String>, agent: impl Agent + 'static) -> Self {
        Self {
            name: name.into(),
            agent: Box::new(agent),
        }
    }
}

/// The turn engine. Owns the only mutable copy of the game state; agents are
/// handed shared references to it while they decide.
pub struct Coup {
    state: GameState,
    agents: Vec<Box<dyn Agent>>,
    stats: Vec<PlayerStats>,
    config: GameConfig,
    rng: Pcg64,
    sink: Box<dyn EventSink>,
}

impl Coup {
    pub fn new(seats: Vec<Seat>, config: GameConfig) -> Result<Self, CoupError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&seats.len()) {
            return Err(CoupError::InvalidPlayerCount {
                got: seats.len(),
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }

        let mut rng = config.rng();
        let mut deck = Deck::full();
        deck.shuffle(&mut rng);

        let mut players = Vec::with_capacity(seats.len());
        let mut agents = Vec::with_capacity(seats.len());
        let mut stats = Vec::with_capacity(seats.len());

        for (id, seat) in seats.into_iter().enumerate() {
            let mut hand = Vec::with_capacity(CARDS_PER_PLAYER);
            for _ in 0..CARDS_PER_PLAYER {
                hand.push(deck.draw()?);
            }

            stats.push(PlayerStats::new(id, &seat.name));
            players.push(Player::new(id, seat.name, STARTING_COINS, hand));
            agents.push(seat.agent);
        }

        Ok(Self {
            state: GameState::new(players, deck),
            agents,
            stats,
            config,
            rng,
            sink: Box::new(TracingSink),
        })
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn stats(&self) -> &[PlayerStats] {
        &self.stats
    }

    pub fn is_over(&self) -> bool {
        self.state.living_players().count() <= 1
    }

    pub fn winner(&self) -> Option<usize> {
        self.state.winner
    }

    /// Plays turns until a single player is left and returns the final stats.
    /// Only succeeds once per game.
    pub fn play_game(&mut self) -> Result<Vec<PlayerStats>, CoupError> {
        if self.state.winner.is_some() {
            return Err(CoupError::GameOver);
        }

        while !self.is_over() {
            self.play_turn()?;
        }

        self.finish()
    }

    /// Plays exactly one turn for the current player.
    pub fn play_turn(&mut self) -> Result<(), CoupError> {
        if self.is_over() {
            return Err(CoupError::GameOver);
        }

        if self.state.log.is_empty() {
            self.emit(EventKind::GameStarted { players: self.state.players.len() });
        }

        let actor = self.state.current_player;
        if !self.state.players[actor].is_alive() {
            return Err(CoupError::PlayerEliminated(actor));
        }

        self.emit(EventKind::TurnStarted { player: actor, round: self.state.round });
        self.set_phase(Phase::Action);

        if self.state.players[actor].coins >= FORCED_COUP_THRESHOLD {
            // forced coup at 10+, the agent doesn't get a say
            let targets = self.state.living_opponents(actor);
            let target = *targets.choose(&mut self.rng).ok_or(CoupError::GameOver)?;
            info!(player = actor, target, "forced coup");
            self.process_action(GameAction::new(ActionKind::Coup, actor, Some(target)), true)?;
        } else {
            let action = self.request_action(actor);
            self.process_action(action, false)?;
        }

        self.go_next_turn();
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<PlayerStats>, CoupError> {
        let winner = self.state.living_players().next().ok_or(CoupError::NoSurvivors)?;

        self.state.winner = Some(winner);
        self.stats[winner].winner = true;
        self.set_phase(Phase::GameOver);
        self.emit(EventKind::GameOver { winner });
        info!(winner, name = %self.state.players[winner].name, turns = self.state.turn, "game over");

        Ok(self.stats.clone())
    }

    fn go_next_turn(&mut self) {
        // player's turn is over
        self.state.turn += 1;
        self.state.pending = None;

        if self.is_over() {
            return;
        }

        let previous = self.state.current_player;
        let next = self.next_living_player();
        if next <= previous {
            self.state.round += 1;
        }
        self.state.current_player = next;
    }

    fn next_living_player(&self) -> usize {
        let num_players = self.state.players.len();
        let mut idx = (self.state.current_player + 1) % num_players;
        while !self.state.players[idx].is_alive() {
            idx = (idx + 1) % num_players;
        }

        idx
    }

    fn emit(&mut self, kind: EventKind) {
        let event = Event { turn: self.state.turn, kind };
        self.state.log.push(event.clone());
        self.sink.record(&event, &self.state);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.state.phase != phase {
            self.state.phase = phase;
            self.emit(EventKind::PhaseChanged { phase });
        }
    }

    fn request_action(&mut self, actor: usize) -> GameAction {
        let choice = match self.agents[actor].choose_action(&self.state, actor) {
            Ok(choice) => choice,
            Err(err) => {
                warn!(player = actor, %err, "agent failed to choose an action, taking income");
                return GameAction::income(actor);
            }
        };

        if let Some(message) = &choice.discussion {
            if self.config.discussion {
                self.emit(EventKind::Discussion { player: actor, message: message.clone() });
            }
        }

        self.validate_action(actor, &choice)
    }

    fn validate_action(&mut self, actor: usize, choice: &ActionChoice) -> GameAction {
        let coins = self.state.players[actor].coins;
        if coins < choice.kind.cost() {
            warn!(player = actor, action = ?choice.kind, coins, "agent chose an action it can't afford, taking income");
            return GameAction::income(actor);
        }

        if !choice.kind.needs_target() {
            return GameAction::new(choice.kind, actor, None);
        }

        let opponents = self.state.living_opponents(actor);
        let target = match choice.target {
            Some(target) if opponents.contains(&target) => target,
            other => {
                let Some(&target) = opponents.choose(&mut self.rng) else {
                    return GameAction::income(actor);
                };
                warn!(player = actor, action = ?choice.kind, requested = ?other, target, "agent chose an ineligible target, picked one at random");
                target
            }
        };

        GameAction::new(choice.kind, actor, Some(target))
    }

    fn process_action(&mut self, action: GameAction, forced: bool) -> Result<(), CoupError> {
        if self.state.pending.is_some() {
            return Err(CoupError::PendingActionConflict);
        }

        self.state.pending = Some(PendingAction::new(action.clone()));
        self.emit(EventKind::ActionDeclared { action: action.clone(), forced });

        // the cost is paid up front, whatever happens to the action afterwards
        let cost = action.cost();
        if cost > 0 {
            let player = &mut self.state.players[action.actor];
            player.coins = player.coins.saturating_sub(cost);
        }
        if action.kind == ActionKind::Coup {
            self.stats[action.actor].coups_launched += 1;
        }

        if self.run_response_phases(&action)? {
            self.set_phase(Phase::Resolve);
            self.resolve_action(&action)?;
        }

        self.state.pending = None;
        Ok(())
    }

    /// Challenge then block. Returns whether the action survived both.
    fn run_response_phases(&mut self, action: &GameAction) -> Result<bool, CoupError> {
        if let Some(character) = action.claimed_character() {
            self.set_phase(Phase::Challenge);
            let claim = Claim::for_action(action, character);
            if !self.contest_claim(&claim)? {
                return Ok(false);
            }
        }

        if action.is_blockable() {
            self.set_phase(Phase::Block);
            if let Some((blocker, character)) = self.poll_blockers(action) {
                if self.resolve_block(action, blocker, character)? {
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }

    /// Gives everyone else a chance to challenge the claim and adjudicates it.
    /// Returns whether the claim stands.
    fn contest_claim(&mut self, claim: &Claim) -> Result<bool, CoupError> {
        if !self.state.players[claim.claimant].holds(claim.character) {
            self.stats[claim.claimant].bluffs += 1;
        }

        let Some(challenger) = self.poll_challengers(claim) else {
            return Ok(true);
        };

        if let (Some(pending), ClaimContext::Action(_)) = (self.state.pending.as_mut(), claim.context) {
            pending.challenger = Some(challenger);
        }
        self.emit(EventKind::ChallengeIssued { challenger, claim: claim.clone() });

        self.resolve_challenge(claim, challenger)
    }

    fn poll_challengers(&mut self, claim: &Claim) -> Option<usize> {
        let eligible = self.state.living_opponents(claim.claimant);
        let state = &self.state;
        let answers = poll_agents(&mut self.agents, &eligible, self.config.concurrent_polling, |agent, idx| {
            agent.decide_challenge(state, idx, claim)
        });

        let willing: Vec<usize> = answers
            .into_iter()
            .filter_map(|(idx, answer)| match answer {
                Ok(challenge) => challenge.then_some(idx),
                Err(err) => {
                    warn!(player = idx, %err, "agent failed to decide on a challenge, not challenging");
                    None
                }
            })
            .collect();

        // simultaneous challengers: pick one at random so seat order gives no edge
        willing.choose(&mut self.rng).copied()
    }

    /// Returns whether the claim stands, i.e. the challenge failed.
    fn resolve_challenge(&mut self, claim: &Claim, challenger: usize) -> Result<bool, CoupError> {
        let claimant = claim.claimant;

        if self.state.players[claimant].holds(claim.character) {
            self.stats[claimant].successful_bluffs += 1;
            self.stats[challenger].challenges_lost += 1;
            self.emit(EventKind::ChallengeResolved {
                challenger,
                claim: claim.clone(),
                outcome: ChallengeOutcome::Failed,
            });

            self.replace_card(claimant, claim.character)?;
            self.lose_influence(challenger, LossCause::LostChallenge)?;
            Ok(true)
        } else {
            self.stats[claimant].failed_bluffs += 1;
            self.stats[challenger].challenges_won += 1;
            self.emit(EventKind::ChallengeResolved {
                challenger,
                claim: claim.clone(),
                outcome: ChallengeOutcome::Succeeded,
            });

            self.lose_influence(claimant, LossCause::CaughtBluffing)?;
            Ok(false)
        }
    }

    /// The proven card goes back into the deck and a fresh one is drawn.
    fn replace_card(&mut self, player_idx: usize, character: Character) -> Result<(), CoupError> {
        let hand = &mut self.state.players[player_idx].hand;
        let Some(card_idx) = hand.iter().position(|&card| card == character) else {
            return Ok(());
        };

        let card = hand.remove(card_idx);
        self.state.deck.return_and_reshuffle([card], &mut self.rng);
        let replacement = self.state.deck.draw()?;
        self.state.players[player_idx].hand.push(replacement);

        self.emit(EventKind::CardReshuffled { player: player_idx, character });
        Ok(())
    }

    fn poll_blockers(&mut self, action: &GameAction) -> Option<(usize, Character)> {
        let eligible = match action.target {
            Some(target) if self.state.players[target].is_alive() => vec![target],
            Some(_) => vec![],
            None => self.state.living_opponents(action.actor),
        };

        // first one to speak up gets the block
        for idx in eligible {
            match self.agents[idx].decide_block(&self.state, idx, action) {
                Ok(None) => {}
                Ok(Some(character)) if action.blockers().contains(&character) => {
                    return Some((idx, character));
                }
                Ok(Some(character)) => {
                    warn!(player = idx, ?character, action = ?action.kind, "agent tried to block with a character that can't block this, ignoring");
                }
                Err(err) => {
                    warn!(player = idx, %err, "agent failed to decide on a block, not blocking");
                }
            }
        }

        None
    }

    /// Returns whether the block stands.
    fn resolve_block(&mut self, action: &GameAction, blocker: usize, character: Character) -> Result<bool, CoupError> {
        if let Some(pending) = self.state.pending.as_mut() {
            pending.blocker = Some((blocker, character));
        }
        self.emit(EventKind::BlockDeclared { blocker, character, action: action.clone() });

        // a block is a claim of its own and can be challenged the same way
        self.set_phase(Phase::Challenge);
        let claim = Claim::for_block(blocker, character, action);
        let stands = self.contest_claim(&claim)?;

        if stands && action.kind == ActionKind::Assassinate {
            self.stats[blocker].assassinations_blocked += 1;
        }
        self.emit(EventKind::BlockResolved { blocker, character, stands });

        Ok(stands)
    }

    fn resolve_action(&mut self, action: &GameAction) -> Result<(), CoupError> {
        let actor = action.actor;

        match action.kind {
            ActionKind::Income => self.gain(actor, INCOME),
            ActionKind::ForeignAid => self.gain(actor, FOREIGN_AID),
            ActionKind::Tax => self.gain(actor, TAX),
            ActionKind::Steal => {
                let target = action.target_idx()?;
                let amount = STEAL_AMOUNT.min(self.state.players[target].coins);
                self.state.players[target].coins -= amount;
                self.gain(actor, amount);
                self.stats[actor].coins_stolen += u32::from(amount);
                self.stats[target].coins_lost_to_theft += u32::from(amount);
            }
            ActionKind::Coup => self.lose_influence(action.target_idx()?, LossCause::Coup)?,
            ActionKind::Assassinate => self.lose_influence(action.target_idx()?, LossCause::Assassination)?,
            ActionKind::Exchange => self.exchange(actor)?,
        }

        if let Some(pending) = self.state.pending.as_mut() {
            pending.resolved = true;
        }
        self.emit(EventKind::ActionResolved { action: action.clone() });
        Ok(())
    }

    fn gain(&mut self, player_idx: usize, amount: u8) {
        self.state.players[player_idx].coins += amount;
        self.stats[player_idx].coins_earned += u32::from(amount);
    }

    fn exchange(&mut self, player_idx: usize) -> Result<(), CoupError> {
        let keep = self.state.players[player_idx].hand.len();

        // drawn cards sit in the hand while the agent decides
        for _ in 0..EXCHANGE_DRAW {
            let card = self.state.deck.draw()?;
            self.state.players[player_idx].hand.push(card);
        }
        let available = self.state.players[player_idx].hand.clone();

        let chosen = match self.agents[player_idx].choose_exchange(&self.state, player_idx, &available, keep) {
            Ok(chosen) => chosen,
            Err(err) => {
                warn!(player = player_idx, %err, "agent failed to choose exchange cards, keeping the original hand");
                available[..keep].to_vec()
            }
        };

        let (kept, returned) = match split_selection(&available, &chosen, keep) {
            Some(split) => split,
            None => {
                warn!(player = player_idx, ?chosen, ?available, keep, "agent chose an invalid exchange, keeping the original hand");
                (available[..keep].to_vec(), available[keep..].to_vec())
            }
        };

        self.state.players[player_idx].hand = kept;
        self.state.deck.return_and_reshuffle(returned, &mut self.rng);

        self.emit(EventKind::ExchangeCompleted { player: player_idx, drawn: EXCHANGE_DRAW });
        Ok(())
    }

    fn lose_influence(&mut self, player_idx: usize, cause: LossCause) -> Result<(), CoupError> {
        let player = self.state.players.get(player_idx).ok_or(CoupError::UnknownPlayer(player_idx))?;
        if !player.is_alive() || self.is_over() {
            return Ok(());
        }

        let card = if player.hand.len() == 1 {
            player.hand[0]
        } else {
            let fallback = player.hand[0];
            match self.agents[player_idx].choose_card_to_lose(&self.state, player_idx) {
                Ok(card) if self.state.players[player_idx].holds(card) => card,
                Ok(card) => {
                    warn!(player = player_idx, ?card, "agent chose a card it doesn't hold, losing {:?}", fallback);
                    fallback
                }
                Err(err) => {
                    warn!(player = player_idx, %err, "agent failed to choose a card to lose, losing {:?}", fallback);
                    fallback
                }
            }
        };

        let player = &mut self.state.players[player_idx];
        if let Some(card_idx) = player.hand.iter().position(|&c| c == card) {
            player.hand.remove(card_idx);
        }
        player.lost.push(card);
        let eliminated = !player.is_alive();

        self.stats[player_idx].loss_causes.push(cause);
        self.emit(EventKind::CardLost { player: player_idx, character: card, cause });

        if eliminated {
            let round = self.state.round;
            self.stats[player_idx].elimination_round = Some(round);
            self.stats[player_idx].elimination_cause = Some(cause);
            self.emit(EventKind::PlayerEliminated { player: player_idx, round, cause });
            info!(player = player_idx, name = %self.state.players[player_idx].name, round, ?cause, "player eliminated");
        }

        Ok(())
    }
}

/// Asks each eligible agent the same question. Answers come back in
/// `eligible` order whether or not they were dispatched concurrently.
fn poll_agents<T, F>(agents: &mut [Box<dyn Agent>], eligible: &[usize], concurrent: bool, ask: F) -> Vec<(usize, Result<T, AgentError>)>
where
    T: Send,
    F: Fn(&mut dyn Agent, usize) -> Result<T, AgentError> + Sync,
{
    if !concurrent {
        return eligible
            .iter()
            .map(|&idx| (idx, ask(agents[idx].as_mut(), idx)))
            .collect();
    }

    let ask = &ask;
    let mut answers: Vec<(usize, Result<T, AgentError>)> = thread::scope(|scope| {
        let handles: Vec<_> = agents
            .iter_mut()
            .enumerate()
            .filter(|(idx, _)| eligible.contains(idx))
            .map(|(idx, agent)| (idx, scope.spawn(move || ask(agent.as_mut(), idx))))
            .collect();

        handles
            .into_iter()
            .map(|(idx, handle)| match handle.join() {
                Ok(answer) => (idx, answer),
                // same as asking in turn: a panicking agent takes the game down with it
                Err(payload) => panic::resume_unwind(payload),
            })
            .collect()
    });

    answers.sort_by_key(|(idx, _)| eligible.iter().position(|e| e == idx));
    answers
}

/// Splits `available` into the `chosen` cards and the rest, treating both as
/// multisets. `None` if the selection has the wrong size or names a card that
/// isn't available.
fn split_selection(available: &[Character], chosen: &[Character], keep: usize) -> Option<(Vec<Character>, Vec<Character>)> {
    if chosen.len() != keep {
        return None;
    }

    let mut rest = available.to_vec();
    for card in chosen {
        let idx = rest.iter().position(|c| c == card)?;
        rest.remove(idx);
    }

    Some((chosen.to_vec(), rest))
}
