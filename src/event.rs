use std::fmt::{Display, Formatter};
use serde::Serialize;
use tracing::info;
use crate::action::{Claim, GameAction};
use crate::state::{GameState, Phase};
use crate::stats::LossCause;
use crate::Character;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ChallengeOutcome {
    /// the claim was a bluff
    Succeeded,
    /// the claimant had the card
    Failed,
}

/// One entry in the game log. Entries are only ever appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    pub turn: usize,
    pub kind: EventKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    GameStarted { players: usize },
    TurnStarted { player: usize, round: usize },
    PhaseChanged { phase: Phase },
    Discussion { player: usize, message: String },
    ActionDeclared { action: GameAction, forced: bool },
    ChallengeIssued { challenger: usize, claim: Claim },
    ChallengeResolved { challenger: usize, claim: Claim, outcome: ChallengeOutcome },
    CardReshuffled { player: usize, character: Character },
    BlockDeclared { blocker: usize, character: Character, action: GameAction },
    BlockResolved { blocker: usize, character: Character, stands: bool },
    ActionResolved { action: GameAction },
    ExchangeCompleted { player: usize, drawn: usize },
    CardLost { player: usize, character: Character, cause: LossCause },
    PlayerEliminated { player: usize, round: usize, cause: LossCause },
    GameOver { winner: usize },
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::GameStarted { players } => {
                f.write_fmt(format_args!("Game started with {players} players"))
            }
            EventKind::TurnStarted { player, round } => {
                f.write_fmt(format_args!("Round {round}: player {player}'s turn"))
            }
            EventKind::PhaseChanged { phase } => {
                f.write_fmt(format_args!("Phase is now {:?}", phase))
            }
            EventKind::Discussion { player, message } => {
                f.write_fmt(format_args!("Player {player} says \"{message}\""))
            }
            EventKind::ActionDeclared { action, forced } => {
                if *forced {
                    f.write_fmt(format_args!("{:?} (forced)", action))
                } else {
                    f.write_fmt(format_args!("{:?}", action))
                }
            }
            EventKind::ChallengeIssued { challenger, claim } => {
                let what = if claim.is_block() { "block" } else { "claim" };
                f.write_fmt(format_args!("Player {challenger} challenges player {}'s {what} of {:?}", claim.claimant, claim.character))
            }
            EventKind::ChallengeResolved { challenger, claim, outcome } => match outcome {
                ChallengeOutcome::Succeeded => {
                    f.write_fmt(format_args!("Player {} has no {:?}, player {challenger}'s challenge succeeds", claim.claimant, claim.character))
                }
                ChallengeOutcome::Failed => {
                    f.write_fmt(format_args!("Player {} reveals {:?}, player {challenger}'s challenge fails", claim.claimant, claim.character))
                }
            },
            EventKind::CardReshuffled { player, character } => {
                f.write_fmt(format_args!("Player {player} shuffles {:?} back and draws a new card", character))
            }
            EventKind::BlockDeclared { blocker, character, action } => {
                f.write_fmt(format_args!("Player {blocker} blocks \"{:?}\" with {:?}", action, character))
            }
            EventKind::BlockResolved { blocker, stands, .. } => {
                if *stands {
                    f.write_fmt(format_args!("Player {blocker}'s block stands"))
                } else {
                    f.write_fmt(format_args!("Player {blocker}'s block fails"))
                }
            }
            EventKind::ActionResolved { action } => {
                f.write_fmt(format_args!("Resolved \"{:?}\"", action))
            }
            EventKind::ExchangeCompleted { player, drawn } => {
                f.write_fmt(format_args!("Player {player} drew {drawn} cards and returned {drawn}"))
            }
            EventKind::CardLost { player, character, cause } => {
                f.write_fmt(format_args!("Player {player} loses {:?} ({:?})", character, cause))
            }
            EventKind::PlayerEliminated { player, round, .. } => {
                f.write_fmt(format_args!("Player {player} is eliminated in round {round}"))
            }
            EventKind::GameOver { winner } => {
                f.write_fmt(format_args!("Game over, player {winner} wins"))
            }
        }
    }
}

/// Receives every event right after it is appended to the log, together with
/// the state as it stands at that moment.
pub trait EventSink {
    fn record(&mut self, event: &Event, state: &GameState);
}

impl<F> EventSink for F
where
    F: FnMut(&Event, &GameState),
{
    fn record(&mut self, event: &Event, state: &GameState) {
        self(event, state)
    }
}

/// Default sink: one `info` record per event.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: &Event, state: &GameState) {
        info!(turn = event.turn, phase = ?state.phase, "{}", event.kind);
    }
}
