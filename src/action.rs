use std::fmt::{Debug, Formatter};
use serde::{Deserialize, Serialize};
use crate::{Character, CoupError, ASSASSINATE_COST, COUP_COST};
use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum ActionKind {
    Income,
    ForeignAid,
    Coup,
    Tax,
    Assassinate,
    Steal,
    Exchange,
}

pub static ACTION_KINDS: [ActionKind; 7] = [
    ActionKind::Income,
    ActionKind::ForeignAid,
    ActionKind::Coup,
    ActionKind::Tax,
    ActionKind::Assassinate,
    ActionKind::Steal,
    ActionKind::Exchange,
];

impl ActionKind {
    pub fn cost(self) -> u8 {
        match self {
            ActionKind::Coup => COUP_COST,
            ActionKind::Assassinate => ASSASSINATE_COST,
            _ => 0,
        }
    }

    /// The character a player implicitly claims by taking this action.
    pub fn claimed_character(self) -> Option<Character> {
        match self {
            ActionKind::Tax => Some(Duke),
            ActionKind::Assassinate => Some(Assassin),
            ActionKind::Steal => Some(Captain),
            ActionKind::Exchange => Some(Ambassador),
            _ => None,
        }
    }

    /// Characters that may be claimed to block this action.
    pub fn blockers(self) -> &'static [Character] {
        match self {
            ActionKind::ForeignAid => &[Duke],
            ActionKind::Assassinate => &[Contessa],
            ActionKind::Steal => &[Captain, Ambassador],
            _ => &[],
        }
    }

    pub fn is_blockable(self) -> bool {
        !self.blockers().is_empty()
    }

    pub fn needs_target(self) -> bool {
        matches!(self, ActionKind::Coup | ActionKind::Assassinate | ActionKind::Steal)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct GameAction {
    pub kind: ActionKind,
    pub actor: usize,
    pub target: Option<usize>,
}

impl GameAction {
    pub fn new(kind: ActionKind, actor: usize, target: Option<usize>) -> Self {
        Self { kind, actor, target }
    }

    pub fn income(actor: usize) -> Self {
        Self::new(ActionKind::Income, actor, None)
    }

    pub fn cost(&self) -> u8 {
        self.kind.cost()
    }

    pub fn claimed_character(&self) -> Option<Character> {
        self.kind.claimed_character()
    }

    pub fn blockers(&self) -> &'static [Character] {
        self.kind.blockers()
    }

    pub fn is_blockable(&self) -> bool {
        self.kind.is_blockable()
    }

    pub(crate) fn target_idx(&self) -> Result<usize, CoupError> {
        self.target.ok_or(CoupError::MissingTarget(self.kind))
    }
}

impl Debug for GameAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let player_idx = self.actor;
        let target = self.target.map_or_else(|| "nobody".to_string(), |idx| format!("player {idx}"));

        match self.kind {
            ActionKind::Income => {
                f.write_fmt(format_args!("Player {player_idx} takes Income"))
            }
            ActionKind::ForeignAid => {
                f.write_fmt(format_args!("Player {player_idx} gets foreign aid"))
            }
            ActionKind::Coup => {
                f.write_fmt(format_args!("Player {player_idx} coups {target}"))
            }
            ActionKind::Tax => {
                f.write_fmt(format_args!("Player {player_idx} gets Taxes"))
            }
            ActionKind::Assassinate => {
                f.write_fmt(format_args!("Player {player_idx} assassinates {target}"))
            }
            ActionKind::Steal => {
                f.write_fmt(format_args!("Player {player_idx} steals from {target}"))
            }
            ActionKind::Exchange => {
                f.write_fmt(format_args!("Player {player_idx} exchanges cards with the deck"))
            }
        }
    }
}

/// What a claim was made for: taking an action, or blocking someone else's.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum ClaimContext {
    Action(ActionKind),
    Block { action: ActionKind, actor: usize },
}

/// An assertion that `claimant` holds `character`. This is what gets challenged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Claim {
    pub claimant: usize,
    pub character: Character,
    pub context: ClaimContext,
}

impl Claim {
    pub fn for_action(action: &GameAction, character: Character) -> Self {
        Self {
            claimant: action.actor,
            character,
            context: ClaimContext::Action(action.kind),
        }
    }

    pub fn for_block(blocker: usize, character: Character, action: &GameAction) -> Self {
        Self {
            claimant: blocker,
            character,
            context: ClaimContext::Block { action: action.kind, actor: action.actor },
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self.context, ClaimContext::Block { .. })
    }
}

impl Debug for Claim {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.context {
            ClaimContext::Action(kind) => {
                f.write_fmt(format_args!("Player {} claims {:?} to {:?}", self.claimant, self.character, kind))
            }
            ClaimContext::Block { action, actor } => {
                f.write_fmt(format_args!("Player {} claims {:?} to block {:?} by player {actor}", self.claimant, self.character, action))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{ActionKind, GameAction, ACTION_KINDS};
    use crate::Character::{Ambassador, Captain, Contessa, Duke};

    #[test]
    fn only_coup_and_assassinate_cost() {
        let costly: Vec<ActionKind> = ACTION_KINDS.iter().copied().filter(|k| k.cost() > 0).collect();
        assert_eq!(costly, vec![ActionKind::Coup, ActionKind::Assassinate]);
        assert_eq!(ActionKind::Coup.cost(), 7);
        assert_eq!(ActionKind::Assassinate.cost(), 3);
    }

    #[test]
    fn coup_cannot_be_contested() {
        assert_eq!(ActionKind::Coup.claimed_character(), None);
        assert!(!ActionKind::Coup.is_blockable());
        assert!(!ActionKind::Income.is_blockable());
    }

    #[test]
    fn blockers() {
        assert_eq!(ActionKind::ForeignAid.blockers(), &[Duke]);
        assert_eq!(ActionKind::Assassinate.blockers(), &[Contessa]);
        assert_eq!(ActionKind::Steal.blockers(), &[Captain, Ambassador]);
        assert!(!ActionKind::Exchange.is_blockable());
        assert!(!ActionKind::Tax.is_blockable());
    }

    #[test]
    fn debug_reads_like_a_sentence() {
        let action = GameAction::new(ActionKind::Steal, 0, Some(2));
        assert_eq!(format!("{:?}", action), "Player 0 steals from player 2");
        assert_eq!(format!("{:?}", GameAction::income(1)), "Player 1 takes Income");
    }
}
