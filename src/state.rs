use serde::Serialize;
use crate::action::{ActionKind, GameAction};
use crate::deck::Deck;
use crate::event::Event;
use crate::{Character, FORCED_COUP_THRESHOLD};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: usize,
    pub name: String,
    pub coins: u8,
    /// concealed influence cards
    pub hand: Vec<Character>,
    /// revealed cards, in the order they were lost
    pub lost: Vec<Character>,
}

impl Player {
    pub fn new(id: usize, name: impl Into<String>, coins: u8, hand: Vec<Character>) -> Self {
        Self {
            id,
            name: name.into(),
            coins,
            hand,
            lost: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.hand.is_empty()
    }

    pub fn holds(&self, character: Character) -> bool {
        self.hand.contains(&character)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Action,
    Challenge,
    Block,
    Resolve,
    GameOver,
}

/// The action currently being resolved. There is never more than one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingAction {
    pub action: GameAction,
    pub challenger: Option<usize>,
    pub blocker: Option<(usize, Character)>,
    pub resolved: bool,
}

impl PendingAction {
    pub fn new(action: GameAction) -> Self {
        Self {
            action,
            challenger: None,
            blocker: None,
            resolved: false,
        }
    }
}

/// Everything there is to know about a game in progress. Agents and sinks only
/// ever see this through a shared reference.
#[derive(Clone, Debug, Serialize)]
pub struct GameState {
    pub turn: usize,
    pub round: usize,
    pub current_player: usize,
    pub players: Vec<Player>,
    pub deck: Deck,
    pub phase: Phase,
    pub pending: Option<PendingAction>,
    pub log: Vec<Event>,
    pub winner: Option<usize>,
}

impl GameState {
    pub fn new(players: Vec<Player>, deck: Deck) -> Self {
        Self {
            turn: 0,
            round: 1,
            current_player: 0,
            players,
            deck,
            phase: Phase::Action,
            pending: None,
            log: Vec::new(),
            winner: None,
        }
    }

    pub fn living_players(&self) -> impl Iterator<Item = usize> + '_ {
        self.players.iter().filter(|p| p.is_alive()).map(|p| p.id)
    }

    /// Living players other than `exclude_idx`, in seat order starting after them.
    pub fn living_opponents(&self, exclude_idx: usize) -> Vec<usize> {
        (1..self.players.len())
            .map(|n| (exclude_idx + n) % self.players.len())
            .filter(|&player_idx| self.players[player_idx].is_alive())
            .collect()
    }

    /// Cards in the deck, in hands and face up. Constant for the whole game.
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.players.iter().map(|p| p.hand.len() + p.lost.len()).sum::<usize>()
    }

    /// Every action `player_idx` could legally declare right now, bluffs included.
    pub fn legal_actions(&self, player_idx: usize) -> Vec<GameAction> {
        let mut actions = Vec::with_capacity(self.players.len() * 3 + 4);
        let coins = self.players[player_idx].coins;
        let opponents = self.living_opponents(player_idx);

        if coins >= FORCED_COUP_THRESHOLD {
            // forced coup at 10+
            for opponent_idx in opponents {
                actions.push(GameAction::new(ActionKind::Coup, player_idx, Some(opponent_idx)));
            }
            return actions;
        }

        actions.push(GameAction::income(player_idx));
        actions.push(GameAction::new(ActionKind::ForeignAid, player_idx, None));
        actions.push(GameAction::new(ActionKind::Tax, player_idx, None));
        actions.push(GameAction::new(ActionKind::Exchange, player_idx, None));

        for opponent_idx in opponents {
            for kind in [ActionKind::Coup, ActionKind::Assassinate, ActionKind::Steal] {
                if coins >= kind.cost() {
                    actions.push(GameAction::new(kind, player_idx, Some(opponent_idx)));
                }
            }
        }

        actions
    }

    /// Characters `player_idx` may claim to block `action`; empty if they can't block it.
    pub fn block_options(&self, player_idx: usize, action: &GameAction) -> &'static [Character] {
        let eligible = player_idx != action.actor
            && self.players[player_idx].is_alive()
            && action.target.map_or(true, |target| target == player_idx);

        if eligible {
            action.blockers()
        } else {
            &[]
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{ActionKind, GameAction};
    use crate::deck::Deck;
    use crate::state::{GameState, Player};
    use crate::Character::{Captain, Contessa, Duke};

    fn state(num_players: usize) -> GameState {
        let players = (0..num_players)
            .map(|idx| Player::new(idx, format!("Player {idx}"), 2, vec![Duke, Captain]))
            .collect();
        GameState::new(players, Deck::default())
    }

    #[test]
    fn other_players() {
        let state = state(4);
        assert_eq!(state.living_opponents(0), vec![1, 2, 3]);
        assert_eq!(state.living_opponents(1), vec![2, 3, 0]);

        let mut state = self::state(3);
        assert_eq!(state.living_opponents(1), vec![2, 0]);

        state.players[2].hand.clear();
        assert_eq!(state.living_opponents(1), vec![0]);
        assert_eq!(state.living_players().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn legal_actions_depend_on_coins() {
        let mut state = state(3);
        let kinds = |state: &GameState| state.legal_actions(0).iter().map(|a| a.kind).collect::<Vec<_>>();

        // income, foreign aid, tax, exchange, and a steal per opponent
        assert_eq!(state.legal_actions(0).len(), 6);
        assert!(!kinds(&state).contains(&ActionKind::Assassinate));

        state.players[0].coins = 7;
        assert!(kinds(&state).contains(&ActionKind::Coup));
        assert!(kinds(&state).contains(&ActionKind::Assassinate));

        state.players[0].coins = 10;
        assert_eq!(state.legal_actions(0), vec![
            GameAction::new(ActionKind::Coup, 0, Some(1)),
            GameAction::new(ActionKind::Coup, 0, Some(2)),
        ]);
    }

    #[test]
    fn only_the_target_may_block_a_targeted_action() {
        let state = state(3);
        let steal = GameAction::new(ActionKind::Steal, 0, Some(2));
        assert!(state.block_options(1, &steal).is_empty());
        assert_eq!(state.block_options(2, &steal).len(), 2);
        assert!(state.block_options(0, &steal).is_empty());

        let aid = GameAction::new(ActionKind::ForeignAid, 0, None);
        assert_eq!(state.block_options(1, &aid), &[Duke]);
        assert_eq!(state.block_options(2, &aid), &[Duke]);

        let assassinate = GameAction::new(ActionKind::Assassinate, 0, Some(1));
        assert_eq!(state.block_options(1, &assassinate), &[Contessa]);
    }

    #[test]
    fn snapshot_serializes() {
        let json = state(2).to_json().unwrap();
        assert!(json.contains("\"current_player\":0"));
        assert!(json.contains("\"phase\":\"Action\""));
    }
}
