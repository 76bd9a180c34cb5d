use std::collections::VecDeque;
use thiserror::Error;
use crate::action::{ActionKind, Claim, GameAction};
use crate::state::GameState;
use crate::Character;

/// Something went wrong on the agent's side of the call. The engine never
/// propagates these; it falls back to a conservative default instead.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent unavailable: {0}")]
    Unavailable(String),

    #[error("malformed decision: {0}")]
    Malformed(String),
}

/// An agent's answer to "what do you do this turn".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionChoice {
    pub kind: ActionKind,
    pub target: Option<usize>,
    /// table talk, only logged when discussion is enabled
    pub discussion: Option<String>,
}

impl ActionChoice {
    pub fn new(kind: ActionKind) -> Self {
        Self { kind, target: None, discussion: None }
    }

    pub fn targeting(kind: ActionKind, target: usize) -> Self {
        Self { kind, target: Some(target), discussion: None }
    }

    pub fn with_discussion(mut self, message: impl Into<String>) -> Self {
        self.discussion = Some(message.into());
        self
    }
}

impl From<&GameAction> for ActionChoice {
    fn from(action: &GameAction) -> Self {
        Self { kind: action.kind, target: action.target, discussion: None }
    }
}

/// The decisions a player has to make. Every call gets the full current state
/// and the index of the player being asked.
///
/// Implementations can be bots, humans at a prompt, or something remote. Any
/// illegal answer is corrected by the engine, so agents don't have to be
/// perfect, only well behaved enough to be worth asking.
pub trait Agent: Send {
    fn choose_action(&mut self, state: &GameState, me: usize) -> Result<ActionChoice, AgentError>;

    /// Whether to call `claim` a bluff.
    fn decide_challenge(&mut self, state: &GameState, me: usize, claim: &Claim) -> Result<bool, AgentError>;

    /// `Some(character)` to block `action` by claiming `character`.
    fn decide_block(&mut self, state: &GameState, me: usize, action: &GameAction) -> Result<Option<Character>, AgentError>;

    fn choose_card_to_lose(&mut self, state: &GameState, me: usize) -> Result<Character, AgentError>;

    /// Pick exactly `keep` cards out of `available` (current hand plus the drawn cards).
    fn choose_exchange(&mut self, state: &GameState, me: usize, available: &[Character], keep: usize) -> Result<Vec<Character>, AgentError>;
}

/// Plays back queued answers. Once the action queue runs dry it reports itself
/// unavailable; the other queues fall back to passive answers.
#[derive(Clone, Debug, Default)]
pub struct ScriptedAgent {
    actions: VecDeque<ActionChoice>,
    challenges: VecDeque<bool>,
    blocks: VecDeque<Option<Character>>,
    losses: VecDeque<Character>,
    exchanges: VecDeque<Vec<Character>>,
}

impl ScriptedAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = ActionChoice>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn with_challenges(mut self, challenges: impl IntoIterator<Item = bool>) -> Self {
        self.challenges.extend(challenges);
        self
    }

    pub fn with_blocks(mut self, blocks: impl IntoIterator<Item = Option<Character>>) -> Self {
        self.blocks.extend(blocks);
        self
    }

    pub fn with_losses(mut self, losses: impl IntoIterator<Item = Character>) -> Self {
        self.losses.extend(losses);
        self
    }

    pub fn with_exchanges(mut self, exchanges: impl IntoIterator<Item = Vec<Character>>) -> Self {
        self.exchanges.extend(exchanges);
        self
    }
}

impl Agent for ScriptedAgent {
    fn choose_action(&mut self, _state: &GameState, _me: usize) -> Result<ActionChoice, AgentError> {
        self.actions
            .pop_front()
            .ok_or_else(|| AgentError::Unavailable("script has no more actions".to_string()))
    }

    fn decide_challenge(&mut self, _state: &GameState, _me: usize, _claim: &Claim) -> Result<bool, AgentError> {
        Ok(self.challenges.pop_front().unwrap_or(false))
    }

    fn decide_block(&mut self, _state: &GameState, _me: usize, _action: &GameAction) -> Result<Option<Character>, AgentError> {
        Ok(self.blocks.pop_front().flatten())
    }

    fn choose_card_to_lose(&mut self, state: &GameState, me: usize) -> Result<Character, AgentError> {
        match self.losses.pop_front() {
            Some(card) => Ok(card),
            None => state.players[me]
                .hand
                .first()
                .copied()
                .ok_or_else(|| AgentError::Malformed("asked to lose a card with an empty hand".to_string())),
        }
    }

    fn choose_exchange(&mut self, _state: &GameState, _me: usize, available: &[Character], keep: usize) -> Result<Vec<Character>, AgentError> {
        Ok(self.exchanges.pop_front().unwrap_or_else(|| available[..keep].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{ActionKind, GameAction};
    use crate::agent::{ActionChoice, Agent, AgentError, ScriptedAgent};
    use crate::deck::Deck;
    use crate::state::{GameState, Player};
    use crate::Character::{Ambassador, Captain, Duke};

    fn state() -> GameState {
        let players = vec![
            Player::new(0, "a", 2, vec![Captain, Duke]),
            Player::new(1, "b", 2, vec![Duke, Duke]),
        ];
        GameState::new(players, Deck::default())
    }

    #[test]
    fn scripted_actions_run_out() {
        let state = state();
        let mut agent = ScriptedAgent::new().with_actions([ActionChoice::new(ActionKind::Tax)]);

        assert_eq!(agent.choose_action(&state, 0).unwrap(), ActionChoice::new(ActionKind::Tax));
        assert!(matches!(agent.choose_action(&state, 0), Err(AgentError::Unavailable(_))));
    }

    #[test]
    fn passive_defaults() {
        let state = state();
        let mut agent = ScriptedAgent::new();
        let steal = GameAction::new(ActionKind::Steal, 1, Some(0));

        assert_eq!(agent.decide_block(&state, 0, &steal).unwrap(), None);
        assert_eq!(agent.choose_card_to_lose(&state, 0).unwrap(), Captain);
        assert_eq!(agent.choose_exchange(&state, 0, &[Captain, Duke, Ambassador, Duke], 2).unwrap(), vec![Captain, Duke]);
    }

    #[test]
    fn action_choice_from_action() {
        let steal = GameAction::new(ActionKind::Steal, 1, Some(0));
        let choice = ActionChoice::from(&steal).with_discussion("mine now");
        assert_eq!(choice.target, Some(0));
        assert_eq!(choice.discussion.as_deref(), Some("mine now"));
    }
}
