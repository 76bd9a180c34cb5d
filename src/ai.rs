// simple bots, mostly useful for filling seats and for playing out whole games

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use crate::action::{Claim, GameAction};
use crate::agent::{ActionChoice, Agent, AgentError};
use crate::event::Event;
use crate::state::GameState;
use crate::stats::PlayerStats;
use crate::{Character, Coup, CoupError, GameConfig, Seat};

/// Picks uniformly among whatever is legal. Bluffs, challenges and blocks at
/// fixed rates.
#[derive(Clone, Debug)]
pub struct RandomAgent {
    rng: Pcg64,
    bluff_rate: f64,
    challenge_rate: f64,
    block_rate: f64,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            bluff_rate: 0.2,
            challenge_rate: 0.15,
            block_rate: 0.5,
        }
    }

    /// Never claims a character it doesn't hold.
    pub fn honest(seed: u64) -> Self {
        Self {
            bluff_rate: 0.0,
            ..Self::new(seed)
        }
    }

    fn bluffing(&mut self) -> bool {
        self.bluff_rate > 0.0 && self.rng.gen_bool(self.bluff_rate)
    }
}

impl Agent for RandomAgent {
    fn choose_action(&mut self, state: &GameState, me: usize) -> Result<ActionChoice, AgentError> {
        let mut actions = state.legal_actions(me);
        if !self.bluffing() {
            let player = &state.players[me];
            actions.retain(|action| action.claimed_character().map_or(true, |c| player.holds(c)));
        }

        actions
            .choose(&mut self.rng)
            .map(ActionChoice::from)
            .ok_or_else(|| AgentError::Malformed("no legal actions".to_string()))
    }

    fn decide_challenge(&mut self, _state: &GameState, _me: usize, _claim: &Claim) -> Result<bool, AgentError> {
        Ok(self.rng.gen_bool(self.challenge_rate))
    }

    fn decide_block(&mut self, state: &GameState, me: usize, action: &GameAction) -> Result<Option<Character>, AgentError> {
        let bluffing = self.bluffing();
        let player = &state.players[me];
        let options: Vec<Character> = state
            .block_options(me, action)
            .iter()
            .copied()
            .filter(|&c| bluffing || player.holds(c))
            .collect();

        if options.is_empty() || !self.rng.gen_bool(self.block_rate) {
            return Ok(None);
        }

        Ok(options.choose(&mut self.rng).copied())
    }

    fn choose_card_to_lose(&mut self, state: &GameState, me: usize) -> Result<Character, AgentError> {
        state.players[me]
            .hand
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| AgentError::Malformed("no cards left to lose".to_string()))
    }

    fn choose_exchange(&mut self, _state: &GameState, _me: usize, available: &[Character], keep: usize) -> Result<Vec<Character>, AgentError> {
        Ok(available.choose_multiple(&mut self.rng, keep).copied().collect())
    }
}

/// Plays a whole game between `num_players` random bots and returns the stats.
pub fn simulate(num_players: usize, seed: u64) -> Result<Vec<PlayerStats>, CoupError> {
    let seats = (0..num_players)
        .map(|idx| Seat::new(format!("Bot {}", idx + 1), RandomAgent::new(seed.wrapping_add(idx as u64 + 1))))
        .collect();

    let mut game = Coup::new(seats, GameConfig::default().with_seed(seed))?
        .with_sink(|_: &Event, _: &GameState| {});

    game.play_game()
}

#[cfg(test)]
mod tests {
    use crate::action::GameAction;
    use crate::agent::Agent;
    use crate::ai::{simulate, RandomAgent};
    use crate::deck::Deck;
    use crate::state::{GameState, Player};
    use crate::{Coup, GameConfig, Seat};
    use crate::Character::{Ambassador, Captain, Contessa};

    #[test]
    fn random_agent_only_picks_legal_actions() {
        let players = vec![
            Player::new(0, "a", 4, vec![Captain, Contessa]),
            Player::new(1, "b", 2, vec![Ambassador, Ambassador]),
            Player::new(2, "c", 0, vec![Contessa]),
        ];
        let state = GameState::new(players, Deck::default());
        let legal = state.legal_actions(0);

        let mut agent = RandomAgent::new(1);
        for _ in 0..200 {
            let choice = agent.choose_action(&state, 0).unwrap();
            assert!(legal.contains(&GameAction::new(choice.kind, 0, choice.target)), "{:?}", choice);
        }
    }

    #[test]
    fn honest_agents_never_bluff() {
        for seed in 0..10 {
            let seats = (0..4).map(|idx| Seat::new(format!("Bot {idx}"), RandomAgent::honest(seed * 10 + idx))).collect();
            let mut game = Coup::new(seats, GameConfig::default().with_seed(seed)).unwrap();

            let stats = game.play_game().unwrap();

            assert!(stats.iter().all(|s| s.bluffs == 0 && s.failed_bluffs == 0), "{:?}", stats);
        }
    }

    #[test]
    fn simulate_is_deterministic_for_a_seed() {
        let a = simulate(4, 11).unwrap();
        let b = simulate(4, 11).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.iter().filter(|s| s.winner).count(), 1);
    }

    #[test]
    fn simulate_every_table_size() {
        for num_players in 2..=6 {
            let stats = simulate(num_players, num_players as u64).unwrap();
            assert_eq!(stats.len(), num_players);
            assert_eq!(stats.iter().filter(|s| s.winner).count(), 1);
        }
        assert!(simulate(7, 0).is_err());
    }
}
