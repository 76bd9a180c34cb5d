use rand::{thread_rng, Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use crate::CoupError;

/// Knobs for a single game. Every field has a default, so a JSON config only
/// needs to mention what it changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for shuffling and random picks. `None` draws a fresh one.
    pub seed: Option<u64>,
    /// Whether agents' table talk goes into the log.
    pub discussion: bool,
    /// Ask challengers on separate threads instead of one after another.
    pub concurrent_polling: bool,
}

impl GameConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, CoupError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn rng(&self) -> Pcg64 {
        let seed = self.seed.unwrap_or_else(|| thread_rng().gen());
        Pcg64::seed_from_u64(seed)
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use crate::config::GameConfig;
    use crate::CoupError;

    #[test]
    fn partial_json() {
        let config = GameConfig::from_json(r#"{ "seed": 42 }"#).unwrap();
        assert_eq!(config, GameConfig::default().with_seed(42));

        let config = GameConfig::from_json(r#"{ "discussion": true, "concurrent_polling": true }"#).unwrap();
        assert_eq!(config.seed, None);
        assert!(config.discussion);
        assert!(config.concurrent_polling);
    }

    #[test]
    fn bad_json() {
        assert!(matches!(GameConfig::from_json("{ \"seed\": \"nope\" }"), Err(CoupError::Config(_))));
    }

    #[test]
    fn same_seed_same_rng() {
        let config = GameConfig::default().with_seed(5);
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }
}
