use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use crate::{Character, CoupError, CHARACTER_VARIANTS, COPIES_PER_CHARACTER};

/// The shared draw pile. The top of the deck is the end of the vec.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Deck {
    cards: Vec<Character>,
}

impl Deck {
    /// Every copy of every character, unshuffled.
    pub fn full() -> Self {
        let cards = CHARACTER_VARIANTS.iter()
            .flat_map(|&card| std::iter::repeat(card).take(COPIES_PER_CHARACTER))
            .collect();

        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn count(&self, character: Character) -> usize {
        self.cards.iter().filter(|&&card| card == character).count()
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn draw(&mut self) -> Result<Character, CoupError> {
        self.cards.pop().ok_or(CoupError::DeckExhausted)
    }

    pub fn return_and_reshuffle<R, I>(&mut self, cards: I, rng: &mut R)
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = Character>,
    {
        self.cards.extend(cards);
        self.shuffle(rng);
    }

    /// Puts a card on top without shuffling. Only for rigging games in tests.
    #[cfg(test)]
    pub(crate) fn put(&mut self, card: Character) {
        self.cards.push(card);
    }

    /// Pulls a specific card out of the deck. Only for rigging games in tests.
    #[cfg(test)]
    pub(crate) fn take(&mut self, card: Character) -> Option<Character> {
        let idx = self.cards.iter().position(|&c| c == card)?;
        Some(self.cards.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use crate::deck::Deck;
    use crate::{CoupError, CHARACTER_VARIANTS, TOTAL_CARDS};
    use crate::Character::{Ambassador, Duke};

    #[test]
    fn full_deck_has_three_of_each() {
        let deck = Deck::full();
        assert_eq!(deck.len(), TOTAL_CARDS);
        for character in CHARACTER_VARIANTS {
            assert_eq!(deck.count(character), 3);
        }
    }

    #[test]
    fn draw_until_empty() {
        let mut deck = Deck::full();
        for _ in 0..TOTAL_CARDS {
            deck.draw().unwrap();
        }
        assert!(deck.is_empty());
        assert!(matches!(deck.draw(), Err(CoupError::DeckExhausted)));
    }

    #[test]
    fn return_and_reshuffle_keeps_every_card() {
        let mut rng = Pcg64::seed_from_u64(1);
        let mut deck = Deck::full();
        deck.shuffle(&mut rng);

        let a = deck.draw().unwrap();
        let b = deck.draw().unwrap();
        deck.return_and_reshuffle([a, b], &mut rng);

        assert_eq!(deck.len(), TOTAL_CARDS);
        for character in CHARACTER_VARIANTS {
            assert_eq!(deck.count(character), 3);
        }
    }

    #[test]
    fn shuffle_reaches_every_position() {
        // crude uniformity check: the top card should be each character about a fifth of the time
        let mut rng = Pcg64::seed_from_u64(99);
        let mut top_counts = [0usize; 5];
        for _ in 0..5000 {
            let mut deck = Deck::full();
            deck.shuffle(&mut rng);
            let top = deck.draw().unwrap();
            let idx = CHARACTER_VARIANTS.iter().position(|&c| c == top).unwrap();
            top_counts[idx] += 1;
        }

        for count in top_counts {
            assert!((850..1150).contains(&count), "skewed shuffle: {:?}", top_counts);
        }
    }

    #[test]
    fn rigging_helpers() {
        let mut deck = Deck::full();
        assert_eq!(deck.take(Duke), Some(Duke));
        assert_eq!(deck.count(Duke), 2);
        deck.put(Ambassador);
        assert_eq!(deck.draw().unwrap(), Ambassador);
    }
}
