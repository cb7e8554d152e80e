use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn is_heart(self) -> bool {
        self.suit.is_heart()
    }

    pub const fn is_ace_of_spades(self) -> bool {
        matches!(self.rank, Rank::Ace) && matches!(self.suit, Suit::Spades)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, Rank, Suit};

    #[test]
    fn ace_of_spades_identified() {
        let card = Card::new(Rank::Ace, Suit::Spades);
        assert!(card.is_ace_of_spades());
        assert!(!card.is_heart());
    }

    #[test]
    fn other_aces_are_not_the_ace_of_spades() {
        let card = Card::new(Rank::Ace, Suit::Hearts);
        assert!(!card.is_ace_of_spades());
        assert!(card.is_heart());
    }

    #[test]
    fn display_is_rank_then_suit() {
        assert_eq!(Card::new(Rank::Ten, Suit::Hearts).to_string(), "10H");
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).to_string(), "AS");
    }
}
