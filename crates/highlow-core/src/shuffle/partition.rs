use crate::model::card::Card;
use crate::shuffle::ShuffleError;
use crate::shuffle::weights::{DECK_SIZE, HEART_COUNT, STANDARD_COUNT, WeightClass};
use std::collections::HashSet;

/// A full deck split into the three disjoint draw groups. Group sizes are
/// fixed by the deck composition: 13 hearts, the ace of spades, 38 standard
/// cards.
#[derive(Debug, Clone)]
pub struct DeckPartition {
    hearts: Vec<Card>,
    ace_of_spades: Card,
    standard: Vec<Card>,
}

impl DeckPartition {
    /// Splits a deck into its weight classes after checking the biased
    /// shuffle preconditions.
    pub fn split(cards: &[Card]) -> Result<Self, ShuffleError> {
        validate_deck(cards)?;

        let mut hearts = Vec::with_capacity(HEART_COUNT);
        let mut ace_of_spades = None;
        let mut standard = Vec::with_capacity(STANDARD_COUNT);
        for &card in cards {
            match WeightClass::of(card) {
                WeightClass::Heart => hearts.push(card),
                WeightClass::AceOfSpades => ace_of_spades = Some(card),
                WeightClass::Standard => standard.push(card),
            }
        }

        let ace_of_spades = ace_of_spades.ok_or(ShuffleError::MissingAceOfSpades)?;
        debug_assert_eq!(hearts.len(), HEART_COUNT);
        debug_assert_eq!(standard.len(), STANDARD_COUNT);
        Ok(Self {
            hearts,
            ace_of_spades,
            standard,
        })
    }

    pub fn hearts(&self) -> &[Card] {
        &self.hearts
    }

    pub fn ace_of_spades(&self) -> Card {
        self.ace_of_spades
    }

    pub fn standard(&self) -> &[Card] {
        &self.standard
    }

    /// Consumes the partition into (hearts, ace of spades, standard).
    pub fn into_groups(self) -> (Vec<Card>, Card, Vec<Card>) {
        (self.hearts, self.ace_of_spades, self.standard)
    }
}

/// Input contract shared by both biased shuffles: exactly 52 cards, no card
/// twice, ace of spades present. With typed cards 52 unique entries always
/// include the ace, but the check stays part of the explicit contract.
pub(crate) fn validate_deck(cards: &[Card]) -> Result<(), ShuffleError> {
    if cards.len() != DECK_SIZE {
        return Err(ShuffleError::WrongDeckSize { found: cards.len() });
    }
    let mut seen = HashSet::with_capacity(DECK_SIZE);
    for &card in cards {
        if !seen.insert(card) {
            return Err(ShuffleError::DuplicateCard(card));
        }
    }
    if !cards.iter().any(|card| card.is_ace_of_spades()) {
        return Err(ShuffleError::MissingAceOfSpades);
    }
    Ok(())
}
