use crate::model::deck::Deck;
use crate::shuffle::ShuffleError;
use crate::shuffle::partition::validate_deck;
use crate::shuffle::reservoir::WeightedReservoir;
use crate::shuffle::weights::{DECK_SIZE, DrawWeights, WeightClass};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Reservoir-based biased shuffle, quadratic in the deck size: the remaining
/// cards are uniformly shuffled once up front, then every round rebuilds a
/// fresh weighted selector over whatever is still undrawn, draws one card and
/// removes it from the remaining list.
///
/// Per-card weights come from [`DrawWeights::smart_weight`], so hearts carry
/// their boosted class share while the other classes carry the share as-is.
pub fn smart_biased_shuffle<R: Rng + ?Sized>(
    deck: &Deck,
    rng: &mut R,
) -> Result<Deck, ShuffleError> {
    validate_deck(deck.cards())?;

    let mut remaining = deck.cards().to_vec();
    remaining.shuffle(rng);

    let weights = DrawWeights::normalized();
    let mut shuffled = Vec::with_capacity(DECK_SIZE);
    for _ in 0..DECK_SIZE {
        let mut reservoir = WeightedReservoir::with_capacity(remaining.len());
        for &card in &remaining {
            reservoir.insert(card, weights.smart_weight(WeightClass::of(card)));
        }
        let drawn = match reservoir.draw_random(rng) {
            Some(&card) => card,
            None => {
                return Err(ShuffleError::SelectorExhausted {
                    drawn: shuffled.len(),
                });
            }
        };

        // Order-preserving removal keeps the next round's selector scanning
        // the survivors in their original sequence.
        let index = remaining.iter().position(|&card| card == drawn);
        debug_assert!(index.is_some(), "drawn card {drawn} missing from remaining");
        if let Some(index) = index {
            remaining.remove(index);
        }
        shuffled.push(drawn);
    }
    Ok(Deck::from_cards(shuffled))
}

pub fn smart_biased_shuffle_with_seed(deck: &Deck, seed: u64) -> Result<Deck, ShuffleError> {
    let mut rng = StdRng::seed_from_u64(seed);
    smart_biased_shuffle(deck, &mut rng)
}
