use crate::model::deck::Deck;
use crate::shuffle::ShuffleError;
use crate::shuffle::partition::DeckPartition;
use crate::shuffle::weights::{DECK_SIZE, DrawWeights, WeightClass};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Stack-based biased shuffle, linear in the deck size: one partition pass,
/// a uniform shuffle of the heart and standard groups, then 52 weighted pops.
///
/// Each round samples the unit interval once, asks the weight model for the
/// preferred class, and pops that class's stack. An empty preferred stack
/// falls back along a fixed chain per class; all three stacks empty before
/// 52 draws would be an engine bug and comes back as an error.
pub fn naive_biased_shuffle<R: Rng + ?Sized>(
    deck: &Deck,
    rng: &mut R,
) -> Result<Deck, ShuffleError> {
    let partition = DeckPartition::split(deck.cards())?;
    let (mut hearts, ace_of_spades, mut standard) = partition.into_groups();
    hearts.shuffle(rng);
    standard.shuffle(rng);

    // The groups become LIFO stacks; pop takes the top. The singleton ace
    // group needs no shuffle.
    let mut ace = vec![ace_of_spades];
    let weights = DrawWeights::normalized();
    let mut shuffled = Vec::with_capacity(DECK_SIZE);
    for _ in 0..DECK_SIZE {
        let sample = rng.gen_range(0.0..1.0);
        let card = match weights.preferred_class(sample) {
            WeightClass::Heart => hearts
                .pop()
                .or_else(|| standard.pop())
                .or_else(|| ace.pop()),
            WeightClass::AceOfSpades => ace
                .pop()
                .or_else(|| hearts.pop())
                .or_else(|| standard.pop()),
            WeightClass::Standard => standard
                .pop()
                .or_else(|| ace.pop())
                .or_else(|| hearts.pop()),
        };
        match card {
            Some(card) => shuffled.push(card),
            None => {
                return Err(ShuffleError::StacksExhausted {
                    drawn: shuffled.len(),
                });
            }
        }
    }
    Ok(Deck::from_cards(shuffled))
}

pub fn naive_biased_shuffle_with_seed(deck: &Deck, seed: u64) -> Result<Deck, ShuffleError> {
    let mut rng = StdRng::seed_from_u64(seed);
    naive_biased_shuffle(deck, &mut rng)
}
