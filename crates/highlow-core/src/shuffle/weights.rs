use crate::model::card::Card;
use core::fmt;

/// Cards in a full deck.
pub const DECK_SIZE: usize = 52;
/// Cards in the heart class.
pub const HEART_COUNT: usize = 13;
/// Cards in the ace-of-spades class.
pub const ACE_OF_SPADES_COUNT: usize = 1;
/// Cards in the standard class (everything else).
pub const STANDARD_COUNT: usize = 38;

const HEART_MULTIPLIER: f64 = 2.0;
const ACE_OF_SPADES_MULTIPLIER: f64 = 3.0;
const STANDARD_MULTIPLIER: f64 = 1.0;

/// Extra factor applied to each heart's per-card weight on the reservoir
/// path only. Kept separate from the class multipliers above so the two
/// shuffles stay independently tunable.
pub const SMART_HEART_BOOST: f64 = 3.0;

/// The three draw classes a card can fall into. Classification is exhaustive
/// and disjoint: the ace of spades is never counted as a standard card, and
/// hearts never overlap either other class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightClass {
    Heart,
    AceOfSpades,
    Standard,
}

impl WeightClass {
    pub const ALL: [WeightClass; 3] = [
        WeightClass::Heart,
        WeightClass::AceOfSpades,
        WeightClass::Standard,
    ];

    pub const fn of(card: Card) -> Self {
        if card.is_ace_of_spades() {
            WeightClass::AceOfSpades
        } else if card.is_heart() {
            WeightClass::Heart
        } else {
            WeightClass::Standard
        }
    }

    /// Stable snake_case name for config files and report rows.
    pub const fn label(self) -> &'static str {
        match self {
            WeightClass::Heart => "heart",
            WeightClass::AceOfSpades => "ace_of_spades",
            WeightClass::Standard => "standard",
        }
    }

    /// Number of deck cards in this class.
    pub const fn size(self) -> usize {
        match self {
            WeightClass::Heart => HEART_COUNT,
            WeightClass::AceOfSpades => ACE_OF_SPADES_COUNT,
            WeightClass::Standard => STANDARD_COUNT,
        }
    }
}

impl fmt::Display for WeightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized share of the draw probability per class. Raw class mass is
/// multiplier / 52 times the class size; shares divide each mass by the sum
/// of all three, so they always total 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawWeights {
    heart: f64,
    ace_of_spades: f64,
    standard: f64,
}

impl DrawWeights {
    pub fn normalized() -> Self {
        let heart = raw_mass(HEART_MULTIPLIER, HEART_COUNT);
        let ace_of_spades = raw_mass(ACE_OF_SPADES_MULTIPLIER, ACE_OF_SPADES_COUNT);
        let standard = raw_mass(STANDARD_MULTIPLIER, STANDARD_COUNT);
        let total = heart + ace_of_spades + standard;
        Self {
            heart: heart / total,
            ace_of_spades: ace_of_spades / total,
            standard: standard / total,
        }
    }

    pub fn share(&self, class: WeightClass) -> f64 {
        match class {
            WeightClass::Heart => self.heart,
            WeightClass::AceOfSpades => self.ace_of_spades,
            WeightClass::Standard => self.standard,
        }
    }

    /// Maps a uniform sample in [0, 1) onto contiguous class bands: hearts
    /// first, then the ace of spades, then standard, each band exactly as
    /// wide as its share.
    pub fn preferred_class(&self, sample: f64) -> WeightClass {
        if sample < self.heart {
            WeightClass::Heart
        } else if sample < self.heart + self.ace_of_spades {
            WeightClass::AceOfSpades
        } else {
            WeightClass::Standard
        }
    }

    /// Per-card weight on the reservoir path: the class share, with hearts
    /// boosted by [`SMART_HEART_BOOST`].
    pub fn smart_weight(&self, class: WeightClass) -> f64 {
        match class {
            WeightClass::Heart => self.heart * SMART_HEART_BOOST,
            WeightClass::AceOfSpades => self.ace_of_spades,
            WeightClass::Standard => self.standard,
        }
    }
}

fn raw_mass(multiplier: f64, class_size: usize) -> f64 {
    multiplier / DECK_SIZE as f64 * class_size as f64
}
