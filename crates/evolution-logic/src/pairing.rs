//! Random pairing of a generation into games
//!
//! One uniform shuffle of the whole population, then consecutive pairs
//! `(0, 1), (2, 3), ...`. Shuffling never looks at strategy kinds, so no
//! kind is favoured when opponents are assigned.

use rand::seq::SliceRandom;

use crate::error::ConfigurationError;
use crate::random::SeededRng;

/// Pairing of population indices for one generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pairing {
    /// Opponent pairs, each index appears at most once
    pub pairs: Vec<(usize, usize)>,
    /// Index left over when the population is odd; sits the generation out
    pub bye: Option<usize>,
}

/// Shuffle `0..participant_count` and pair consecutive entries
///
/// Tolerates an odd count by leaving the last shuffled index unpaired.
pub fn shuffle_pairs(participant_count: usize, rng: &mut SeededRng) -> Pairing {
    let mut order: Vec<usize> = (0..participant_count).collect();
    order.shuffle(rng);

    let mut chunks = order.chunks_exact(2);
    let pairs = chunks.by_ref().map(|pair| (pair[0], pair[1])).collect();
    let bye = chunks.remainder().first().copied();

    Pairing { pairs, bye }
}

/// Perfect matching of `0..participant_count`
///
/// Strict form of [`shuffle_pairs`] for callers that need every participant
/// to play, such as a validated first generation. Fails for an odd count
/// instead of leaving a bye; for an even count the pairs are exactly those
/// [`shuffle_pairs`] draws from the same RNG state.
pub fn pair_indices(
    participant_count: usize,
    rng: &mut SeededRng,
) -> Result<Vec<(usize, usize)>, ConfigurationError> {
    if participant_count % 2 != 0 {
        return Err(ConfigurationError::OddPopulation {
            total: participant_count as u64,
        });
    }
    Ok(shuffle_pairs(participant_count, rng).pairs)
}
