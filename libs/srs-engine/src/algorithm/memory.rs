//! Memory model based on the DSR (difficulty, stability, retrievability) model
//! used by FSRS.
//!
//! - Difficulty (D): item hardness 1-10
//! - Stability (S): days until retrievability drops to 90%
//! - Retrievability (R): probability of recall after `t` elapsed days
//!
//! Every function here is total: inputs out of range are clamped, and every
//! returned stability and difficulty is inside its bounds.

use crate::types::Rating;

pub const WEIGHT_COUNT: usize = 19;

pub const MIN_STABILITY: f64 = 0.01;
pub const MAX_STABILITY: f64 = 36500.0;
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;

/// Default weights.
pub const DEFAULT_WEIGHTS: [f64; WEIGHT_COUNT] = [
    0.4, 0.6, 2.4, 5.8, // w[0-3]: initial stability for Again, Hard, Good, Easy
    4.93, // w[4]: initial difficulty base
    0.94, // w[5]: initial difficulty modifier
    0.86, // w[6]: difficulty delta per rating step
    0.01, // w[7]: mean reversion weight
    1.49, // w[8]: stability growth base
    0.14, // w[9]: stability saturation
    0.94, // w[10]: retrievability effect
    2.18, // w[11]: forget stability base
    0.05, // w[12]: difficulty on forget
    0.34, // w[13]: stability on forget
    1.26, // w[14]: retrievability on forget
    0.29, // w[15]: hard penalty
    2.61, // w[16]: easy bonus
    0.51, // w[17]: short-term rating effect
    0.67, // w[18]: short-term offset
];

/// Retrievability after `elapsed_days` for an item with stability `stability`.
/// R = (1 + t / (9 * S))^(-1)
pub fn retrievability(stability: f64, elapsed_days: f64) -> f64 {
    let s = clamp_stability(stability);
    let t = elapsed_days.max(0.0);
    (1.0 + t / (9.0 * s)).powf(-1.0)
}

pub fn clamp_stability(stability: f64) -> f64 {
    if stability.is_nan() {
        return MIN_STABILITY;
    }
    stability.clamp(MIN_STABILITY, MAX_STABILITY)
}

pub fn clamp_difficulty(difficulty: f64) -> f64 {
    if difficulty.is_nan() {
        return MAX_DIFFICULTY;
    }
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Stability and difficulty update rules.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryModel {
    pub w: [f64; WEIGHT_COUNT],
}

impl Default for MemoryModel {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHTS)
    }
}

impl MemoryModel {
    pub fn new(w: [f64; WEIGHT_COUNT]) -> Self {
        Self { w }
    }

    /// S0(G) = w[G-1]
    pub fn initial_stability(&self, rating: Rating) -> f64 {
        let index = usize::from(rating.to_value() - 1);
        clamp_stability(self.w[index])
    }

    /// D0(G) = w[4] - w[5] * (G - 3)
    pub fn initial_difficulty(&self, rating: Rating) -> f64 {
        clamp_difficulty(self.w[4] - self.w[5] * rating.offset_from_good())
    }

    /// D' = D - w[6] * (G - 3), then mean reversion toward D0(Good):
    /// D'' = w[7] * D0(Good) + (1 - w[7]) * D'
    pub fn next_difficulty(&self, difficulty: f64, rating: Rating) -> f64 {
        let shifted = clamp_difficulty(difficulty) - self.w[6] * rating.offset_from_good();
        let target = self.initial_difficulty(Rating::Good);
        clamp_difficulty(self.w[7] * target + (1.0 - self.w[7]) * shifted)
    }

    /// Stability after a review with retrievability `retrievability`.
    /// Success and failure use separate branches.
    pub fn next_stability(
        &self,
        stability: f64,
        difficulty: f64,
        retrievability: f64,
        rating: Rating,
    ) -> f64 {
        if rating.is_success() {
            self.recall_stability(stability, difficulty, retrievability, rating)
        } else {
            self.forget_stability(stability, difficulty, retrievability)
        }
    }

    /// S' = S * (1 + e^w[8] * (11 - D) * S^(-w[9]) * (e^(w[10] * (1 - R)) - 1) * m)
    fn recall_stability(
        &self,
        stability: f64,
        difficulty: f64,
        retrievability: f64,
        rating: Rating,
    ) -> f64 {
        let s = clamp_stability(stability);
        let d = clamp_difficulty(difficulty);
        let r = retrievability.clamp(0.0, 1.0);

        let modifier = match rating {
            Rating::Hard => self.w[15],
            Rating::Easy => self.w[16],
            Rating::Good | Rating::Again => 1.0,
        };
        let growth = self.w[8].exp()
            * (11.0 - d)
            * s.powf(-self.w[9])
            * ((self.w[10] * (1.0 - r)).exp() - 1.0)
            * modifier;

        // Growth is never negative, so a successful review never loses stability.
        clamp_stability(s * (1.0 + growth.max(0.0)))
    }

    /// S' = w[11] * D^(-w[12]) * ((S + 1)^w[13] - 1) * e^(w[14] * (1 - R))
    fn forget_stability(&self, stability: f64, difficulty: f64, retrievability: f64) -> f64 {
        let s = clamp_stability(stability);
        let d = clamp_difficulty(difficulty);
        let r = retrievability.clamp(0.0, 1.0);

        let new_s = self.w[11]
            * d.powf(-self.w[12])
            * ((s + 1.0).powf(self.w[13]) - 1.0)
            * (self.w[14] * (1.0 - r)).exp();
        // Never exceed previous stability on lapse
        clamp_stability(new_s.min(s))
    }

    /// Same-session stability update used on the learning ladders.
    /// S' = S * e^(w[17] * (G - 3 + w[18]))
    pub fn short_term_stability(&self, stability: f64, rating: Rating) -> f64 {
        let s = clamp_stability(stability);
        clamp_stability(s * (self.w[17] * (rating.offset_from_good() + self.w[18])).exp())
    }

    /// Interval (days) at which retrievability falls to `desired_retention`.
    /// I = 9 * S * (1/R - 1)
    pub fn interval_for(&self, stability: f64, desired_retention: f64) -> f64 {
        let s = clamp_stability(stability);
        if desired_retention <= 0.0 || desired_retention >= 1.0 {
            return s;
        }
        9.0 * s * (1.0 / desired_retention - 1.0)
    }
}
