use thiserror::Error;

/// Deltas selectable by a rating index, lowest tier first.
pub const DELTAS: [f64; 6] = [1.0, 3.0, 4.0, 5.0, 6.0, 8.0];

/// Totals strictly above this count as a good outcome.
pub const GOOD_OUTCOME_THRESHOLD: f64 = 25.0;

/// Errors raised by indexed access to the delta table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("score index {index} is outside the delta table (0..{len})")]
    OutOfRange { index: i64, len: usize },
}

/// A running total driven by indexed lookups into a fixed table of deltas.
///
/// The accumulator is owned by a single conversation and lives exactly as
/// long as it does. A failed update never touches the total.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreAccumulator {
    total: f64,
    deltas: [f64; 6],
}

impl Default for ScoreAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreAccumulator {
    /// Creates an accumulator with a zero total.
    pub fn new() -> Self {
        Self {
            total: 0.0,
            deltas: DELTAS,
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn deltas(&self) -> &[f64; 6] {
        &self.deltas
    }

    /// Adds the delta at `index` to the total.
    pub fn apply_positive(&mut self, index: i64) -> Result<(), ScoreError> {
        let delta = self.delta_at(index)?;
        self.total += delta;
        Ok(())
    }

    /// Subtracts the delta at `index` from the total and returns the new total.
    pub fn apply_negative(&mut self, index: i64) -> Result<f64, ScoreError> {
        let delta = self.delta_at(index)?;
        self.total -= delta;
        Ok(self.total)
    }

    pub fn is_good_outcome(&self) -> bool {
        self.total > GOOD_OUTCOME_THRESHOLD
    }

    pub fn is_bad_outcome(&self) -> bool {
        self.total < 0.0
    }

    fn delta_at(&self, index: i64) -> Result<f64, ScoreError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.deltas.get(i).copied())
            .ok_or(ScoreError::OutOfRange {
                index,
                len: self.deltas.len(),
            })
    }
}
