use super::error::NarrationError;
use super::synthesizer::SynthesisOutcome;
use once_cell::sync::OnceCell;

/// Fixed-size, index-addressed results, one write-once slot per segment.
///
/// Each slot is its own cell so concurrent tasks writing disjoint indices
/// never contend with each other.
#[derive(Debug)]
pub struct ResultStore {
    slots: Vec<OnceCell<SynthesisOutcome>>,
}

impl ResultStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| OnceCell::new()).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn set(&self, index: usize, outcome: SynthesisOutcome) -> Result<(), NarrationError> {
        let slot = self.slots.get(index).ok_or(NarrationError::SlotOutOfRange {
            index,
            capacity: self.slots.len(),
        })?;
        slot.set(outcome)
            .map_err(|_| NarrationError::DuplicateWrite(index))
    }

    /// Number of slots that hold an outcome
    pub fn settled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }

    /// Consume the store, yielding outcomes in index order.
    ///
    /// Only valid once every slot is settled.
    pub fn into_ordered(self) -> Result<Vec<SynthesisOutcome>, NarrationError> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.into_inner().ok_or(NarrationError::UnsettledSlot(index)))
            .collect()
    }
}
