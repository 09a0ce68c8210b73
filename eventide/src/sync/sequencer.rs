use crate::error::{Error, Result};

/// Fixed-size slot array for reassembling out-of-order results.
///
/// Every arriving value carries the sequence id it was issued with and is
/// written to that slot, whatever order the values arrive in. Reading the
/// slots then yields the results in issue order.
///
/// # Examples
///
/// ```rust
/// use eventide::sync::Sequencer;
///
/// let mut responses = Sequencer::new(3);
/// responses.place(2, "third").unwrap();
/// responses.place(0, "first").unwrap();
/// responses.place(1, "second").unwrap();
///
/// assert_eq!(responses.values(), Some(vec!["first", "second", "third"]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer<T> {
    slots: Vec<Option<T>>,
}

impl<T> Sequencer<T> {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Writes `value` into slot `id`, returning the previous occupant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SlotOutOfRange`] if `id >= capacity`.
    pub fn place(&mut self, id: usize, value: T) -> Result<Option<T>> {
        let capacity = self.slots.len();

        match self.slots.get_mut(id) {
            Some(slot) => Ok(slot.replace(value)),
            None => Err(Error::SlotOutOfRange {
                index: id,
                capacity,
            }),
        }
    }

    pub fn get(&self, id: usize) -> Option<&T> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    /// All slots in sequence order, empty ones as `None`.
    pub fn slots(&self) -> &[Option<T>] {
        &self.slots
    }

    /// Number of occupied slots.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// `true` when every slot is occupied.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// The values in sequence order, once every slot is occupied.
    pub fn values(&self) -> Option<Vec<T>>
    where
        T: Clone,
    {
        self.slots.iter().cloned().collect()
    }

    /// Consumes the sequencer, returning the values if complete.
    pub fn into_values(self) -> Option<Vec<T>> {
        self.slots.into_iter().collect()
    }
}
