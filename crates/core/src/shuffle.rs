use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::Question;

/// Display order of answer choices, computed once per question index.
///
/// Kept beside the question list so fetched questions stay untouched and a
/// question's choices do not reorder while the user is looking at them.
#[derive(Debug, Clone, Default)]
pub struct ShuffleTable {
    orders: HashMap<usize, Vec<String>>,
}

impl ShuffleTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached order for `index`, shuffling `question`'s answers on first use.
    pub fn choices_for<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        question: &Question,
        rng: &mut R,
    ) -> &[String] {
        self.orders.entry(index).or_insert_with(|| {
            let mut answers = question.all_answers();
            answers.shuffle(rng);
            answers
        })
    }

    #[must_use]
    pub fn cached(&self, index: usize) -> Option<&[String]> {
        self.orders.get(&index).map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}
