use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{Question, QuestionBank};

/// Question order fixed for the lifetime of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<Question>,
}

impl SessionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }
}

/// Builds the per-session question order from a bank.
pub struct SessionPlanner<'a> {
    bank: &'a QuestionBank,
    shuffle: bool,
}

impl<'a> SessionPlanner<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self {
            bank,
            shuffle: true,
        }
    }

    /// Enable or disable shuffling; disabled keeps the bank order.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Copy the bank and, if enabled, apply a uniform Fisher–Yates permutation.
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> SessionPlan {
        let mut questions = self.bank.questions().to_vec();
        if self.shuffle {
            questions.as_mut_slice().shuffle(rng);
        }
        SessionPlan { questions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn unshuffled_plan_keeps_bank_order() {
        let bank = QuestionBank::health_basics();
        let mut rng = StdRng::seed_from_u64(1);
        let plan = SessionPlanner::new(&bank).with_shuffle(false).build(&mut rng);
        assert_eq!(plan.questions.as_slice(), bank.questions());
    }

    #[test]
    fn shuffled_plan_is_a_permutation() {
        let bank = QuestionBank::health_basics();
        let mut rng = StdRng::seed_from_u64(2);
        let plan = SessionPlanner::new(&bank).build(&mut rng);

        assert_eq!(plan.total(), bank.len());
        for question in bank.questions() {
            assert_eq!(plan.questions.iter().filter(|q| *q == question).count(), 1);
        }
    }

    #[test]
    fn every_question_lands_everywhere_about_equally() {
        const RUNS: usize = 20_000;
        let bank = QuestionBank::health_basics();
        let n = bank.len();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = vec![vec![0_usize; n]; n];

        for _ in 0..RUNS {
            let plan = SessionPlanner::new(&bank).build(&mut rng);
            for (position, question) in plan.questions.iter().enumerate() {
                let original = bank
                    .questions()
                    .iter()
                    .position(|q| q == question)
                    .unwrap();
                counts[original][position] += 1;
            }
        }

        let expected = RUNS / n;
        let tolerance = expected * 15 / 100;
        for row in &counts {
            for &count in row {
                assert!(
                    count.abs_diff(expected) <= tolerance,
                    "count {count} too far from {expected}"
                );
            }
        }
    }
}
