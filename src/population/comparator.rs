//! Total orderings used to sort and truncate a [`Population`](super::Population).
//!
//! `Ordering::Less` means "better". Every comparator here is total, so the
//! stable sort behind `Population::truncate` is deterministic.

use std::cmp::Ordering;

use crate::solution::{Solution, CROWDING_DISTANCE, RANK};

/// A total ordering of solutions where `Less` is better.
///
/// Closures `Fn(&Solution, &Solution) -> Ordering` implement this trait.
pub trait SolutionComparator: Send + Sync {
    fn compare(&self, a: &Solution, b: &Solution) -> Ordering;
}

impl<F> SolutionComparator for F
where
    F: Fn(&Solution, &Solution) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &Solution, b: &Solution) -> Ordering {
        self(a, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Orders by a single objective, smaller first.
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveComparator {
    objective: usize,
}

impl ObjectiveComparator {
    pub fn new(objective: usize) -> Self {
        Self { objective }
    }
}

impl SolutionComparator for ObjectiveComparator {
    fn compare(&self, a: &Solution, b: &Solution) -> Ordering {
        a.objective(self.objective)
            .total_cmp(&b.objective(self.objective))
    }
}

/// Orders by aggregate constraint violation, feasible first.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateConstraintComparator;

impl SolutionComparator for AggregateConstraintComparator {
    fn compare(&self, a: &Solution, b: &Solution) -> Ordering {
        a.constraint_violation()
            .total_cmp(&b.constraint_violation())
    }
}

/// Orders by a numeric attribute. Solutions without the attribute sort last.
#[derive(Debug, Clone)]
pub struct AttributeComparator {
    key: String,
    order: SortOrder,
}

impl AttributeComparator {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: key.into(),
            order,
        }
    }
}

impl SolutionComparator for AttributeComparator {
    fn compare(&self, a: &Solution, b: &Solution) -> Ordering {
        let va = a.attribute(&self.key).and_then(|v| v.as_real());
        let vb = b.attribute(&self.key).and_then(|v| v.as_real());

        match (va, vb) {
            (Some(x), Some(y)) => match self.order {
                SortOrder::Ascending => x.total_cmp(&y),
                SortOrder::Descending => y.total_cmp(&x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Lower rank first, then larger crowding distance first.
#[derive(Debug, Clone)]
pub struct RankAndCrowding {
    rank: AttributeComparator,
    crowding: AttributeComparator,
}

impl Default for RankAndCrowding {
    fn default() -> Self {
        Self {
            rank: AttributeComparator::new(RANK, SortOrder::Ascending),
            crowding: AttributeComparator::new(CROWDING_DISTANCE, SortOrder::Descending),
        }
    }
}

impl SolutionComparator for RankAndCrowding {
    fn compare(&self, a: &Solution, b: &Solution) -> Ordering {
        self.rank
            .compare(a, b)
            .then_with(|| self.crowding.compare(a, b))
    }
}

/// Applies comparators in turn until one of them decides.
#[derive(Default)]
pub struct ChainedComparator {
    comparators: Vec<Box<dyn SolutionComparator>>,
}

impl ChainedComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then<C>(mut self, comparator: C) -> Self
    where
        C: SolutionComparator + 'static,
    {
        self.comparators.push(Box::new(comparator));
        self
    }
}

impl SolutionComparator for ChainedComparator {
    fn compare(&self, a: &Solution, b: &Solution) -> Ordering {
        self.comparators
            .iter()
            .map(|comparator| comparator.compare(a, b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::AttributeValue;

    #[test]
    fn test_attribute_comparator_missing_last() {
        let mut a = Solution::with_objectives(&[0.0]);
        a.set_attribute(RANK, AttributeValue::Int(3));
        let b = Solution::with_objectives(&[0.0]);

        let cmp = AttributeComparator::new(RANK, SortOrder::Ascending);
        assert_eq!(cmp.compare(&a, &b), Ordering::Less);
        assert_eq!(cmp.compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_rank_and_crowding() {
        let mut a = Solution::with_objectives(&[0.0]);
        a.set_attribute(RANK, AttributeValue::Int(0));
        a.set_attribute(CROWDING_DISTANCE, AttributeValue::Real(0.5));
        let mut b = a.clone();
        b.set_attribute(CROWDING_DISTANCE, AttributeValue::Real(f64::INFINITY));
        let mut c = a.clone();
        c.set_attribute(RANK, AttributeValue::Int(1));

        let cmp = RankAndCrowding::default();
        assert_eq!(cmp.compare(&b, &a), Ordering::Less);
        assert_eq!(cmp.compare(&a, &c), Ordering::Less);
    }

    #[test]
    fn test_chained() {
        let a = Solution::from_parts(vec![], vec![1.0, 0.0], vec![0.0]);
        let b = Solution::from_parts(vec![], vec![1.0, 1.0], vec![0.0]);

        let cmp = ChainedComparator::new()
            .then(AggregateConstraintComparator)
            .then(ObjectiveComparator::new(0))
            .then(ObjectiveComparator::new(1));
        assert_eq!(cmp.compare(&a, &b), Ordering::Less);
        assert_eq!(cmp.compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_closure_comparator() {
        let cmp = |a: &Solution, b: &Solution| b.objective(0).total_cmp(&a.objective(0));
        let a = Solution::with_objectives(&[1.0]);
        let b = Solution::with_objectives(&[2.0]);
        assert_eq!(SolutionComparator::compare(&cmp, &a, &b), Ordering::Greater);
    }
}
