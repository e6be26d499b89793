//! Fast nondominated sorting with crowding distance.
//!
//! Assigns the `rank` attribute (0 for the first front) and the
//! `crowding_distance` attribute to every solution of a population, which is
//! what [`RankAndCrowding`](super::RankAndCrowding) orders by.

use crate::dominance::{ConstrainedParetoDominance, Dominance, DominanceComparator};
use crate::error::Result;
use crate::solution::{AttributeValue, Solution, CROWDING_DISTANCE, RANK};

use super::Population;

#[derive(Debug, Clone, Default)]
pub struct NondominatedSorting<C = ConstrainedParetoDominance>
where
    C: DominanceComparator,
{
    comparator: C,
}

impl NondominatedSorting<ConstrainedParetoDominance> {
    /// Sorting under constrained Pareto dominance.
    pub fn pareto() -> Self {
        Self::new(ConstrainedParetoDominance)
    }
}

impl<C> NondominatedSorting<C>
where
    C: DominanceComparator,
{
    pub fn new(comparator: C) -> Self {
        Self { comparator }
    }

    /// Computes the fronts as lists of indices into `solutions`.
    pub fn fronts(&self, solutions: &[Solution]) -> Result<Vec<Vec<usize>>> {
        let n = solutions.len();
        let mut dominated_count = vec![0usize; n];
        let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                match self.comparator.compare(&solutions[i], &solutions[j])? {
                    Dominance::Dominates => {
                        dominates[i].push(j);
                        dominated_count[j] += 1;
                    }
                    Dominance::DominatedBy => {
                        dominates[j].push(i);
                        dominated_count[i] += 1;
                    }
                    Dominance::NonDominated => {}
                }
            }
        }

        let mut fronts = Vec::new();
        let mut current: Vec<usize> = (0..n).filter(|&i| dominated_count[i] == 0).collect();

        while !current.is_empty() {
            let mut next = Vec::new();
            for &i in &current {
                for &j in &dominates[i] {
                    dominated_count[j] -= 1;
                    if dominated_count[j] == 0 {
                        next.push(j);
                    }
                }
            }
            next.sort_unstable();
            fronts.push(current);
            current = next;
        }

        Ok(fronts)
    }

    /// Assigns rank and crowding distance attributes to every solution.
    pub fn evaluate(&self, population: &mut Population) -> Result<()> {
        let fronts = self.fronts(population.as_slice())?;

        for (rank, front) in fronts.iter().enumerate() {
            let distances = crowding_distances(population.as_slice(), front);

            for (&index, distance) in front.iter().zip(distances) {
                if let Some(solution) = population.get_mut(index) {
                    solution.set_attribute(RANK, AttributeValue::Int(rank as i64));
                    solution.set_attribute(CROWDING_DISTANCE, AttributeValue::Real(distance));
                }
            }
        }

        Ok(())
    }
}

/// Crowding distance of each member of `front`, in `front` order.
fn crowding_distances(solutions: &[Solution], front: &[usize]) -> Vec<f64> {
    let size = front.len();
    if size <= 2 {
        return vec![f64::INFINITY; size];
    }

    let num_objectives = solutions[front[0]].num_objectives();
    let mut distances = vec![0.0; size];
    let mut order: Vec<usize> = (0..size).collect();

    for objective in 0..num_objectives {
        let value = |k: usize| solutions[front[k]].objective(objective);
        order.sort_by(|&a, &b| value(a).total_cmp(&value(b)));

        let min = value(order[0]);
        let max = value(order[size - 1]);
        distances[order[0]] = f64::INFINITY;
        distances[order[size - 1]] = f64::INFINITY;

        if max - min <= 0.0 {
            continue;
        }

        for k in 1..(size - 1) {
            let gap = value(order[k + 1]) - value(order[k - 1]);
            distances[order[k]] += gap / (max - min);
        }
    }

    distances
}
