use crate::dominance::{ConstrainedParetoDominance, Dominance, DominanceComparator};
use crate::error::{EpsBoxError, Result};
use crate::rng::RandomNumberGenerator;
use crate::solution::Solution;

use super::Selection;

/// Selects parents uniformly at random, with replacement.
///
/// This is the default restart selection: every archive member is equally
/// likely to seed new offspring.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSelection;

impl Selection for UniformSelection {
    fn select(
        &self,
        arity: usize,
        source: &[Solution],
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Solution>> {
        if source.is_empty() {
            return Err(EpsBoxError::EmptyPopulation);
        }

        Ok((0..arity)
            .map(|_| source[rng.next_index(source.len())].clone())
            .collect())
    }
}

/// A selection strategy that selects individuals through tournament selection.
///
/// Each tournament draws `tournament_size` participants uniformly with
/// replacement and keeps the first participant not dominated by a later one:
/// a participant replaces the current winner only if it dominates it.
///
/// Tournament selection provides a balance between exploration and exploitation:
/// - Smaller tournament sizes lead to more exploration (more random selection)
/// - Larger tournament sizes lead to more exploitation (more focus on the best individuals)
///
/// The size can be tied to the population size with
/// [`with_size_fraction`](TournamentSelection::with_size_fraction); it is then
/// recomputed whenever a restart resizes the population.
///
/// # Examples
///
/// ```
/// use epsbox::operator::{Selection, TournamentSelection};
/// use epsbox::rng::RandomNumberGenerator;
/// use epsbox::solution::Solution;
///
/// let pool = vec![
///     Solution::with_objectives(&[0.0, 0.0]),
///     Solution::with_objectives(&[1.0, 1.0]),
/// ];
/// let mut rng = RandomNumberGenerator::from_seed(1);
///
/// let selection = TournamentSelection::new(2).unwrap();
/// let selected = selection.select(3, &pool, &mut rng).unwrap();
/// assert_eq!(selected.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct TournamentSelection<C = ConstrainedParetoDominance>
where
    C: DominanceComparator,
{
    tournament_size: usize,
    size_fraction: Option<f64>,
    comparator: C,
}

impl TournamentSelection<ConstrainedParetoDominance> {
    /// Creates a tournament of the given size under constrained Pareto dominance.
    ///
    /// # Errors
    ///
    /// Returns an error if `tournament_size` is 0.
    pub fn new(tournament_size: usize) -> Result<Self> {
        Self::with_comparator(tournament_size, ConstrainedParetoDominance)
    }
}

impl Default for TournamentSelection<ConstrainedParetoDominance> {
    fn default() -> Self {
        Self {
            tournament_size: 2,
            size_fraction: None,
            comparator: ConstrainedParetoDominance,
        }
    }
}

impl<C> TournamentSelection<C>
where
    C: DominanceComparator,
{
    pub fn with_comparator(tournament_size: usize, comparator: C) -> Result<Self> {
        if tournament_size < 1 {
            return Err(EpsBoxError::InvalidConfiguration(
                "Tournament size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            tournament_size,
            size_fraction: None,
            comparator,
        })
    }

    /// Sizes the tournament as a fraction of the population after each restart.
    pub fn with_size_fraction(mut self, fraction: f64) -> Result<Self> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(EpsBoxError::InvalidConfiguration(format!(
                "Tournament size fraction must be in (0, 1], got {}",
                fraction
            )));
        }
        self.size_fraction = Some(fraction);
        Ok(self)
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Runs a single tournament and returns the index of the winner.
    fn run_tournament(&self, source: &[Solution], rng: &mut RandomNumberGenerator) -> Result<usize> {
        let mut winner = rng.next_index(source.len());

        for _ in 1..self.tournament_size {
            let challenger = rng.next_index(source.len());
            if self.comparator.compare(&source[challenger], &source[winner])? == Dominance::Dominates
            {
                winner = challenger;
            }
        }

        Ok(winner)
    }
}

impl<C> Selection for TournamentSelection<C>
where
    C: DominanceComparator,
{
    fn select(
        &self,
        arity: usize,
        source: &[Solution],
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Solution>> {
        if source.is_empty() {
            return Err(EpsBoxError::EmptyPopulation);
        }

        let mut selected = Vec::with_capacity(arity);
        for _ in 0..arity {
            let winner = self.run_tournament(source, rng)?;
            selected.push(source[winner].clone());
        }
        Ok(selected)
    }

    fn adapt_to_population_size(&mut self, population_size: usize) {
        if let Some(fraction) = self.size_fraction {
            self.tournament_size = ((fraction * population_size as f64).round() as usize).max(2);
        }
    }
}
