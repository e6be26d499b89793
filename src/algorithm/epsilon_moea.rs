//! # EpsilonMoea
//!
//! Steady-state epsilon-dominance MOEA. The first step fills the population
//! with uniformly random solutions; every later step breeds one batch of
//! offspring from population members and one archive member, then offers
//! each child to the population and to the archive.
//!
//! A child enters the population by replacing a random member it dominates,
//! or a random member if it is non-dominated; a dominated child is discarded
//! from the population but still offered to the archive.

use tracing::debug;

use super::{Components, EpsilonBoxAlgorithm};
use crate::archive::{ArchiveOptions, EpsilonBoxArchive};
use crate::dominance::{ConstrainedParetoDominance, Dominance, DominanceComparator};
use crate::error::{ensure_len, EpsBoxError, Result};
use crate::operator::{Problem, Selection, TournamentSelection, Variation};
use crate::population::Population;
use crate::rng::RandomNumberGenerator;
use crate::solution::Solution;

#[derive(Debug)]
pub struct EpsilonMoea<P: Problem> {
    problem: P,
    population: Population,
    archive: EpsilonBoxArchive,
    selection: TournamentSelection,
    variation: Box<dyn Variation>,
    comparator: ConstrainedParetoDominance,
    initial_population_size: usize,
    evaluations: u64,
}

impl<P: Problem> EpsilonMoea<P> {
    /// # Errors
    ///
    /// - [`EpsBoxError::InvalidConfiguration`] if `initial_population_size` is 0.
    /// - [`EpsBoxError::DimensionMismatch`] if the epsilon count differs from
    ///   the problem's objective count.
    pub fn new(
        problem: P,
        archive_options: ArchiveOptions,
        initial_population_size: usize,
        variation: Box<dyn Variation>,
    ) -> Result<Self> {
        if initial_population_size == 0 {
            return Err(EpsBoxError::InvalidConfiguration(
                "Initial population size must be positive".to_string(),
            ));
        }
        ensure_len(
            "epsilons",
            problem.num_objectives(),
            archive_options.epsilons().num_objectives(),
        )?;

        Ok(Self {
            problem,
            population: Population::with_capacity(initial_population_size),
            archive: EpsilonBoxArchive::new(archive_options),
            selection: TournamentSelection::default(),
            variation,
            comparator: ConstrainedParetoDominance,
            initial_population_size,
            evaluations: 0,
        })
    }

    pub fn initial_population_size(&self) -> usize {
        self.initial_population_size
    }

    fn evaluate(&mut self, solution: &mut Solution) -> Result<()> {
        self.problem.evaluate(solution)?;
        self.evaluations += 1;
        Ok(())
    }

    fn initialize(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
        let bounds = self.problem.bounds();
        ensure_len("bounds", self.problem.num_variables(), bounds.len())?;

        let mut population = Population::with_capacity(self.initial_population_size);
        for _ in 0..self.initial_population_size {
            let mut solution = self.problem.new_solution();
            for (value, &(lower, upper)) in solution.variables_mut().iter_mut().zip(&bounds) {
                *value = if lower < upper {
                    rng.gen_range(lower..upper)
                } else {
                    lower
                };
            }
            self.evaluate(&mut solution)?;
            self.archive.epsilons().solution_key(&solution)?;
            population.add(solution.clone());
            self.archive.add(solution)?;
        }
        self.population = population;

        debug!(
            population = self.population.len(),
            archive = self.archive.len(),
            "Initialized population"
        );
        Ok(())
    }

    /// Picks `arity - 1` parents from the population and one from the archive.
    fn select_parents(&self, rng: &mut RandomNumberGenerator) -> Result<Vec<Solution>> {
        let arity = self.variation.arity();

        let mut parents = if self.archive.len() <= 1 {
            self.selection
                .select(arity, self.population.as_slice(), rng)?
        } else {
            let mut parents = self
                .selection
                .select(arity.saturating_sub(1), self.population.as_slice(), rng)?;
            let member = rng.next_index(self.archive.len());
            parents.push(self.archive.as_slice()[member].clone());
            parents
        };

        rng.shuffle(&mut parents);
        Ok(parents)
    }

    fn add_to_population(&mut self, child: Solution, rng: &mut RandomNumberGenerator) -> Result<bool> {
        let mut dominated = Vec::new();
        let mut is_dominated = false;

        for (index, member) in self.population.iter().enumerate() {
            match self.comparator.compare(&child, member)? {
                Dominance::Dominates => dominated.push(index),
                Dominance::DominatedBy => is_dominated = true,
                Dominance::NonDominated => {}
            }
        }

        let replaced = if !dominated.is_empty() {
            dominated[rng.next_index(dominated.len())]
        } else if is_dominated {
            return Ok(false);
        } else {
            rng.next_index(self.population.len())
        };

        self.population.replace(replaced, child)?;
        Ok(true)
    }
}

impl<P: Problem> EpsilonBoxAlgorithm for EpsilonMoea<P> {
    fn step(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
        if self.population.is_empty() {
            return self.initialize(rng);
        }

        let parents = self.select_parents(rng)?;
        let offspring = self.variation.evolve(&parents, rng)?;

        for mut child in offspring {
            self.evaluate(&mut child)?;
            // Unusable children must not reach the population either.
            self.archive.epsilons().solution_key(&child)?;
            self.add_to_population(child.clone(), rng)?;
            self.archive.add(child)?;
        }

        Ok(())
    }

    fn population(&self) -> &Population {
        &self.population
    }

    fn archive(&self) -> &EpsilonBoxArchive {
        &self.archive
    }

    fn problem(&self) -> &dyn Problem {
        &self.problem
    }

    fn evaluations(&self) -> u64 {
        self.evaluations
    }

    fn components(&mut self) -> Components<'_> {
        Components {
            population: &mut self.population,
            archive: &mut self.archive,
            problem: &self.problem,
            evaluations: &mut self.evaluations,
        }
    }
}
