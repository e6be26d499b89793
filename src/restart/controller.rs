use std::fmt;

use rand::seq::index;
use tracing::{debug, info};

use super::{
    ControllerPhase, RestartEvent, RestartMode, RestartOptions, RestartReason, RestartState,
    StepOutcome,
};
use crate::archive::EpsilonBoxArchive;
use crate::error::{EpsBoxError, Result};
use crate::operator::{Problem, Selection, UniformMutation, UniformSelection, Variation};
use crate::population::Population;
use crate::rng::RandomNumberGenerator;

/// Callback fired once per restart.
pub type RestartListener = Box<dyn FnMut(&RestartEvent) + Send>;

/// Handle returned by [`RestartController::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RestartListenerId(u64);

/// Step-driven restart state machine.
///
/// Call [`on_step`](RestartController::on_step) once per generation, after
/// the algorithm has updated its population and archive.
///
/// # Examples
///
/// ```
/// use epsbox::archive::EpsilonBoxArchive;
/// use epsbox::error::Result;
/// use epsbox::operator::Problem;
/// use epsbox::population::Population;
/// use epsbox::restart::{RestartController, RestartMode, RestartOptions};
/// use epsbox::rng::RandomNumberGenerator;
/// use epsbox::solution::Solution;
///
/// struct Flat;
///
/// impl Problem for Flat {
///     fn num_variables(&self) -> usize { 1 }
///     fn num_objectives(&self) -> usize { 2 }
///     fn bounds(&self) -> Vec<(f64, f64)> { vec![(0.0, 1.0)] }
///     fn evaluate(&self, solution: &mut Solution) -> Result<()> {
///         solution.set_objectives(&[1.0, 1.0])
///     }
/// }
///
/// let options = RestartOptions::builder()
///     .window_size(5)
///     .max_window_size(5)
///     .population_size_bounds(4, 40)
///     .mode(RestartMode::AdaptiveTime)
///     .build()
///     .unwrap();
/// let mut controller = RestartController::for_problem(options, &Flat).unwrap();
///
/// let mut archive = EpsilonBoxArchive::with_epsilons(vec![0.1, 0.1]).unwrap();
/// let mut seed = Flat.new_solution();
/// Flat.evaluate(&mut seed).unwrap();
/// archive.add(seed.clone()).unwrap();
/// let mut population: Population = vec![seed; 4].into();
/// let mut rng = RandomNumberGenerator::from_seed(7);
///
/// for _ in 0..10 {
///     controller.on_step(&mut population, &mut archive, &Flat, &mut rng).unwrap();
/// }
/// assert_eq!(controller.number_of_restarts(), 2);
/// assert_eq!(population.len(), 4);
/// ```
pub struct RestartController {
    options: RestartOptions,
    state: RestartState,
    phase: ControllerPhase,
    selection: Box<dyn Selection>,
    variation: Box<dyn Variation>,
    listeners: Vec<(RestartListenerId, RestartListener)>,
    next_listener_id: u64,
}

impl RestartController {
    pub fn new(
        options: RestartOptions,
        selection: Box<dyn Selection>,
        variation: Box<dyn Variation>,
    ) -> Self {
        Self {
            options,
            state: RestartState::default(),
            phase: ControllerPhase::Running,
            selection,
            variation,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Controller with uniform selection and full uniform mutation over the
    /// problem's bounds.
    pub fn for_problem(options: RestartOptions, problem: &dyn Problem) -> Result<Self> {
        let variation = UniformMutation::new(1.0, problem.bounds())?;
        Ok(Self::new(
            options,
            Box::new(UniformSelection),
            Box::new(variation),
        ))
    }

    pub fn options(&self) -> &RestartOptions {
        &self.options
    }

    pub fn state(&self) -> &RestartState {
        &self.state
    }

    /// Replaces the counters, e.g. with ones recovered from a checkpoint, and
    /// resizes the selection operator to the last restart's population.
    pub fn restore_state(&mut self, state: RestartState) {
        if state.population_size_at_last_restart > 0 {
            self.selection
                .adapt_to_population_size(state.population_size_at_last_restart);
        }
        self.state = state;
        self.phase = ControllerPhase::Running;
    }

    /// Phase reached by the last step. A step that failed leaves the phase it
    /// failed in.
    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn number_of_restarts(&self) -> u64 {
        self.state.number_of_restarts
    }

    pub fn selection(&self) -> &dyn Selection {
        self.selection.as_ref()
    }

    pub fn variation(&self) -> &dyn Variation {
        self.variation.as_ref()
    }

    pub fn add_listener<F>(&mut self, listener: F) -> RestartListenerId
    where
        F: FnMut(&RestartEvent) + Send + 'static,
    {
        let id = RestartListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if no listener is registered under `id`.
    pub fn remove_listener(&mut self, id: RestartListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Advances the state machine by one generation.
    ///
    /// # Errors
    ///
    /// Returns [`EpsBoxError::EmptyArchive`] if a restart is due while the
    /// archive is empty. Errors from the problem or the operators during
    /// injection are propagated unchanged.
    pub fn on_step(
        &mut self,
        population: &mut Population,
        archive: &mut EpsilonBoxArchive,
        problem: &dyn Problem,
        rng: &mut RandomNumberGenerator,
    ) -> Result<StepOutcome> {
        self.phase = ControllerPhase::Running;
        self.state.iteration += 1;

        if self.state.iteration - self.state.iterations_at_last_check < self.options.window_size()
        {
            return Ok(StepOutcome::Continued);
        }

        self.phase = ControllerPhase::Checking;
        let improvements = self.options.metric().count(archive);
        let reason = self.check(population, archive, improvements);

        debug!(
            iteration = self.state.iteration,
            improvements,
            last_improvements = self.state.improvements_at_last_check,
            population = population.len(),
            archive = archive.len(),
            ?reason,
            "Restart check"
        );

        match reason {
            Some(reason) => {
                self.phase = ControllerPhase::Restarting;
                let (new_population_size, evaluations) =
                    self.restart(reason, population, archive, problem, rng)?;
                self.phase = ControllerPhase::Running;
                Ok(StepOutcome::Restarted {
                    reason,
                    new_population_size,
                    evaluations,
                })
            }
            None => {
                self.state.iterations_at_last_check = self.state.iteration;
                self.state.improvements_at_last_check = improvements;
                self.phase = ControllerPhase::Running;
                Ok(StepOutcome::Checked)
            }
        }
    }

    fn check(
        &self,
        population: &Population,
        archive: &EpsilonBoxArchive,
        improvements: u64,
    ) -> Option<RestartReason> {
        if self.state.iteration - self.state.iterations_at_last_restart
            >= self.options.max_window_size()
        {
            return Some(RestartReason::MaxWindow);
        }

        if self.options.mode() == RestartMode::EpsilonProgress
            && improvements <= self.state.improvements_at_last_check
        {
            return Some(RestartReason::NoProgress);
        }

        let target = self.options.target_population_size(archive.len()) as f64;
        if (population.len() as f64) < (1.0 - self.options.slack()) * target {
            return Some(RestartReason::PopulationRatio);
        }

        None
    }

    /// Empties the population and refills it from the archive. Returns the new
    /// population size and the number of evaluations spent.
    ///
    /// # Errors
    ///
    /// Returns [`EpsBoxError::EmptyArchive`] if there is nothing to inject.
    /// Any error leaves `population` and the restart state as they were;
    /// offspring already accepted by the archive stay there.
    pub fn restart(
        &mut self,
        reason: RestartReason,
        population: &mut Population,
        archive: &mut EpsilonBoxArchive,
        problem: &dyn Problem,
        rng: &mut RandomNumberGenerator,
    ) -> Result<(usize, u64)> {
        if archive.is_empty() {
            return Err(EpsBoxError::EmptyArchive);
        }

        let new_size = self.options.target_population_size(archive.len());
        let mut next = Population::with_capacity(new_size);

        if archive.len() <= new_size {
            next.add_all(archive.iter().cloned());
        } else {
            let mut picked = index::sample(rng, archive.len(), new_size).into_vec();
            picked.sort_unstable();
            next.add_all(picked.into_iter().map(|i| archive.as_slice()[i].clone()));
        }

        let arity = self.variation.arity();
        let mut evaluations = 0;

        while next.len() < new_size {
            let parents = self.selection.select(arity, archive.as_slice(), rng)?;
            let offspring = self.variation.evolve(&parents, rng)?;
            if offspring.is_empty() {
                return Err(EpsBoxError::Operator(
                    "Variation produced no offspring during injection".to_string(),
                ));
            }

            for mut child in offspring {
                problem.evaluate(&mut child)?;
                evaluations += 1;
                archive.epsilons().solution_key(&child)?;
                if next.len() < new_size {
                    next.add(child.clone());
                }
                archive.add(child)?;
            }
        }

        *population = next;

        self.selection.adapt_to_population_size(new_size);

        let iteration = self.state.iteration;
        self.state.iterations_at_last_check = iteration;
        self.state.iterations_at_last_restart = iteration;
        self.state.improvements_at_last_check = self.options.metric().count(archive);
        self.state.number_of_restarts += 1;
        self.state.population_size_at_last_restart = new_size;

        info!(
            restart = self.state.number_of_restarts,
            new_population_size = new_size,
            archive = archive.len(),
            evaluations,
            ?reason,
            "Restarted population"
        );

        let event = RestartEvent {
            restart_count: self.state.number_of_restarts,
            new_population_size: new_size,
            iteration,
            reason,
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }

        Ok((new_size, evaluations))
    }
}

impl fmt::Debug for RestartController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestartController")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("selection", &self.selection)
            .field("variation", &self.variation)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::restart::ImprovementMetric;
    use crate::solution::Solution;

    /// Every solution evaluates to the same point.
    struct Flat;

    impl Problem for Flat {
        fn num_variables(&self) -> usize {
            1
        }

        fn num_objectives(&self) -> usize {
            2
        }

        fn bounds(&self) -> Vec<(f64, f64)> {
            vec![(0.0, 1.0)]
        }

        fn evaluate(&self, solution: &mut Solution) -> Result<()> {
            solution.set_objectives(&[1.0, 1.0])
        }
    }

    /// Objectives trade off along the single variable.
    struct Line;

    impl Problem for Line {
        fn num_variables(&self) -> usize {
            1
        }

        fn num_objectives(&self) -> usize {
            2
        }

        fn bounds(&self) -> Vec<(f64, f64)> {
            vec![(0.0, 1.0)]
        }

        fn evaluate(&self, solution: &mut Solution) -> Result<()> {
            let x = solution.variable(0);
            solution.set_objectives(&[x, 1.0 - x])
        }
    }

    fn options(mode: RestartMode) -> RestartOptions {
        RestartOptions::builder()
            .window_size(10)
            .max_window_size(100)
            .population_size_bounds(4, 50)
            .mode(mode)
            .build()
            .unwrap()
    }

    fn seeded(problem: &dyn Problem) -> (Population, EpsilonBoxArchive) {
        let mut archive = EpsilonBoxArchive::with_epsilons(vec![0.01, 0.01]).unwrap();
        let mut solution = problem.new_solution();
        problem.evaluate(&mut solution).unwrap();
        archive.add(solution.clone()).unwrap();
        (vec![solution; 4].into(), archive)
    }

    fn run(controller: &mut RestartController, problem: &dyn Problem, steps: usize) -> (Population, EpsilonBoxArchive) {
        let (mut population, mut archive) = seeded(problem);
        let mut rng = RandomNumberGenerator::from_seed(42);
        for _ in 0..steps {
            controller
                .on_step(&mut population, &mut archive, problem, &mut rng)
                .unwrap();
        }
        (population, archive)
    }

    #[test]
    fn test_adaptive_time_restarts_at_max_window() {
        let mut controller = RestartController::for_problem(options(RestartMode::AdaptiveTime), &Flat).unwrap();
        run(&mut controller, &Flat, 1000);
        assert_eq!(controller.number_of_restarts(), 10);
    }

    #[test]
    fn test_epsilon_progress_restarts_every_stagnant_check() {
        let mut controller = RestartController::for_problem(options(RestartMode::EpsilonProgress), &Flat).unwrap();
        run(&mut controller, &Flat, 1000);
        // The check at step 10 still sees the seeding insertion as progress.
        assert_eq!(controller.number_of_restarts(), 99);
    }

    #[test]
    fn test_outcomes_and_state() {
        let mut controller = RestartController::for_problem(options(RestartMode::EpsilonProgress), &Flat).unwrap();
        let (mut population, mut archive) = seeded(&Flat);
        let mut rng = RandomNumberGenerator::from_seed(1);

        for _ in 0..9 {
            let outcome = controller
                .on_step(&mut population, &mut archive, &Flat, &mut rng)
                .unwrap();
            assert_eq!(outcome, StepOutcome::Continued);
        }

        let outcome = controller
            .on_step(&mut population, &mut archive, &Flat, &mut rng)
            .unwrap();
        assert_eq!(outcome, StepOutcome::Checked);
        assert_eq!(controller.state().iterations_at_last_check, 10);
        assert_eq!(controller.state().improvements_at_last_check, 1);
        assert_eq!(controller.state().iterations_at_last_restart, 0);

        for _ in 0..10 {
            controller
                .on_step(&mut population, &mut archive, &Flat, &mut rng)
                .unwrap();
        }
        assert_eq!(controller.phase(), ControllerPhase::Running);
        assert_eq!(controller.state().iterations_at_last_restart, 20);
        assert_eq!(controller.number_of_restarts(), 1);
    }

    #[test]
    fn test_restart_with_empty_archive_fails() {
        let mut controller = RestartController::for_problem(options(RestartMode::EpsilonProgress), &Flat).unwrap();
        let mut population = Population::new();
        let mut archive = EpsilonBoxArchive::with_epsilons(vec![0.1, 0.1]).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(1);

        let mut result = Ok(StepOutcome::Continued);
        for _ in 0..10 {
            result = controller.on_step(&mut population, &mut archive, &Flat, &mut rng);
        }
        assert!(matches!(result, Err(EpsBoxError::EmptyArchive)));
        assert_eq!(controller.phase(), ControllerPhase::Restarting);
    }

    #[test]
    fn test_population_ratio_triggers_restart() {
        let mut controller = RestartController::for_problem(options(RestartMode::AdaptiveTime), &Line).unwrap();
        let (mut population, mut archive) = seeded(&Line);
        for x in [0.2, 0.4, 0.6, 0.8] {
            let mut solution = Line.new_solution();
            solution.set_variables(&[x]).unwrap();
            Line.evaluate(&mut solution).unwrap();
            archive.add(solution).unwrap();
        }
        let mut rng = RandomNumberGenerator::from_seed(5);

        let mut outcome = StepOutcome::Continued;
        for _ in 0..10 {
            outcome = controller
                .on_step(&mut population, &mut archive, &Line, &mut rng)
                .unwrap();
        }

        match outcome {
            StepOutcome::Restarted {
                reason,
                new_population_size,
                evaluations,
            } => {
                assert_eq!(reason, RestartReason::PopulationRatio);
                assert_eq!(new_population_size, 20);
                assert_eq!(evaluations, 15);
                assert_eq!(population.len(), 20);
            }
            other => panic!("expected a restart, got {:?}", other),
        }
    }

    #[test]
    fn test_large_archive_is_subsampled() {
        let options = RestartOptions::builder()
            .window_size(1)
            .max_window_size(1)
            .population_size_bounds(2, 3)
            .build()
            .unwrap();
        let mut controller = RestartController::for_problem(options, &Line).unwrap();
        let mut archive = EpsilonBoxArchive::with_epsilons(vec![0.01, 0.01]).unwrap();
        for i in 0..10 {
            let mut solution = Line.new_solution();
            solution.set_variables(&[i as f64 / 10.0]).unwrap();
            Line.evaluate(&mut solution).unwrap();
            archive.add(solution).unwrap();
        }
        let mut population = Population::new();
        let mut rng = RandomNumberGenerator::from_seed(5);

        controller
            .on_step(&mut population, &mut archive, &Line, &mut rng)
            .unwrap();

        assert_eq!(population.len(), 3);
        let xs: Vec<f64> = population.iter().map(|s| s.variable(0)).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert!(population.iter().all(|s| archive.contains(s)));
    }

    #[test]
    fn test_listeners() {
        let mut controller = RestartController::for_problem(options(RestartMode::AdaptiveTime), &Flat).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let id = controller.add_listener(move |event| sink.lock().unwrap().push(*event));

        let (mut population, mut archive) = seeded(&Flat);
        let mut rng = RandomNumberGenerator::from_seed(3);
        for _ in 0..200 {
            controller
                .on_step(&mut population, &mut archive, &Flat, &mut rng)
                .unwrap();
        }

        assert!(controller.remove_listener(id));
        assert!(!controller.remove_listener(id));
        for _ in 0..100 {
            controller
                .on_step(&mut population, &mut archive, &Flat, &mut rng)
                .unwrap();
        }

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].restart_count, 2);
        assert_eq!(events[1].iteration, 200);
        assert_eq!(events[1].new_population_size, 4);
        assert_eq!(events[1].reason, RestartReason::MaxWindow);
    }

    #[test]
    fn test_dominating_metric() {
        let options = RestartOptions::builder()
            .window_size(1)
            .max_window_size(1000)
            .population_size_bounds(1, 10)
            .metric(ImprovementMetric::DominatingImprovements)
            .build()
            .unwrap();
        let mut controller = RestartController::for_problem(options, &Line).unwrap();
        let mut archive = EpsilonBoxArchive::with_epsilons(vec![0.01, 0.01]).unwrap();
        // A non-dominated insertion improves the archive without dominating.
        archive.add(Solution::with_objectives(&[0.0, 1.0])).unwrap();
        let mut population: Population = archive.iter().cloned().collect();
        let mut rng = RandomNumberGenerator::from_seed(5);

        let outcome = controller
            .on_step(&mut population, &mut archive, &Line, &mut rng)
            .unwrap();
        assert!(outcome.is_restart());
    }

    #[test]
    fn test_failed_restart_keeps_population() {
        /// Any evaluation after seeding reports a NaN objective.
        struct Diverged;

        impl Problem for Diverged {
            fn num_variables(&self) -> usize {
                1
            }

            fn num_objectives(&self) -> usize {
                2
            }

            fn bounds(&self) -> Vec<(f64, f64)> {
                vec![(0.0, 1.0)]
            }

            fn evaluate(&self, solution: &mut Solution) -> Result<()> {
                solution.set_objectives(&[f64::NAN, -1.0])
            }
        }

        let mut controller = RestartController::for_problem(options(RestartMode::AdaptiveTime), &Line).unwrap();
        let (mut population, mut archive) = seeded(&Line);
        let before = population.clone();
        let state = *controller.state();
        let mut rng = RandomNumberGenerator::from_seed(3);

        let result = controller.restart(
            RestartReason::NoProgress,
            &mut population,
            &mut archive,
            &Diverged,
            &mut rng,
        );

        assert!(matches!(result, Err(EpsBoxError::InvalidNumericValue(_))));
        assert_eq!(population, before);
        assert_eq!(*controller.state(), state);
        assert_eq!(archive.len(), 1);
    }
}
