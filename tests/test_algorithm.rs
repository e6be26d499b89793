use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use epsbox::{
    algorithm::{AdaptiveRestart, EpsilonBoxAlgorithm, EpsilonMoea},
    archive::{ArchiveOptions, Epsilons, NondominatedArchive},
    error::{EpsBoxError, Result},
    operator::{Problem, UniformMutation},
    population::{NondominatedSorting, RankAndCrowding},
    restart::{RestartController, RestartOptions},
    rng::RandomNumberGenerator,
    solution::{Solution, RANK},
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Minimize x^2 and (x - 2)^2; the Pareto set is [0, 2].
struct Schaffer;

impl Problem for Schaffer {
    fn num_variables(&self) -> usize {
        1
    }

    fn num_objectives(&self) -> usize {
        2
    }

    fn bounds(&self) -> Vec<(f64, f64)> {
        vec![(-10.0, 10.0)]
    }

    fn evaluate(&self, solution: &mut Solution) -> Result<()> {
        let x = solution.variable(0);
        solution.set_objectives(&[x * x, (x - 2.0) * (x - 2.0)])
    }
}

/// Schaffer with the constraint x >= 1, reported as violation 1 - x.
struct ConstrainedSchaffer;

impl Problem for ConstrainedSchaffer {
    fn num_variables(&self) -> usize {
        1
    }

    fn num_objectives(&self) -> usize {
        2
    }

    fn num_constraints(&self) -> usize {
        1
    }

    fn bounds(&self) -> Vec<(f64, f64)> {
        vec![(-10.0, 10.0)]
    }

    fn evaluate(&self, solution: &mut Solution) -> Result<()> {
        let x = solution.variable(0);
        solution.set_objectives(&[x * x, (x - 2.0) * (x - 2.0)])?;
        solution.set_constraints(&[(1.0 - x).max(0.0)])
    }
}

fn adaptive<P: Problem>(problem: P, seed: u64) -> AdaptiveRestart<EpsilonMoea<P>> {
    let bounds = problem.bounds();
    let options = ArchiveOptions::new(Epsilons::uniform(0.05, 2).unwrap());
    let mutation = UniformMutation::new(1.0, bounds.clone()).unwrap();
    let moea = EpsilonMoea::new(problem, options, 20, Box::new(mutation)).unwrap();

    let restarts = RestartOptions::builder()
        .window_size(20)
        .max_window_size(200)
        .population_size_bounds(10, 200)
        .build()
        .unwrap();
    let restart_mutation = UniformMutation::new(1.0, bounds).unwrap();
    let controller = RestartController::new(
        restarts,
        Box::new(epsbox::operator::UniformSelection),
        Box::new(restart_mutation),
    );

    AdaptiveRestart::new(moea, controller, RandomNumberGenerator::from_seed(seed))
}

#[test]
fn test_converges_to_front() {
    init_tracing();
    let mut run = adaptive(Schaffer, 42);
    let summary = run.run(3000, &AtomicBool::new(false)).unwrap();

    assert!(!summary.cancelled);
    assert!(summary.evaluations >= 3000);

    let result = run.algorithm().result();
    assert!(result.len() >= 5);
    let near_front = result
        .iter()
        .filter(|s| (-0.1..=2.1).contains(&s.variable(0)))
        .count();
    assert!(near_front * 10 >= result.len() * 9);
}

#[test]
fn test_constraints_are_respected() {
    init_tracing();
    let mut run = adaptive(ConstrainedSchaffer, 7);
    run.run(2000, &AtomicBool::new(false)).unwrap();

    let result = run.algorithm().result();
    assert!(!result.is_empty());
    assert!(result.iter().all(|s| s.is_feasible()));
}

#[test]
fn test_listener_can_cancel_run() {
    init_tracing();
    let mut run = adaptive(Schaffer, 3);
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    run.controller_mut()
        .add_listener(move |_| flag.store(true, Ordering::Relaxed));

    let summary = run.run(u64::MAX, &cancel).unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.restarts, 1);
    assert_eq!(run.controller().number_of_restarts(), 1);
}

#[test]
fn test_same_seed_same_result() {
    let mut a = adaptive(Schaffer, 11);
    let mut b = adaptive(Schaffer, 11);
    a.run(1000, &AtomicBool::new(false)).unwrap();
    b.run(1000, &AtomicBool::new(false)).unwrap();

    assert_eq!(a.algorithm().result(), b.algorithm().result());
    assert_eq!(
        a.controller().number_of_restarts(),
        b.controller().number_of_restarts()
    );
}

#[test]
fn test_final_front_sorting() {
    let mut run = adaptive(Schaffer, 5);
    run.run(1500, &AtomicBool::new(false)).unwrap();

    let mut front = NondominatedArchive::pareto();
    front
        .add_all(run.algorithm().population().iter().cloned())
        .unwrap();
    assert!(!front.is_empty());

    let mut population = run.algorithm().population().clone();
    NondominatedSorting::pareto().evaluate(&mut population).unwrap();
    population.truncate(&RankAndCrowding::default(), front.len());
    assert!(population
        .iter()
        .all(|s| s.attribute(RANK).and_then(|a| a.as_int()) == Some(0)));
}

#[test]
fn test_evaluation_failure_stops_run() {
    struct Failing;

    impl Problem for Failing {
        fn num_variables(&self) -> usize {
            1
        }

        fn num_objectives(&self) -> usize {
            2
        }

        fn bounds(&self) -> Vec<(f64, f64)> {
            vec![(0.0, 1.0)]
        }

        fn evaluate(&self, _solution: &mut Solution) -> Result<()> {
            Err(EpsBoxError::Evaluation("model diverged".to_string()))
        }
    }

    let mut run = adaptive(Failing, 1);
    assert!(matches!(
        run.run(100, &AtomicBool::new(false)),
        Err(EpsBoxError::Evaluation(_))
    ));
}
