use crate::error::{ensure_len, EpsBoxError, Result};
use crate::rng::RandomNumberGenerator;
use crate::solution::Solution;

use super::Variation;

/// Replaces each decision variable, with the given probability, by a value
/// drawn uniformly from its bounds.
///
/// Arity 1: one parent in, one child out. The child keeps the parent's
/// objectives and constraints until it is evaluated; attributes are cleared.
#[derive(Debug, Clone)]
pub struct UniformMutation {
    probability: f64,
    bounds: Vec<(f64, f64)>,
}

impl UniformMutation {
    /// # Errors
    ///
    /// Returns [`EpsBoxError::InvalidConfiguration`] if `probability` is
    /// outside `[0, 1]` or a bound pair is not finite with `lower <= upper`.
    pub fn new(probability: f64, bounds: Vec<(f64, f64)>) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(EpsBoxError::InvalidConfiguration(format!(
                "Mutation probability must be in [0, 1], got {}",
                probability
            )));
        }

        for (index, &(lower, upper)) in bounds.iter().enumerate() {
            if !lower.is_finite() || !upper.is_finite() || lower > upper {
                return Err(EpsBoxError::InvalidConfiguration(format!(
                    "Invalid bounds [{}, {}] for variable {}",
                    lower, upper, index
                )));
            }
        }

        Ok(Self { probability, bounds })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }
}

impl Variation for UniformMutation {
    fn arity(&self) -> usize {
        1
    }

    fn evolve(&self, parents: &[Solution], rng: &mut RandomNumberGenerator) -> Result<Vec<Solution>> {
        ensure_len("parents", 1, parents.len())?;
        let parent = &parents[0];
        ensure_len("variables", self.bounds.len(), parent.num_variables())?;

        let mut child = parent.clone();
        child.clear_attributes();

        for (value, &(lower, upper)) in child.variables_mut().iter_mut().zip(&self.bounds) {
            if rng.next_f64() < self.probability {
                *value = if lower == upper {
                    lower
                } else {
                    rng.gen_range(lower..upper)
                };
            }
        }

        Ok(vec![child])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::{AttributeValue, FITNESS};

    #[test]
    fn test_invalid_configuration() {
        assert!(UniformMutation::new(1.5, vec![]).is_err());
        assert!(UniformMutation::new(-0.1, vec![]).is_err());
        assert!(UniformMutation::new(0.5, vec![(1.0, 0.0)]).is_err());
        assert!(UniformMutation::new(0.5, vec![(0.0, f64::INFINITY)]).is_err());
    }

    #[test]
    fn test_full_mutation_stays_in_bounds() {
        let mutation = UniformMutation::new(1.0, vec![(0.0, 1.0), (-5.0, -4.0)]).unwrap();
        let mut parent = Solution::new(2, 1, 0);
        parent.set_variables(&[0.5, -4.5]).unwrap();
        parent.set_attribute(FITNESS, AttributeValue::Real(1.0));

        let mut rng = RandomNumberGenerator::from_seed(3);
        for _ in 0..100 {
            let children = mutation.evolve(&[parent.clone()], &mut rng).unwrap();
            assert_eq!(children.len(), 1);
            let child = &children[0];
            assert!((0.0..1.0).contains(&child.variable(0)));
            assert!((-5.0..-4.0).contains(&child.variable(1)));
            assert!(child.attributes().is_empty());
        }
    }

    #[test]
    fn test_zero_probability_copies_parent() {
        let mutation = UniformMutation::new(0.0, vec![(0.0, 1.0)]).unwrap();
        let mut parent = Solution::new(1, 1, 0);
        parent.set_variables(&[0.25]).unwrap();

        let mut rng = RandomNumberGenerator::from_seed(3);
        let children = mutation.evolve(&[parent.clone()], &mut rng).unwrap();
        assert_eq!(children[0].variables(), parent.variables());
    }

    #[test]
    fn test_shape_mismatch() {
        let mutation = UniformMutation::new(1.0, vec![(0.0, 1.0)]).unwrap();
        let parent = Solution::new(2, 1, 0);
        let mut rng = RandomNumberGenerator::from_seed(3);

        assert!(matches!(
            mutation.evolve(&[parent], &mut rng),
            Err(EpsBoxError::DimensionMismatch { .. })
        ));
        assert!(mutation.evolve(&[], &mut rng).is_err());
    }
}
