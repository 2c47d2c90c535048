//! Dynamics terms as a tagged-variant list with capability lookup.
//!
//! Drivers never scan for terms by runtime type; they ask the [`Dynamics`]
//! collection for the parameters it knows about. At most one term of each
//! kind may be present, enforced at insertion.

use crate::error::{DriveError, Result};

/// A term of the dynamics equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DynamicsTerm {
    /// Precession with gyrotropic ratio `gamma` (m/As).
    Precession { gamma: f64 },

    /// Gilbert damping with dimensionless constant `alpha`.
    Damping { alpha: f64 },
}

impl DynamicsTerm {
    fn kind(&self) -> &'static str {
        match self {
            DynamicsTerm::Precession { .. } => "Precession",
            DynamicsTerm::Damping { .. } => "Damping",
        }
    }
}

/// Ordered collection of dynamics terms, at most one of each kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dynamics {
    terms: Vec<DynamicsTerm>,
}

impl Dynamics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term, rejecting a second term of the same kind.
    pub fn add(&mut self, term: DynamicsTerm) -> Result<()> {
        if self.terms.iter().any(|t| t.kind() == term.kind()) {
            return Err(DriveError::DuplicateDynamicsTerm(term.kind()));
        }
        self.terms.push(term);
        Ok(())
    }

    /// Gyrotropic ratio from the Precession term, if present.
    pub fn gamma(&self) -> Option<f64> {
        self.terms.iter().find_map(|t| match t {
            DynamicsTerm::Precession { gamma } => Some(*gamma),
            _ => None,
        })
    }

    /// Damping constant from the Damping term, if present.
    pub fn alpha(&self) -> Option<f64> {
        self.terms.iter().find_map(|t| match t {
            DynamicsTerm::Damping { alpha } => Some(*alpha),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[DynamicsTerm] {
        &self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_terms() {
        let mut dynamics = Dynamics::new();
        dynamics.add(DynamicsTerm::Precession { gamma: 2.211e5 }).unwrap();
        dynamics.add(DynamicsTerm::Damping { alpha: 0.02 }).unwrap();

        assert_eq!(dynamics.gamma(), Some(2.211e5));
        assert_eq!(dynamics.alpha(), Some(0.02));
    }

    #[test]
    fn test_empty_dynamics_has_no_parameters() {
        let dynamics = Dynamics::new();
        assert_eq!(dynamics.gamma(), None);
        assert_eq!(dynamics.alpha(), None);
        assert!(dynamics.is_empty());
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut dynamics = Dynamics::new();
        dynamics.add(DynamicsTerm::Damping { alpha: 0.1 }).unwrap();
        let err = dynamics.add(DynamicsTerm::Damping { alpha: 0.2 }).unwrap_err();
        assert!(matches!(err, DriveError::DuplicateDynamicsTerm("Damping")));
        // First term untouched.
        assert_eq!(dynamics.alpha(), Some(0.1));
    }
}
