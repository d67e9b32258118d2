//! Diagonal cost Hamiltonian handed to quantum backends.
//!
//! The cost operator is a sum of identity, single-`Z` and `ZZ` terms:
//! H = c·I + Σᵢ hᵢ Zᵢ + Σᵢ<ⱼ Jᵢⱼ Zᵢ Zⱼ
//! Terms with |coefficient| ≤ 1e-9 are not emitted.

use serde::{Deserialize, Serialize};

use crate::EPSILON;
use crate::error::{QuboError, QuboResult};
use crate::ising::{IsingModel, spins_from_bits};

/// A single term: `coefficient · Π Z[q]` over `qubits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTerm {
    /// The coefficient of this term.
    pub coefficient: f64,
    /// Qubits carrying a `Z`; empty means identity.
    pub qubits: Vec<usize>,
}

impl CostTerm {
    /// Create an identity term (scalar).
    pub fn identity(coefficient: f64) -> Self {
        Self {
            coefficient,
            qubits: vec![],
        }
    }

    /// Create a single-qubit Z term.
    pub fn z(coefficient: f64, qubit: usize) -> Self {
        Self {
            coefficient,
            qubits: vec![qubit],
        }
    }

    /// Create a ZZ term.
    pub fn zz(coefficient: f64, qubit1: usize, qubit2: usize) -> Self {
        Self {
            coefficient,
            qubits: vec![qubit1, qubit2],
        }
    }

    /// Check if this is an identity term.
    pub fn is_identity(&self) -> bool {
        self.qubits.is_empty()
    }

    /// Get the maximum qubit index.
    pub fn max_qubit(&self) -> Option<usize> {
        self.qubits.iter().copied().max()
    }

    /// Value of the term on a spin configuration.
    fn eval(&self, spins: &[i8]) -> f64 {
        self.qubits
            .iter()
            .fold(self.coefficient, |acc, &q| acc * f64::from(spins[q]))
    }
}

impl std::fmt::Display for CostTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.coefficient >= 0.0 {
            write!(f, "+{:.4} ", self.coefficient)?;
        } else {
            write!(f, "{:.4} ", self.coefficient)?;
        }

        if self.qubits.is_empty() {
            write!(f, "I")?;
        } else {
            for (i, qubit) in self.qubits.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "Z[{qubit}]")?;
            }
        }
        Ok(())
    }
}

/// A cost Hamiltonian over a fixed number of qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostHamiltonian {
    /// The terms in the Hamiltonian.
    pub terms: Vec<CostTerm>,
    num_qubits: usize,
}

impl CostHamiltonian {
    /// Create a Hamiltonian from terms on `num_qubits` qubits.
    pub fn new(terms: Vec<CostTerm>, num_qubits: usize) -> QuboResult<Self> {
        if let Some(q) = terms.iter().filter_map(CostTerm::max_qubit).find(|&q| q >= num_qubits) {
            return Err(QuboError::MalformedInput(format!(
                "term acts on qubit {q} but the register has {num_qubits} qubits"
            )));
        }
        Ok(Self { terms, num_qubits })
    }

    /// Emit `h` as Z terms, `J` as ZZ terms and the constant as identity.
    pub fn from_ising(ising: &IsingModel) -> Self {
        let mut terms = Vec::new();
        for (q, &h) in ising.h().iter().enumerate() {
            if h.abs() > EPSILON {
                terms.push(CostTerm::z(h, q));
            }
        }
        for (key, j) in ising.couplings().iter() {
            if j.abs() > EPSILON {
                terms.push(CostTerm::zz(j, key.low(), key.high()));
            }
        }
        if ising.constant().abs() > EPSILON {
            terms.push(CostTerm::identity(ising.constant()));
        }
        Self {
            terms,
            num_qubits: ising.num_spins(),
        }
    }

    /// Get the number of terms.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Register size. Includes qubits whose terms were all pruned.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the identity coefficient (if any).
    pub fn identity_coefficient(&self) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.is_identity())
            .map(|t| t.coefficient)
            .sum()
    }

    /// Iterate over non-identity terms.
    pub fn non_identity_terms(&self) -> impl Iterator<Item = &CostTerm> {
        self.terms.iter().filter(|t| !t.is_identity())
    }

    /// Eigenvalue for a computational basis state given as bits.
    pub fn energy_of_bits(&self, bits: &[bool]) -> QuboResult<f64> {
        if bits.len() != self.num_qubits {
            return Err(QuboError::BitstringLength {
                expected: self.num_qubits,
                got: bits.len(),
            });
        }
        let spins = spins_from_bits(bits);
        Ok(self.terms.iter().map(|t| t.eval(&spins)).sum())
    }
}

impl std::fmt::Display for CostHamiltonian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Hamiltonian ({} terms, {} qubits):",
            self.num_terms(),
            self.num_qubits()
        )?;
        for term in &self.terms {
            writeln!(f, "  {term}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_term_creation() {
        let term = CostTerm::zz(-0.5, 0, 1);
        assert_eq!(term.coefficient, -0.5);
        assert_eq!(term.qubits.len(), 2);
        assert!(!term.is_identity());
        assert_eq!(term.to_string(), "-0.5000 Z[0] Z[1]");
    }

    #[test]
    fn test_identity_term() {
        let term = CostTerm::identity(1.0);
        assert!(term.is_identity());
        assert_eq!(term.max_qubit(), None);
        assert_eq!(term.to_string(), "+1.0000 I");
    }

    #[test]
    fn test_hamiltonian() {
        let h = CostHamiltonian::new(
            vec![
                CostTerm::identity(-1.0),
                CostTerm::z(0.5, 0),
                CostTerm::z(-0.5, 1),
                CostTerm::zz(-0.25, 0, 1),
            ],
            2,
        )
        .unwrap();

        assert_eq!(h.num_terms(), 4);
        assert_eq!(h.num_qubits(), 2);
        assert_eq!(h.identity_coefficient(), -1.0);
        assert_eq!(h.non_identity_terms().count(), 3);
        // bits [1, 0] -> spins [-1, +1]: -1 - 0.5 - 0.5 + 0.25
        assert_eq!(h.energy_of_bits(&[true, false]).unwrap(), -1.75);
    }

    #[test]
    fn test_out_of_range_term_rejected() {
        assert!(CostHamiltonian::new(vec![CostTerm::z(1.0, 3)], 2).is_err());
    }
}
