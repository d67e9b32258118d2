//! Spin (Ising) form of a QUBO.
//!
//! Substituting `x = (1 − z) / 2` maps bit 1 to spin −1 and bit 0 to spin +1:
//!
//! ```text
//! l·x        = l/2 − (l/2)·z
//! q·x_a·x_b  = q/4 − (q/4)·z_a − (q/4)·z_b + (q/4)·z_a·z_b
//! ```

use crate::builder::QuboModel;
use crate::coeff::PairMap;
use crate::error::{QuboError, QuboResult};
use crate::hamiltonian::CostHamiltonian;

/// Fields `h`, couplings `J` and a constant over `±1` spins.
#[derive(Debug, Clone, PartialEq)]
pub struct IsingModel {
    h: Vec<f64>,
    j: PairMap,
    constant: f64,
}

impl IsingModel {
    /// Transform a QUBO.
    pub fn from_qubo(qubo: &QuboModel) -> Self {
        let mut h = vec![0.0; qubo.num_variables()];
        let mut j = PairMap::new();
        let mut constant = qubo.offset();

        for (v, &l) in qubo.linear().iter().enumerate() {
            constant += l / 2.0;
            h[v] -= l / 2.0;
        }
        for (key, q) in qubo.quadratic().iter() {
            constant += q / 4.0;
            h[key.low()] -= q / 4.0;
            h[key.high()] -= q / 4.0;
            j.add(key.low(), key.high(), q / 4.0);
        }

        Self { h, j, constant }
    }

    /// Number of spins.
    pub fn num_spins(&self) -> usize {
        self.h.len()
    }

    /// Local fields.
    pub fn h(&self) -> &[f64] {
        &self.h
    }

    /// Couplings.
    pub fn couplings(&self) -> &PairMap {
        &self.j
    }

    /// Constant term.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Energy of a spin configuration (`+1` / `-1` entries).
    pub fn energy(&self, spins: &[i8]) -> QuboResult<f64> {
        if spins.len() != self.num_spins() {
            return Err(QuboError::BitstringLength {
                expected: self.num_spins(),
                got: spins.len(),
            });
        }
        let mut energy = self.constant;
        for (h, &z) in self.h.iter().zip(spins) {
            energy += h * f64::from(z);
        }
        for (key, j) in self.j.iter() {
            energy += j * f64::from(spins[key.low()]) * f64::from(spins[key.high()]);
        }
        Ok(energy)
    }

    /// Emit the cost Hamiltonian, dropping near-zero terms.
    pub fn to_hamiltonian(&self) -> CostHamiltonian {
        CostHamiltonian::from_ising(self)
    }
}

/// Spin encoding of a bit assignment: `1 -> -1`, `0 -> +1`.
pub fn spins_from_bits(bits: &[bool]) -> Vec<i8> {
    bits.iter().map(|&b| if b { -1 } else { 1 }).collect()
}

/// Bit decoding of a spin configuration.
pub fn bits_from_spins(spins: &[i8]) -> Vec<bool> {
    spins.iter().map(|&z| z < 0).collect()
}
