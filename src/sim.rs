//! The bit-count-only simulation encoder.
//!
//! A direct port of `original_source/trunk/include/cabac/encoder.h`'s
//! `encoder<void>` specialization: it updates context state exactly like
//! [`crate::encoder::Encoder`] but writes no bitstream, instead accumulating
//! the self-information cost of every decision. Used for rate-distortion
//! search, where many candidate encodings are tried and only their bit cost
//! (not their bytes) matters.
use std::io::{Result, Write};

use crate::state::{pack, state_idx, val_mps, StateVector};
use crate::tables::{bits_for, TRANS_IDX_LPS, TRANS_IDX_MPS};
use crate::traits::Encode;

/// Simulates CABAC encoding, tracking only the accumulated bit cost and the
/// context state vector. Cheap to clone, so branching a simulation to
/// explore two continuations is just a `.clone()`.
#[derive(Clone)]
pub struct SimulationEncoder {
    states: StateVector,
    bits: u32,
}

impl SimulationEncoder {
    /// Creates a simulation encoder seeded with `states`.
    pub fn new(states: StateVector) -> Self {
        SimulationEncoder { states, bits: 0 }
    }

    pub fn states(&self) -> &StateVector {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut StateVector {
        &mut self.states
    }

    /// Self-information accumulated since creation, or since the last
    /// [`SimulationEncoder::reset`], in 8.8 fixed-point bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Resets the accumulated bit count to zero without touching the state vector.
    pub fn reset(&mut self) {
        self.bits = 0;
    }
}

impl<W: Write> From<&crate::encoder::Encoder<W>> for SimulationEncoder {
    /// Branches a simulation from a live encoder: the state vector is
    /// copied, the bit count starts at zero.
    fn from(enc: &crate::encoder::Encoder<W>) -> Self {
        SimulationEncoder::new(enc.states().clone())
    }
}

impl Encode for SimulationEncoder {
    fn encode(&mut self, idx: usize, bin_val: bool) -> Result<()> {
        let packed = self.states[idx];
        let idx_s = state_idx(packed);
        let mut mps = val_mps(packed);

        self.bits += bits_for(packed, bin_val) as u32;

        if bin_val != mps {
            if idx_s == 0 {
                mps = !mps;
            }
            self.states[idx] = pack(TRANS_IDX_LPS[idx_s as usize], mps);
        } else {
            self.states[idx] = pack(TRANS_IDX_MPS[idx_s as usize], mps);
        }
        Ok(())
    }

    fn encode_bypass(&mut self, _bin_val: bool) -> Result<()> {
        self.bits += 1 << 8;
        Ok(())
    }
}
