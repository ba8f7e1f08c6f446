//! Frequency accounting and state-vector re-initialization.
//!
//! Ported from `original_source/trunk/include/cabac/counting.h`'s `counting`
//! mixin and `counting_encoder`/`counting_decoder`. The original uses public
//! inheritance (`counting_encoder<I> : encoder<I>, counting`); this crate
//! folds that into composition, per spec.md's "no inheritance" design note:
//! `CountingEncoder`/`CountingDecoder` each own an inner coder and delegate
//! to it, tallying frequencies alongside.
use std::io::{Read, Result, Write};
use std::ops::AddAssign;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::state::StateVector;
use crate::tables::EXPECT_TAB;
use crate::traits::{Decode, Encode};

/// The number of zero and one bins observed so far for one context.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    pub zeros: u32,
    pub ones: u32,
}

/// One [`Frequency`] counter per context, in context-index order.
pub type FrequencyVector = Vec<Frequency>;

impl AddAssign<&FrequencyVector> for FrequencyVector {
    /// Accumulates `rhs` into `self`, context by context.
    ///
    /// # Panics
    /// Panics if the two vectors don't have the same length.
    fn add_assign(&mut self, rhs: &FrequencyVector) {
        assert_eq!(self.len(), rhs.len());
        for (lhs, rhs) in self.iter_mut().zip(rhs.iter()) {
            lhs.zeros += rhs.zeros;
            lhs.ones += rhs.ones;
        }
    }
}

fn count(frequencies: &mut FrequencyVector, idx: usize, bin_val: bool) {
    if bin_val {
        frequencies[idx].ones += 1;
    } else {
        frequencies[idx].zeros += 1;
    }
}

/// Wraps an [`Encoder`], tallying a [`FrequencyVector`] alongside every
/// context-coded decision (bypass decisions are not counted, matching
/// `original_source`: bypass contexts don't exist to re-initialize).
pub struct CountingEncoder<W> {
    inner: Encoder<W>,
    frequencies: FrequencyVector,
}

impl<W: Write> CountingEncoder<W> {
    pub fn new(writer: W, states: StateVector) -> Self {
        let frequencies = vec![Frequency::default(); states.len()];
        CountingEncoder {
            inner: Encoder::new(writer, states),
            frequencies,
        }
    }

    pub fn frequencies(&self) -> &FrequencyVector {
        &self.frequencies
    }

    pub fn finish(&mut self) -> Result<()> {
        self.inner.finish()
    }

    pub fn inner(&self) -> &Encoder<W> {
        &self.inner
    }
}

impl<W: Write> Encode for CountingEncoder<W> {
    fn encode(&mut self, idx: usize, bin_val: bool) -> Result<()> {
        self.inner.encode(idx, bin_val)?;
        count(&mut self.frequencies, idx, bin_val);
        Ok(())
    }

    fn encode_bypass(&mut self, bin_val: bool) -> Result<()> {
        self.inner.encode_bypass(bin_val)
    }
}

/// Wraps a [`Decoder`], tallying a [`FrequencyVector`] alongside every
/// context-coded decision, mirroring [`CountingEncoder`].
pub struct CountingDecoder<R> {
    inner: Decoder<R>,
    frequencies: FrequencyVector,
}

impl<R: Read> CountingDecoder<R> {
    pub fn new(reader: R, states: StateVector) -> Result<Self> {
        let frequencies = vec![Frequency::default(); states.len()];
        Ok(CountingDecoder {
            inner: Decoder::new(reader, states)?,
            frequencies,
        })
    }

    pub fn frequencies(&self) -> &FrequencyVector {
        &self.frequencies
    }

    pub fn inner(&self) -> &Decoder<R> {
        &self.inner
    }
}

impl<R: Read> Decode for CountingDecoder<R> {
    fn decode(&mut self, idx: usize) -> Result<bool> {
        let bin_val = self.inner.decode(idx)?;
        count(&mut self.frequencies, idx, bin_val);
        Ok(bin_val)
    }

    fn decode_bypass(&mut self) -> Result<bool> {
        self.inner.decode_bypass()
    }
}

/// Computes a state vector approximating the measured frequencies in `f`:
/// for each context, the packed state byte whose `EXPECT_TAB` entry is
/// closest to the observed fraction of one-bins. A context with no
/// observations at all gets the equiprobable state (0).
///
/// Searches packed states `0..126`, excluding the two most extreme states
/// (127 and 126, corresponding to `pStateIdx = 63` with each `valMPS`): the
/// measured fraction from a finite sample is never reliable evidence for the
/// most skewed model the table can express.
pub fn initialization_vector(f: &FrequencyVector) -> StateVector {
    f.iter()
        .map(|freq| {
            let sum = freq.zeros + freq.ones;
            if sum == 0 {
                return 0;
            }
            let expect = freq.ones as f32 / sum as f32;
            let mut best_idx = 0u8;
            let mut best = f32::MAX;
            for idx in 0..126u8 {
                let diff = (expect - EXPECT_TAB[idx as usize]).abs();
                if diff < best {
                    best = diff;
                    best_idx = idx;
                }
            }
            best_idx
        })
        .collect()
}

/// The model's expected fraction of one-bins at packed state `packed`,
/// i.e. the same `EXPECT_TAB` lookup [`initialization_vector`] searches
/// over. Useful for inspecting how well a re-initialized state vector fits
/// the frequencies it was built from.
pub fn expect_for_state(packed: u8) -> f32 {
    EXPECT_TAB[packed as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::new_state_vector;

    #[test]
    fn initialization_vector_is_equiprobable_for_untouched_contexts() {
        let f = vec![Frequency::default(); 3];
        assert_eq!(initialization_vector(&f), new_state_vector(3));
    }

    #[test]
    fn initialization_vector_leans_toward_observed_skew() {
        // p = ones/(ones+zeros) = 0.01, far below every MPS-side entry in
        // EXPECT_TAB, so the closest match is a low, odd (valMPS = 1) entry
        // near the skewed end of the table.
        let f = vec![Frequency { zeros: 99, ones: 1 }];
        let states = initialization_vector(&f);
        assert_eq!(states[0] & 1, 1);
        assert!(states[0] >> 1 > 40);
    }

    #[test]
    fn add_assign_accumulates_context_wise() {
        let mut lhs = vec![Frequency { zeros: 1, ones: 2 }, Frequency { zeros: 3, ones: 4 }];
        let rhs = vec![Frequency { zeros: 10, ones: 20 }, Frequency { zeros: 30, ones: 40 }];
        lhs += &rhs;
        assert_eq!(lhs[0], Frequency { zeros: 11, ones: 22 });
        assert_eq!(lhs[1], Frequency { zeros: 33, ones: 44 });
    }

    #[test]
    fn counting_encoder_decoder_roundtrip_and_count() {
        let mut buf = Vec::new();
        {
            let mut enc = CountingEncoder::new(&mut buf, new_state_vector(2));
            enc.encode(0, true).unwrap();
            enc.encode(0, false).unwrap();
            enc.encode(1, true).unwrap();
            enc.finish().unwrap();
            assert_eq!(enc.frequencies()[0], Frequency { zeros: 1, ones: 1 });
            assert_eq!(enc.frequencies()[1], Frequency { zeros: 0, ones: 1 });
        }

        let mut dec = CountingDecoder::new(&buf[..], new_state_vector(2)).unwrap();
        assert_eq!(dec.decode(0).unwrap(), true);
        assert_eq!(dec.decode(0).unwrap(), false);
        assert_eq!(dec.decode(1).unwrap(), true);
        assert_eq!(dec.frequencies()[0], Frequency { zeros: 1, ones: 1 });
    }
}
