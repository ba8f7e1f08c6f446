//! The regular/bypass/terminal CABAC encoder.
//!
//! Register discipline (`low`/`range`/`bits_outstanding`/`byte`/`shift`) and
//! the `write_bit`/`put_bit`/`renorm`/`flush` algorithms are a direct port of
//! `original_source/trunk/include/cabac/encoder.h`'s `encoder<I>`, generalized
//! from an arbitrary STL output iterator to `std::io::Write`, in the shape of
//! the teacher's `H265Writer<W: Write>`.
use std::io::{Result, Write};

use byteorder::WriteBytesExt;

use crate::state::{pack, state_idx, val_mps, StateVector};
use crate::tables::{bits_for, RANGE_TAB_LPS, TRANS_IDX_LPS, TRANS_IDX_MPS};
use crate::traits::Encode;

/// Writes a CABAC bitstream to any `std::io::Write` sink.
///
/// Dropping an `Encoder` flushes the bitstream the same way destroying the
/// C++ `encoder<I>` terminates it; call [`Encoder::finish`] explicitly if you
/// need to observe I/O errors from the final flush rather than have them
/// silently swallowed by `Drop`.
pub struct Encoder<W> {
    writer: W,
    states: StateVector,
    low: u32,
    range: u32,
    bits_outstanding: u32,
    byte: u32,
    shift: i32,
    finished: bool,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder writing to `writer`, with `states` as the initial
    /// (typically all-equiprobable, see [`new_state_vector`]) context vector.
    pub fn new(writer: W, states: StateVector) -> Self {
        Encoder {
            writer,
            states,
            low: 0,
            range: 0x1fe,
            bits_outstanding: 0,
            byte: 0,
            shift: 8,
            finished: false,
        }
    }

    /// The context state vector, for inspection or handing to another coder
    /// (e.g. seeding a [`crate::sim::SimulationEncoder`]).
    pub fn states(&self) -> &StateVector {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut StateVector {
        &mut self.states
    }

    /// The current `range` register. Exposed for the register invariant
    /// `range ∈ [0x100, 0x1FE]` that holds after every `encode`/`encode_bypass` call.
    pub fn range(&self) -> u32 {
        self.range
    }

    fn write_bit(&mut self, b: bool) -> Result<()> {
        #[cfg(feature = "trace")]
        log::trace!("write_bit {}", b as u8);

        self.byte |= (b as u32) << self.shift;
        self.shift -= 1;
        if self.shift < 0 {
            self.writer.write_u8(self.byte as u8)?;
            self.byte = 0;
            self.shift = 7;
        }
        Ok(())
    }

    fn put_bit(&mut self, b: bool) -> Result<()> {
        self.write_bit(b)?;
        while self.bits_outstanding > 0 {
            self.write_bit(!b)?;
            self.bits_outstanding -= 1;
        }
        Ok(())
    }

    fn renorm(&mut self) -> Result<()> {
        while self.range < 0x100 {
            if self.low < 0x100 {
                self.put_bit(false)?;
            } else if self.low >= 0x200 {
                self.low -= 0x200;
                self.put_bit(true)?;
            } else {
                self.low -= 0x100;
                self.bits_outstanding += 1;
            }
            self.range <<= 1;
            self.low <<= 1;
        }
        Ok(())
    }

    fn flush_bits(&mut self) -> Result<()> {
        self.range = 2;
        self.renorm()?;
        self.put_bit((self.low >> 9) & 1 != 0)?;
        self.write_bit((self.low >> 8) & 1 != 0)?;
        self.write_bit(true)
    }

    /// Terminates the bitstream, flushing all pending bits. Idempotent: a
    /// second call is a no-op. Called automatically by `Drop` if the caller
    /// never calls it, but `Drop` cannot propagate I/O errors, so callers
    /// that care about flush failures should call this explicitly.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.flush_bits()?;
        self.writer.write_u8(self.byte as u8)
    }

    /// Encodes a terminal bit. `true` signals the end of the bitstream; after
    /// encoding `true`, no further decisions should be encoded and the
    /// encoder should be finished. `false` continues the bitstream after
    /// renormalizing.
    pub fn encode_terminal(&mut self, bin_val: bool) -> Result<()> {
        #[cfg(feature = "trace")]
        log::trace!("encode_terminal {}", bin_val);

        self.range -= 2;
        if bin_val {
            self.low += self.range;
            Ok(())
        } else {
            self.renorm()
        }
    }

    /// Returns the self-information cost, in 8.8 fixed-point bits, of
    /// encoding `bin_val` under the context at `idx`, without mutating any
    /// state. Used for rate-distortion decisions where only the marginal
    /// cost of one bin (rather than a whole branch) is needed.
    pub fn encode_test(&self, idx: usize, bin_val: bool) -> u32 {
        bits_for(self.states[idx], bin_val) as u32
    }
}

impl<W: Write> Encode for Encoder<W> {
    fn encode(&mut self, idx: usize, bin_val: bool) -> Result<()> {
        let packed = self.states[idx];
        let idx_s = state_idx(packed);
        let mut mps = val_mps(packed);

        #[cfg(feature = "trace")]
        log::trace!(
            "encode ctx={} range={:#x} low={:#x} mps={} state={} bin={}",
            idx,
            self.range,
            self.low,
            mps,
            idx_s,
            bin_val
        );

        let range_idx = (self.range >> 6) & 3;
        let range_lps = RANGE_TAB_LPS[idx_s as usize][range_idx as usize] as u32;
        self.range -= range_lps;

        if bin_val != mps {
            self.low += self.range;
            self.range = range_lps;
            if idx_s == 0 {
                mps = !mps;
            }
            self.states[idx] = pack(TRANS_IDX_LPS[idx_s as usize], mps);
        } else {
            self.states[idx] = pack(TRANS_IDX_MPS[idx_s as usize], mps);
        }

        self.renorm()
    }

    fn encode_bypass(&mut self, bin_val: bool) -> Result<()> {
        #[cfg(feature = "trace")]
        log::trace!("encode_bypass range={:#x} low={:#x} bin={}", self.range, self.low, bin_val);

        self.low <<= 1;
        if bin_val {
            self.low += self.range;
        }
        if self.low >= 0x400 {
            self.put_bit(true)?;
            self.low -= 0x400;
        } else if self.low < 0x200 {
            self.put_bit(false)?;
        } else {
            self.low -= 0x200;
            self.bits_outstanding += 1;
        }
        Ok(())
    }
}

impl<W: Write> Drop for Encoder<W> {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}
