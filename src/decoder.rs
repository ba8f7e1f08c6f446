//! The regular/bypass/terminal CABAC decoder, the mirror image of
//! [`crate::encoder::Encoder`].
//!
//! Ported from `original_source/trunk/include/cabac/decoder.h`'s
//! `decoder<I>`, generalized to `std::io::Read` in the shape of the
//! teacher's `H265Reader<R: Read>`.
use std::io::{Read, Result};

use byteorder::ReadBytesExt;

use crate::state::{pack, state_idx, val_mps, StateVector};
use crate::tables::{RANGE_TAB_LPS, TRANS_IDX_LPS, TRANS_IDX_MPS};
use crate::traits::Decode;

/// Reads a CABAC bitstream from any `std::io::Read` source.
pub struct Decoder<R> {
    reader: R,
    states: StateVector,
    range: u32,
    offset: u32,
    mask: u32,
    cur_byte: u8,
}

impl<R: Read> Decoder<R> {
    /// Creates a decoder reading from `reader`, seeded with `states` (which
    /// must match the state vector the encoder started with). Eagerly reads
    /// the first two bytes of the bitstream, mirroring the original's
    /// constructor.
    pub fn new(mut reader: R, states: StateVector) -> Result<Self> {
        let b0 = reader.read_u8()?;
        let b1 = reader.read_u8()?;
        Ok(Decoder {
            reader,
            states,
            range: 0x1fe,
            offset: ((b0 as u32) << 1) | ((b1 as u32 & 128) >> 7),
            mask: 64,
            cur_byte: b1,
        })
    }

    pub fn states(&self) -> &StateVector {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut StateVector {
        &mut self.states
    }

    /// The current `range` register. Exposed for the register invariant
    /// `range ∈ [0x100, 0x1FE]` that holds after every `decode`/`decode_bypass` call.
    pub fn range(&self) -> u32 {
        self.range
    }

    fn read_bit(&mut self) -> Result<bool> {
        let b = (self.cur_byte as u32 & self.mask) != 0;
        self.mask >>= 1;
        if self.mask == 0 {
            self.cur_byte = self.reader.read_u8()?;
            self.mask = 128;
        }

        #[cfg(feature = "trace")]
        log::trace!("read_bit {}", b as u8);

        Ok(b)
    }

    fn renorm(&mut self) -> Result<()> {
        while self.range < 0x100 {
            self.range <<= 1;
            self.offset <<= 1;
            self.offset |= self.read_bit()? as u32;
        }
        Ok(())
    }

    /// Decodes a terminal bit. Returns `true` once the encoder's matching
    /// `encode_terminal(true)` has been reached; the caller should stop
    /// decoding at that point.
    pub fn decode_terminal(&mut self) -> Result<bool> {
        self.range -= 2;
        if self.offset >= self.range {
            #[cfg(feature = "trace")]
            log::trace!("decode_terminal true");
            return Ok(true);
        }
        self.renorm()?;

        #[cfg(feature = "trace")]
        log::trace!("decode_terminal false");
        Ok(false)
    }
}

impl<R: Read> Decode for Decoder<R> {
    fn decode(&mut self, idx: usize) -> Result<bool> {
        let packed = self.states[idx];
        let idx_s = state_idx(packed);
        let mut mps = val_mps(packed);

        #[cfg(feature = "trace")]
        log::trace!(
            "decode ctx={} range={:#x} offset={:#x} mps={} state={}",
            idx,
            self.range,
            self.offset,
            mps,
            idx_s
        );

        let range_idx = (self.range >> 6) & 3;
        let range_lps = RANGE_TAB_LPS[idx_s as usize][range_idx as usize] as u32;
        self.range -= range_lps;

        let bin_val;
        if self.offset >= self.range {
            bin_val = !mps;
            self.offset -= self.range;
            self.range = range_lps;
            if idx_s == 0 {
                mps = !mps;
            }
            self.states[idx] = pack(TRANS_IDX_LPS[idx_s as usize], mps);
        } else {
            bin_val = mps;
            self.states[idx] = pack(TRANS_IDX_MPS[idx_s as usize], mps);
        }

        self.renorm()?;
        Ok(bin_val)
    }

    fn decode_bypass(&mut self) -> Result<bool> {
        self.offset <<= 1;
        self.offset |= self.read_bit()? as u32;
        let bin_val = self.offset >= self.range;
        if bin_val {
            self.offset -= self.range;
        }

        #[cfg(feature = "trace")]
        log::trace!("decode_bypass range={:#x} offset={:#x} bin={}", self.range, self.offset, bin_val);

        Ok(bin_val)
    }
}
