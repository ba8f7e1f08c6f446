//! Exp-Golomb(k) integer codings layered over the context-adaptive/bypass
//! primitives, ported directly from
//! `original_source/trunk/include/cabac/integer.h`.
//!
//! Lower magnitudes are assumed more likely than higher ones: the first
//! `num_ctx` values are signalled by a context-coded unary prefix (one
//! context per unary position, so the model can adapt per position), and
//! anything at or beyond `num_ctx` falls through to an Exp-Golomb(k) tail
//! coded with the bypass engine. Passing `num_ctx = 0` skips the prefix
//! entirely and Exp-Golomb(k)-codes the whole value.
use std::io::Result;

use crate::traits::{Decode, Encode};

/// Encodes an unsigned integer. See the module documentation for the
/// two-stage context-prefix / Exp-Golomb(k) scheme.
pub fn encode_ueg<E: Encode>(
    e: &mut E,
    mut value: u32,
    mut k: u32,
    idx: usize,
    num_ctx: usize,
) -> Result<()> {
    for ctx in idx..idx + num_ctx {
        let zero = value == 0;
        e.encode(ctx, zero)?;
        if zero {
            return Ok(());
        }
        value -= 1;
    }
    while value >= 1 << k {
        e.encode_bypass(true)?;
        value -= 1 << k;
        k += 1;
    }
    e.encode_bypass(false)?;
    while k > 0 {
        k -= 1;
        e.encode_bypass((value >> k) & 1 != 0)?;
    }
    Ok(())
}

/// Encodes a signed integer by zig-zag mapping it to an unsigned value and
/// delegating to [`encode_ueg`]: `0, -1, 1, -2, 2, ...` map to `0, 1, 2, 3, 4, ...`.
pub fn encode_seg<E: Encode>(
    e: &mut E,
    value: i32,
    k: u32,
    idx: usize,
    num_ctx: usize,
) -> Result<()> {
    let abs_value = value.unsigned_abs();
    let mapped = abs_value * 2 - (value < 0) as u32;
    encode_ueg(e, mapped, k, idx, num_ctx)
}

/// Decodes an unsigned integer coded by [`encode_ueg`].
pub fn decode_ueg<D: Decode>(d: &mut D, mut k: u32, idx: usize, num_ctx: usize) -> Result<u32> {
    let mut value = 0u32;
    for ctx in idx..idx + num_ctx {
        if d.decode(ctx)? {
            return Ok(value);
        }
        value += 1;
    }
    while d.decode_bypass()? {
        value += 1 << k;
        k += 1;
    }
    while k > 0 {
        k -= 1;
        if d.decode_bypass()? {
            value += 1 << k;
        }
    }
    Ok(value)
}

/// Decodes a signed integer coded by [`encode_seg`].
pub fn decode_seg<D: Decode>(d: &mut D, k: u32, idx: usize, num_ctx: usize) -> Result<i32> {
    let dec_value = decode_ueg(d, k, idx, num_ctx)?;
    let mut value = ((dec_value + 1) / 2) as i32;
    if dec_value & 1 != 0 {
        value = -value;
    }
    Ok(value)
}
