//! Bit matrix helpers for OT extension
//!
//! The extension matrix has `KAPPA` rows (one per base OT lane) of packed
//! LSB-first bits. Its columns are `KAPPA`-bit blocks, one per extended OT.

use crate::types::{bit, KAPPA, KAPPA_BYTES};

/// One column of the extension matrix
pub(crate) type Column = [u8; KAPPA_BYTES];

const LIMBS: usize = KAPPA / 64;

/// Unreduced carry-less product of two columns
pub(crate) type Wide = [u64; 2 * LIMBS];

/// Byte length of a serialized [`Wide`]
pub(crate) const WIDE_BYTES: usize = 2 * KAPPA_BYTES;

/// `a ^= b`, over the shorter of the two
pub(crate) fn xor_in_place(a: &mut [u8], b: &[u8]) {
    a.iter_mut().zip(b).for_each(|(a, b)| *a ^= *b);
}

/// Column `j` of the matrix formed by `rows`
pub(crate) fn column(rows: &[Vec<u8>], j: usize) -> Column {
    debug_assert_eq!(rows.len(), KAPPA);
    let mut col = [0u8; KAPPA_BYTES];
    for (i, row) in rows.iter().enumerate() {
        col[i / 8] |= bit(row, j) << (i % 8);
    }
    col
}

/// `block` if `choice` is 1, zero otherwise, without branching on `choice`
pub(crate) fn select(choice: u8, block: &Column) -> Column {
    let mask = 0u8.wrapping_sub(choice & 1);
    let mut out = *block;
    out.iter_mut().for_each(|b| *b &= mask);
    out
}

fn limbs(block: &Column) -> [u64; LIMBS] {
    let mut out = [0u64; LIMBS];
    for (limb, chunk) in out.iter_mut().zip(block.chunks_exact(8)) {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(chunk);
        *limb = u64::from_le_bytes(buf);
    }
    out
}

fn clmul64(a: u64, b: u64) -> (u64, u64) {
    let (mut lo, mut hi) = (0u64, 0u64);
    for i in 0..64 {
        let mask = 0u64.wrapping_sub((b >> i) & 1);
        lo ^= (a << i) & mask;
        if i > 0 {
            hi ^= (a >> (64 - i)) & mask;
        }
    }
    (lo, hi)
}

/// Carry-less product of `a` and `b` as polynomials over GF(2)
pub(crate) fn clmul(a: &Column, b: &Column) -> Wide {
    let (a, b) = (limbs(a), limbs(b));
    let mut out = [0u64; 2 * LIMBS];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            let (lo, hi) = clmul64(x, y);
            out[i + j] ^= lo;
            out[i + j + 1] ^= hi;
        }
    }
    out
}

pub(crate) fn xor_wide(acc: &mut Wide, other: &Wide) {
    acc.iter_mut().zip(other).for_each(|(a, b)| *a ^= *b);
}

pub(crate) fn wide_to_bytes(w: &Wide) -> Vec<u8> {
    w.iter().flat_map(|limb| limb.to_le_bytes()).collect()
}
