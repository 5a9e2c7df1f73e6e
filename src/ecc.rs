//! Reed-Solomon parity generation, matching the GRX350/GRX550 NAND controller.
//!
//! The controller protects each 128-byte chunk of a page independently. The chunk is divided
//! by a fixed generator polynomial over GF(256) and the remainder is stored in the page's OOB
//! area, most-significant coefficient first.

use bytes::BufMut;

use crate::gf;
use crate::nand::ConfigError;

/// Number of page bytes covered by one parity computation
pub const CHUNK_SIZE: usize = 128;

/// Generator for 4-byte parity, lowest-order coefficient first (the x^4 term is implicit)
const ECC4_GENERATOR: [u8; 4] = [32, 92, 63, 205];

/// Generator for 3-byte parity: (x + 2)(x + 4)(x + 8)
const ECC3_GENERATOR: [u8; 3] = generator_from_roots([2, 4, 8]);

/// Expand the product of `(x + root)` for every root, returning all but the (monic) leading
/// coefficient, lowest-order first.
const fn generator_from_roots<const N: usize>(roots: [u8; N]) -> [u8; N] {
    let mut poly = [0u8; N];

    let mut k = 0;
    while k < N {
        // poly holds a monic degree-k polynomial; multiply it by (x + roots[k])
        let root = roots[k];
        let mut j = k;
        while j > 0 {
            let upper = if j == k { 1 } else { poly[j] };
            poly[j] = gf::add(poly[j - 1], gf::mul(root, upper));
            j -= 1;
        }
        poly[0] = gf::mul(root, if k == 0 { 1 } else { poly[0] });
        k += 1;
    }

    poly
}

/// Run one chunk through an `N`-stage division register, returning the remainder with the
/// highest-order coefficient first.
fn remainder<const N: usize>(chunk: &[u8; CHUNK_SIZE], generator: &[u8; N]) -> [u8; N] {
    let mut state = [0u8; N];

    for &byte in chunk {
        let feedback = gf::add(state[N - 1], byte);
        for i in (1..N).rev() {
            state[i] = gf::add(state[i - 1], gf::mul(feedback, generator[i]));
        }
        state[0] = gf::mul(feedback, generator[0]);
    }

    state.reverse();
    state
}

/// Compute the 4-byte parity of a chunk
pub fn ecc4(chunk: &[u8; CHUNK_SIZE]) -> [u8; 4] {
    remainder(chunk, &ECC4_GENERATOR)
}

/// Compute the 3-byte parity of a chunk
pub fn ecc3(chunk: &[u8; CHUNK_SIZE]) -> [u8; 3] {
    remainder(chunk, &ECC3_GENERATOR)
}

/// The two error-correction strengths the controller supports
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Strength {
    /// 3 parity bytes per chunk
    Ecc3,

    /// 4 parity bytes per chunk
    Ecc4,
}

impl Strength {
    /// How many parity bytes are produced per chunk
    pub const fn width(self) -> usize {
        match self {
            Self::Ecc3 => 3,
            Self::Ecc4 => 4,
        }
    }

    /// Append the parity of `chunk` to `out`, returning the number of bytes written
    pub fn put_parity<B: BufMut>(self, chunk: &[u8; CHUNK_SIZE], out: &mut B) -> usize {
        match self {
            Self::Ecc3 => out.put_slice(&ecc3(chunk)),
            Self::Ecc4 => out.put_slice(&ecc4(chunk)),
        }
        self.width()
    }
}

impl TryFrom<u8> for Strength {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, ConfigError> {
        match value {
            3 => Ok(Self::Ecc3),
            4 => Ok(Self::Ecc4),
            x => Err(ConfigError::UnsupportedStrength(x)),
        }
    }
}

impl From<Strength> for u8 {
    fn from(value: Strength) -> u8 {
        value.width() as u8
    }
}

#[cfg(test)]
fn impulse_at(index: usize, value: u8) -> [u8; CHUNK_SIZE] {
    let mut chunk = [0u8; CHUNK_SIZE];
    chunk[index] = value;
    chunk
}

#[test]
fn test_generators() {
    assert_eq!(ECC3_GENERATOR, [64, 56, 14]);
    assert_eq!(generator_from_roots([7]), [7]);
    assert_eq!(generator_from_roots([2, 4]), [8, 6]);
}

#[test]
fn test_zero_chunk() {
    let chunk = [0u8; CHUNK_SIZE];
    assert_eq!(ecc4(&chunk), [0; 4]);
    assert_eq!(ecc3(&chunk), [0; 3]);
}

#[test]
fn test_known_parity() {
    // A trailing 1 is x^0, so the remainder is just the generator (high order first)
    let chunk = impulse_at(CHUNK_SIZE - 1, 1);
    assert_eq!(ecc4(&chunk), [0xCD, 0x3F, 0x5C, 0x20]);
    assert_eq!(ecc3(&chunk), [0x0E, 0x38, 0x40]);

    let chunk = impulse_at(0, 1);
    assert_eq!(ecc4(&chunk), [0x75, 0xA8, 0xB0, 0x4F]);
    assert_eq!(ecc3(&chunk), [0x23, 0xE2, 0x1F]);

    let chunk: [u8; CHUNK_SIZE] = std::array::from_fn(|i| i as u8);
    assert_eq!(ecc4(&chunk), [0x84, 0x8A, 0xD1, 0xE5]);
    assert_eq!(ecc3(&chunk), [0xF4, 0xA3, 0x75]);

    let chunk = [0xFF; CHUNK_SIZE];
    assert_eq!(ecc4(&chunk), [0x5B, 0x13, 0xFF, 0xF1]);
    assert_eq!(ecc3(&chunk), [0x62, 0xCA, 0x95]);

    let chunk = [0xA5; CHUNK_SIZE];
    assert_eq!(ecc4(&chunk), [0xF3, 0x2F, 0xA5, 0x35]);
    assert_eq!(ecc3(&chunk), [0x22, 0xD4, 0x47]);
}

#[test]
fn test_parity_is_linear() {
    let a: [u8; CHUNK_SIZE] = std::array::from_fn(|i| (i * 23) as u8);
    let b: [u8; CHUNK_SIZE] = std::array::from_fn(|i| (i * 11 + 5) as u8);
    let sum: [u8; CHUNK_SIZE] = std::array::from_fn(|i| gf::add(a[i], b[i]));

    let (pa, pb, psum) = (ecc4(&a), ecc4(&b), ecc4(&sum));
    for i in 0..4 {
        assert_eq!(psum[i], gf::add(pa[i], pb[i]));
    }

    let (pa, pb, psum) = (ecc3(&a), ecc3(&b), ecc3(&sum));
    for i in 0..3 {
        assert_eq!(psum[i], gf::add(pa[i], pb[i]));
    }
}

#[test]
fn test_put_parity() {
    let chunk = impulse_at(CHUNK_SIZE - 1, 1);
    let mut out: Vec<u8> = Vec::new();

    assert_eq!(Strength::Ecc4.put_parity(&chunk, &mut out), 4);
    assert_eq!(Strength::Ecc3.put_parity(&chunk, &mut out), 3);
    assert_eq!(out, [0xCD, 0x3F, 0x5C, 0x20, 0x0E, 0x38, 0x40]);

    // Deterministic: same chunk, same bytes
    assert_eq!(ecc4(&chunk), ecc4(&chunk));
}

#[test]
fn test_strength_from_u8() {
    assert_eq!(Strength::try_from(3u8), Ok(Strength::Ecc3));
    assert_eq!(Strength::try_from(4u8), Ok(Strength::Ecc4));
    assert_eq!(
        Strength::try_from(5u8),
        Err(ConfigError::UnsupportedStrength(5))
    );
    assert!(Strength::try_from(0u8).is_err());
    assert_eq!(u8::from(Strength::Ecc3), 3);
}
