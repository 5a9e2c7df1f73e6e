//! Arithmetic over GF(256), as used by the NAND controller's Reed-Solomon encoder.
//!
//! Elements are bytes. Addition is XOR; multiplication goes through discrete-log tables built
//! from the reduction polynomial x^8 + x^7 + x^2 + x + 1 with 2 as the primitive element.

/// The reduction polynomial, including the x^8 term
const POLY: u16 = 0x187;

const fn compute_tables() -> ([u8; 256], [u8; 256]) {
    let mut log = [0u8; 256];
    let mut antilog = [0u8; 256];
    let mut p: u16 = 1;
    let mut i = 0;
    while i < 255 {
        antilog[i] = p as u8;
        log[p as usize] = i as u8;

        p <<= 1;
        if p >= 256 {
            p ^= POLY;
        }
        i += 1;
    }

    // The controller's table wraps around at the end; log[0] stays a zero sentinel.
    antilog[255] = antilog[0];
    (log, antilog)
}

/// Discrete logarithm of each nonzero element
const LOG: [u8; 256] = compute_tables().0;

/// Element for each exponent, with period 255
const ANTILOG: [u8; 256] = compute_tables().1;

/// Look up the discrete logarithm of `a`. Meaningless for 0.
pub const fn log(a: u8) -> u8 {
    LOG[a as usize]
}

/// Look up 2^`i`
pub const fn antilog(i: u8) -> u8 {
    ANTILOG[i as usize]
}

/// Field addition (and subtraction)
pub const fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Field multiplication
pub const fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }

    ANTILOG[(LOG[a as usize] as usize + LOG[b as usize] as usize) % 255]
}

#[test]
fn test_tables() {
    // Spot checks against the controller's tables
    assert_eq!(&LOG[..8], &[0, 0, 1, 99, 2, 198, 100, 106]);
    assert_eq!(&ANTILOG[..10], &[1, 2, 4, 8, 16, 32, 64, 128, 135, 137]);
    assert_eq!(ANTILOG[254], 195);
    assert_eq!(ANTILOG[255], 1);
    assert_eq!(LOG[255], 183);

    for a in 1..=255u8 {
        assert_eq!(antilog(log(a)), a);
    }
}

#[test]
fn test_mul() {
    assert_eq!(mul(2, 4), 8);
    assert_eq!(mul(128, 2), 0x87);
    assert_eq!(mul(8, 8), 64);

    for a in 0..=255u8 {
        assert_eq!(mul(a, 0), 0);
        assert_eq!(mul(0, a), 0);
        assert_eq!(mul(a, 1), a);
        for b in 0..=255u8 {
            assert_eq!(mul(a, b), mul(b, a));
        }
    }
}

#[test]
fn test_mul_distributes() {
    for a in [1u8, 2, 3, 0x53, 0xCA, 0xFF] {
        for b in 0..=255u8 {
            for c in [0u8, 1, 7, 0x80, 0xFE] {
                assert_eq!(mul(a, add(b, c)), add(mul(a, b), mul(a, c)));
            }
        }
    }
}

#[test]
fn test_add() {
    for a in 0..=255u8 {
        assert_eq!(add(a, a), 0);
        assert_eq!(add(a, 0), a);
        for b in 0..=255u8 {
            assert_eq!(add(a, b), add(b, a));
            assert_eq!(add(add(a, b), b), a);
        }
    }
}
