//! Physical page+OOB layout of the GRX350/GRX550 NAND controller:
//!
//! ```text
//! +----------+-------+----------+-------+     +------------+-----------+
//! |  Page 0  | OOB 0 |  Page 1  | OOB 1 | ... | Page (n-1) | OOB (n-1) |
//! +----------+-------+----------+-------+     +------------+-----------+
//! ```
//!
//! Each OOB area is `page_size / 32` bytes. In ECC modes it holds the parity of each 128-byte
//! chunk of its page, in chunk order, and any bytes left over stay erased (0xFF).
//!
//! This module assembles one block at a time; [image] drives it over a whole dump.

pub mod image;

use bytes::BufMut;

use crate::ecc::CHUNK_SIZE;
use crate::nand::{OobConfig, OobMode};

/// Append the page+OOB form of one raw block to `out`.
///
/// `raw` must be exactly one block long. Exactly `layout.oob_block_size()` bytes are appended.
pub fn assemble_block<B: BufMut>(config: &OobConfig, raw: &[u8], out: &mut B) {
    let layout = config.layout();
    let oob_size = layout.oob_size();
    debug_assert_eq!(raw.len(), layout.block_size);

    for page in raw.chunks_exact(layout.page_size) {
        out.put_slice(page);

        match config.mode() {
            OobMode::Zeros => out.put_bytes(0x00, oob_size),
            OobMode::Ones => out.put_bytes(0xFF, oob_size),
            OobMode::Ecc(strength) => {
                let mut written = 0;
                for chunk in page.chunks_exact(CHUNK_SIZE) {
                    let chunk = chunk.try_into().expect("chunks_exact yields whole chunks");
                    written += strength.put_parity(chunk, out);
                }
                out.put_bytes(0xFF, oob_size - written);
            }
        }
    }
}

#[cfg(test)]
fn assemble(config: &OobConfig, raw: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    assemble_block(config, raw, &mut out);
    out
}

#[cfg(test)]
fn small_config(mode: OobMode) -> OobConfig {
    use crate::nand::NandLayout;

    let layout = NandLayout {
        block_size: 256,
        page_size: 128,
    };
    OobConfig::from_parts(layout, mode).unwrap()
}

#[test]
fn test_assemble_ecc4_zeros() {
    use crate::ecc::Strength;

    let out = assemble(&small_config(OobMode::Ecc(Strength::Ecc4)), &[0u8; 256]);
    assert_eq!(out.len(), 264);
    assert!(out.iter().all(|&x| x == 0));
}

#[test]
fn test_assemble_fill() {
    let raw: Vec<u8> = (0..256).map(|i| (i * 7) as u8).collect();

    for (mode, fill) in [(OobMode::Zeros, 0x00), (OobMode::Ones, 0xFF)] {
        let out = assemble(&small_config(mode), &raw);
        assert_eq!(out.len(), 264);
        assert_eq!(out[..128], raw[..128]);
        assert_eq!(out[128..132], [fill; 4]);
        assert_eq!(out[132..260], raw[128..]);
        assert_eq!(out[260..], [fill; 4]);
    }
}

#[test]
fn test_assemble_parity_placement() {
    use crate::ecc::{ecc3, ecc4, Strength};
    use crate::nand::NandLayout;

    // Two pages of two chunks each: OOB is 8 bytes per page
    let layout = NandLayout {
        block_size: 512,
        page_size: 256,
    };
    let raw: Vec<u8> = (0..512).map(|i| (i * 13 + 1) as u8).collect();
    let chunk =
        |n: usize| <&[u8; CHUNK_SIZE]>::try_from(&raw[n * CHUNK_SIZE..][..CHUNK_SIZE]).unwrap();

    let config = OobConfig::from_parts(layout, OobMode::Ecc(Strength::Ecc4)).unwrap();
    let out = assemble(&config, &raw);
    assert_eq!(out.len(), 2 * (256 + 8));
    assert_eq!(out[..256], raw[..256]);
    assert_eq!(out[256..260], ecc4(chunk(0)));
    assert_eq!(out[260..264], ecc4(chunk(1)));
    assert_eq!(out[264..520], raw[256..]);
    assert_eq!(out[520..524], ecc4(chunk(2)));
    assert_eq!(out[524..528], ecc4(chunk(3)));

    // 3-byte parity leaves two erased bytes at the end of each OOB area
    let config = OobConfig::from_parts(layout, OobMode::Ecc(Strength::Ecc3)).unwrap();
    let out = assemble(&config, &raw);
    assert_eq!(out.len(), 2 * (256 + 8));
    assert_eq!(out[256..259], ecc3(chunk(0)));
    assert_eq!(out[259..262], ecc3(chunk(1)));
    assert_eq!(out[262..264], [0xFF; 2]);
    assert_eq!(out[264..520], raw[256..]);
    assert_eq!(out[520..523], ecc3(chunk(2)));
    assert_eq!(out[523..526], ecc3(chunk(3)));
    assert_eq!(out[526..528], [0xFF; 2]);
}

#[test]
fn test_assemble_sizes() {
    use crate::ecc::Strength;
    use crate::nand::NandLayout;

    for (block_size, page_size) in [(4096, 512), (131072, 2048), (262144, 4096), (2048, 2048)] {
        let layout = NandLayout {
            block_size,
            page_size,
        };
        let raw = vec![0x5A; block_size];
        for mode in [
            OobMode::Zeros,
            OobMode::Ones,
            OobMode::Ecc(Strength::Ecc3),
            OobMode::Ecc(Strength::Ecc4),
        ] {
            let config = OobConfig::from_parts(layout, mode).unwrap();
            let out = assemble(&config, &raw);
            assert_eq!(out.len(), layout.oob_block_size());
            assert_eq!(
                out.len(),
                layout.pages_per_block() * (page_size + page_size / 32)
            );
        }
    }
}

#[test]
fn test_assemble_repeatable() {
    use crate::ecc::Strength;

    let config = small_config(OobMode::Ecc(Strength::Ecc3));
    let raw: Vec<u8> = (0..256).map(|i| (i ^ 0x3C) as u8).collect();
    let mut out = bytes::BytesMut::new();

    assemble_block(&config, &raw, &mut out);
    let first = out.split().freeze();
    assemble_block(&config, &raw, &mut out);
    assert_eq!(out.freeze(), first);
}
