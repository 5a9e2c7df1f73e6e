//! This module streams a whole raw dump through [assemble_block], one block at a time.

use super::assemble_block;
use crate::nand::OobConfig;
use crate::util::ReadExt;

use std::io::{Read, Write};

use anyhow::ensure;
use bytes::BytesMut;

/// Convert a raw page-only image into its page+OOB form.
///
/// Blocks are read from `input` until EOF, and each converted block is written to `output`
/// before the next one is read. An input that ends partway through a block is an error; the
/// blocks before it will already have been written.
///
/// `expected_blocks` only sizes the progress report. Returns the number of blocks written.
pub fn write_oob_image<R: Read, W: Write>(
    config: &OobConfig,
    input: &mut R,
    output: &mut W,
    expected_blocks: Option<u64>,
) -> anyhow::Result<u64> {
    let layout = config.layout();
    let rpt = howudoin::new()
        .label("Writing blocks")
        .set_len(expected_blocks);

    let mut raw = vec![0; layout.block_size];
    let mut out = BytesMut::with_capacity(layout.oob_block_size());
    let mut blocks: u64 = 0;
    loop {
        let filled = input.read_block(&mut raw)?;
        if filled == 0 {
            // EOF encountered means the conversion is complete
            break;
        }
        ensure!(
            filled == raw.len(),
            "input ends {filled} bytes into block {blocks}, expected {} bytes",
            raw.len()
        );

        out.clear();
        assemble_block(config, &raw, &mut out);
        output.write_all(&out)?;

        blocks += 1;
        rpt.inc();
    }

    output.flush()?;
    rpt.close();

    Ok(blocks)
}

#[cfg(test)]
fn test_config(mode: crate::nand::OobMode) -> OobConfig {
    use crate::nand::NandLayout;

    let layout = NandLayout {
        block_size: 256,
        page_size: 128,
    };
    OobConfig::from_parts(layout, mode).unwrap()
}

#[test]
fn test_write_oob_image() -> anyhow::Result<()> {
    use crate::ecc::Strength;
    use crate::nand::OobMode;

    let config = test_config(OobMode::Ecc(Strength::Ecc4));
    let raw: Vec<u8> = (0..256 * 3).map(|i| (i * 31) as u8).collect();

    let mut output: Vec<u8> = Vec::new();
    let blocks = write_oob_image(&config, &mut &raw[..], &mut output, Some(3))?;
    assert_eq!(blocks, 3);
    assert_eq!(output.len(), 3 * 264);

    // Each block converts independently of the others
    for (block, converted) in raw.chunks(256).zip(output.chunks(264)) {
        let mut expected: Vec<u8> = Vec::new();
        assemble_block(&config, block, &mut expected);
        assert_eq!(converted, &expected[..]);
    }

    Ok(())
}

#[test]
fn test_write_oob_image_empty() -> anyhow::Result<()> {
    use crate::nand::OobMode;

    let config = test_config(OobMode::Ones);
    let mut output: Vec<u8> = Vec::new();
    let blocks = write_oob_image(&config, &mut std::io::empty(), &mut output, None)?;
    assert_eq!(blocks, 0);
    assert!(output.is_empty());
    Ok(())
}

#[test]
fn test_write_oob_image_short_block() {
    use crate::nand::OobMode;

    let raw = vec![0u8; 256 + 100];
    let mut output: Vec<u8> = Vec::new();
    let result = write_oob_image(&test_config(OobMode::Zeros), &mut &raw[..], &mut output, None);

    assert!(result.is_err());
    // The complete block before the short one has been written, nothing more
    assert_eq!(output, vec![0u8; 264]);
}
