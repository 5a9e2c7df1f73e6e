//! NAND geometry and OOB configuration

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::ecc::{Strength, CHUNK_SIZE};

/// Largest erase block the converter handles
pub const MAX_BLOCK_SIZE: usize = 524288;

/// Every 32 bytes of page data get one byte of OOB area
pub const OOB_RATIO: usize = 32;

/// Reasons a configuration or input image is rejected before any block is converted
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("block size can not be 0")]
    ZeroBlockSize,
    #[error("block size {0} too large (maximum {max})", max = MAX_BLOCK_SIZE)]
    BlockTooLarge(usize),
    #[error("page size can not be 0")]
    ZeroPageSize,
    #[error("page size {0} not even multiple of {ratio}", ratio = OOB_RATIO)]
    PageNotOobAligned(usize),
    #[error("only ecc strength of 3 or 4 bytes supported, got {0}")]
    UnsupportedStrength(u8),
    #[error("block size {block} not multiple of page size {page}")]
    BlockNotPageAligned { block: usize, page: usize },
    #[error("page size {0} not multiple of the {chunk}-byte ECC chunk", chunk = CHUNK_SIZE)]
    PageNotChunkAligned(usize),
    #[error("input size {len} not multiple of block size {block}")]
    ImageNotBlockAligned { len: u64, block: usize },
}

/// A pub-fields struct describing how a raw dump is divided into blocks and pages
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct NandLayout {
    pub block_size: usize,
    pub page_size: usize,
}

impl NandLayout {
    /// Check each size is usable on its own, without relating them to each other
    fn check_sizes(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::BlockTooLarge(self.block_size));
        }
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.page_size % OOB_RATIO != 0 {
            return Err(ConfigError::PageNotOobAligned(self.page_size));
        }
        Ok(())
    }

    /// Check the sizes are usable for OOB generation
    pub fn validate(self) -> Result<Self, ConfigError> {
        self.check_sizes()?;

        if self.block_size % self.page_size != 0 {
            return Err(ConfigError::BlockNotPageAligned {
                block: self.block_size,
                page: self.page_size,
            });
        }

        Ok(self)
    }

    pub fn pages_per_block(&self) -> usize {
        self.block_size / self.page_size
    }

    /// Bytes of OOB area following each page
    pub fn oob_size(&self) -> usize {
        self.page_size / OOB_RATIO
    }

    /// How many parity chunks each page holds
    pub fn chunks_per_page(&self) -> usize {
        self.page_size / CHUNK_SIZE
    }

    /// Size of one block once every page has its OOB area appended
    pub fn oob_block_size(&self) -> usize {
        self.pages_per_block() * (self.page_size + self.oob_size())
    }

    /// Count the blocks in an input image of `len` bytes, which must be block-aligned
    pub fn blocks_in(&self, len: u64) -> Result<u64, ConfigError> {
        let block = self.block_size as u64;
        if len % block != 0 {
            return Err(ConfigError::ImageNotBlockAligned {
                len,
                block: self.block_size,
            });
        }
        Ok(len / block)
    }
}

/// Parse strings like "BLOCKxPAGE"
impl FromStr for NandLayout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let [block_size, page_size]: [&str; 2] = s
            .split('x')
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| anyhow::anyhow!("expected #x#"))?;
        let block_size = block_size.parse()?;
        let page_size = page_size.parse()?;

        Ok(NandLayout {
            block_size,
            page_size,
        })
    }
}

/// What goes into the OOB area after each page
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum OobMode {
    /// Fill with 0x00
    Zeros,

    /// Fill with 0xFF, the erased state
    Ones,

    /// Reed-Solomon parity per chunk, with any leftover bytes at 0xFF
    Ecc(Strength),
}

impl OobMode {
    /// Resolve the mode from the user's options.
    ///
    /// 3-byte ECC always wins. Otherwise ones-fill beats zero-fill, and with no fill requested
    /// the result is 4-byte ECC.
    pub fn select(strength: Strength, fill_zero: bool, fill_ones: bool) -> Self {
        match (strength, fill_ones, fill_zero) {
            (Strength::Ecc3, _, _) => Self::Ecc(Strength::Ecc3),
            (_, true, _) => Self::Ones,
            (_, _, true) => Self::Zeros,
            (strength, false, false) => Self::Ecc(strength),
        }
    }
}

impl fmt::Display for OobMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zeros => f.write_str("Zeros"),
            Self::Ones => f.write_str("Ones"),
            Self::Ecc(strength) => write!(f, "ECC{}", strength.width()),
        }
    }
}

/// A validated layout and OOB mode; the only input the block converter needs
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OobConfig {
    layout: NandLayout,
    mode: OobMode,
}

impl OobConfig {
    /// Validate raw user options into a configuration.
    ///
    /// Checks run in the order the user is most likely to have gotten wrong: sizes first, then
    /// strength, then how the sizes relate to each other and to the ECC chunk.
    pub fn new(
        block_size: usize,
        page_size: usize,
        strength: u8,
        fill_zero: bool,
        fill_ones: bool,
    ) -> Result<Self, ConfigError> {
        let layout = NandLayout {
            block_size,
            page_size,
        };

        layout.check_sizes()?;
        let strength = Strength::try_from(strength)?;

        Self::from_parts(layout, OobMode::select(strength, fill_zero, fill_ones))
    }

    /// Build a configuration from an already-resolved mode
    pub fn from_parts(layout: NandLayout, mode: OobMode) -> Result<Self, ConfigError> {
        let layout = layout.validate()?;

        if matches!(mode, OobMode::Ecc(_)) && layout.page_size % CHUNK_SIZE != 0 {
            return Err(ConfigError::PageNotChunkAligned(layout.page_size));
        }

        Ok(Self { layout, mode })
    }

    pub fn layout(&self) -> NandLayout {
        self.layout
    }

    pub fn mode(&self) -> OobMode {
        self.mode
    }
}

#[cfg(test)]
const TEST_LAYOUT: NandLayout = NandLayout {
    block_size: 131072,
    page_size: 2048,
};

#[test]
fn test_layout_sizes() {
    assert_eq!(TEST_LAYOUT.pages_per_block(), 64);
    assert_eq!(TEST_LAYOUT.oob_size(), 64);
    assert_eq!(TEST_LAYOUT.chunks_per_page(), 16);
    assert_eq!(TEST_LAYOUT.oob_block_size(), 64 * (2048 + 64));

    let small = NandLayout {
        block_size: 256,
        page_size: 128,
    };
    assert_eq!(small.oob_size(), 4);
    assert_eq!(small.oob_block_size(), 264);
}

#[test]
fn test_layout_parse() -> anyhow::Result<()> {
    assert_eq!("131072x2048".parse::<NandLayout>()?, TEST_LAYOUT);
    assert!("131072".parse::<NandLayout>().is_err());
    assert!("1x2x3".parse::<NandLayout>().is_err());
    assert!("bx2048".parse::<NandLayout>().is_err());
    Ok(())
}

#[test]
fn test_blocks_in() {
    assert_eq!(TEST_LAYOUT.blocks_in(0), Ok(0));
    assert_eq!(TEST_LAYOUT.blocks_in(131072 * 3), Ok(3));
    assert_eq!(
        TEST_LAYOUT.blocks_in(131072 + 1),
        Err(ConfigError::ImageNotBlockAligned {
            len: 131073,
            block: 131072
        })
    );
}

#[test]
fn test_config_validation() {
    use ConfigError::*;

    assert_eq!(OobConfig::new(0, 2048, 4, false, false), Err(ZeroBlockSize));
    assert_eq!(
        OobConfig::new(MAX_BLOCK_SIZE * 2, 2048, 4, false, false),
        Err(BlockTooLarge(MAX_BLOCK_SIZE * 2))
    );
    assert_eq!(OobConfig::new(131072, 0, 4, false, false), Err(ZeroPageSize));
    assert_eq!(
        OobConfig::new(131072, 2047, 4, false, false),
        Err(PageNotOobAligned(2047))
    );
    assert_eq!(
        OobConfig::new(131072, 2048, 5, false, false),
        Err(UnsupportedStrength(5))
    );
    assert_eq!(
        OobConfig::new(3000 * 32, 2048, 5, false, false),
        Err(UnsupportedStrength(5))
    );
    assert_eq!(
        OobConfig::new(3000 * 32, 2048, 4, false, false),
        Err(BlockNotPageAligned {
            block: 96000,
            page: 2048
        })
    );

    // 64-byte pages are fine for constant fill, but can't carry parity
    assert!(OobConfig::new(4096, 64, 4, true, false).is_ok());
    assert_eq!(
        OobConfig::new(4096, 64, 4, false, false),
        Err(PageNotChunkAligned(64))
    );

    let config = OobConfig::new(131072, 2048, 4, false, false).unwrap();
    assert_eq!(config.layout(), TEST_LAYOUT);
    assert_eq!(config.mode(), OobMode::Ecc(Strength::Ecc4));
}

#[test]
fn test_mode_precedence() {
    use OobMode::*;
    use Strength::*;

    assert_eq!(OobMode::select(Ecc4, false, false), Ecc(Ecc4));
    assert_eq!(OobMode::select(Ecc4, true, false), Zeros);
    assert_eq!(OobMode::select(Ecc4, false, true), Ones);
    assert_eq!(OobMode::select(Ecc4, true, true), Ones);

    // ECC3 overrides either fill flag
    assert_eq!(OobMode::select(Ecc3, false, false), Ecc(Ecc3));
    assert_eq!(OobMode::select(Ecc3, true, false), Ecc(Ecc3));
    assert_eq!(OobMode::select(Ecc3, false, true), Ecc(Ecc3));
    assert_eq!(OobMode::select(Ecc3, true, true), Ecc(Ecc3));
}

#[test]
fn test_mode_display() {
    assert_eq!(OobMode::Zeros.to_string(), "Zeros");
    assert_eq!(OobMode::Ones.to_string(), "Ones");
    assert_eq!(OobMode::Ecc(Strength::Ecc4).to_string(), "ECC4");
    assert_eq!(OobMode::Ecc(Strength::Ecc3).to_string(), "ECC3");
}
