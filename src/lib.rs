//! Convert raw page-only NAND dumps into the page+OOB layout expected by the Lantiq/Intel
//! GRX350/GRX550 NAND controller.
//!
//! Each page of the input is followed in the output by an out-of-band area of `page_size / 32`
//! bytes, holding either a constant fill or the controller's Reed-Solomon parity.

pub mod ecc;
pub mod format;
pub mod gf;
pub mod nand;
pub mod util;
