//! Convert a raw NAND dump (pages only) into the page+OOB image programmed into the
//! GRX350/GRX550 NAND controller's flash.

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use ltq_nand::{
    format::image::write_oob_image,
    nand::{NandLayout, OobConfig},
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Cli {
    /// Raw input image, pages only
    #[clap(short = 'i', long)]
    input: PathBuf,

    /// Output image with OOB areas
    #[clap(short = 'o', long)]
    output: PathBuf,

    /// Block size in bytes
    #[clap(short = 'b', long, default_value_t = 131072, conflicts_with = "geometry")]
    block_size: usize,

    /// Page size in bytes; must be a multiple of 32
    #[clap(short = 'p', long, default_value_t = 2048, conflicts_with = "geometry")]
    page_size: usize,

    /// Block and page size together, as BLOCKxPAGE
    #[clap(long)]
    geometry: Option<NandLayout>,

    /// ECC strength in parity bytes per 128-byte chunk (3 or 4)
    #[clap(short = 'e', long = "ecc", default_value_t = 4)]
    ecc_strength: u8,

    /// Fill spare area/OOB with 0x00
    #[clap(short = '0', long)]
    zeros: bool,

    /// Fill spare area/OOB with 0xFF
    #[clap(short = '1', long)]
    ones: bool,
}

impl Cli {
    fn config(&self) -> Result<OobConfig> {
        let layout = self.geometry.unwrap_or(NandLayout {
            block_size: self.block_size,
            page_size: self.page_size,
        });

        Ok(OobConfig::new(
            layout.block_size,
            layout.page_size,
            self.ecc_strength,
            self.zeros,
            self.ones,
        )?)
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("[-] Conversion error:\n{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> Result<()> {
    let config = args.config()?;
    let layout = config.layout();

    let input = File::open(&args.input).with_context(|| args.input.display().to_string())?;
    let input_len = input.metadata()?.len();
    let blocks = layout.blocks_in(input_len)?;

    println!("Input file {}", args.input.display());
    println!("Size of input file: {input_len}");
    println!("Block size: {}", layout.block_size);
    println!("Input file blocks {blocks}");
    println!("Page size: {}", layout.page_size);
    println!("Pages in block: {}", layout.pages_per_block());
    println!("ECC strength: {}", args.ecc_strength);
    println!("OOB area generation: {}", config.mode());
    println!("OOB area size {}", layout.oob_size());

    let output = File::create(&args.output).with_context(|| args.output.display().to_string())?;

    howudoin::init(howudoin::consumers::TermLine::default());
    let written = write_oob_image(
        &config,
        &mut BufReader::new(input),
        &mut BufWriter::new(output),
        Some(blocks),
    );
    howudoin::disable();
    thread::sleep(Duration::from_millis(10)); // Give howudoin time to shut down
    let written = written?;

    eprintln!(
        "[+] Wrote {written} blocks ({} bytes) to {}",
        written * layout.oob_block_size() as u64,
        args.output.display()
    );

    Ok(())
}
