use anyhow::Result;
use log::info;
use secchunk::{FilingChunker, FilingParser, FormType};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "secchunk-cli",
    about = "Chunk an SEC filing (HTML/inline XBRL) into RAG-ready segments"
)]
struct Opt {
    /// Filing document to process
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// SEC form type (10-K, 10-Q, 8-K)
    #[structopt(long, default_value = "10-K")]
    form_type: String,

    /// Ticker symbol stamped onto every chunk
    #[structopt(long, default_value = "UNKNOWN")]
    ticker: String,

    /// Filing year stamped onto every chunk
    #[structopt(long, default_value = "2025")]
    year: String,

    /// EDGAR accession number stamped onto every chunk
    #[structopt(long, default_value = "")]
    accession: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    if !opt.input.exists() {
        eprintln!("Input file does not exist: {:?}", opt.input);
        std::process::exit(1);
    }

    let content = fs::read_to_string(&opt.input)?;
    let form_type = FormType::from_str(&opt.form_type).map_err(anyhow::Error::msg)?;

    let mut parser = FilingParser::new(form_type.clone());
    let blocks = parser.parse(&content, &form_type);
    info!("Parser stats: {:?}", parser.stats);

    let mut chunker = FilingChunker::new(form_type.clone());
    let chunks = chunker.process(&blocks, &form_type, &opt.accession, &opt.ticker, &opt.year);
    info!("Chunker stats: {:?}", chunker.stats);

    println!("{}", serde_json::to_string_pretty(&chunks)?);
    Ok(())
}
