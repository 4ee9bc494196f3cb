use std::path::PathBuf;

use clap::Args;
use pomotimer_core::notify::{encode_wav, MAX_SAMPLE_RATE};
use pomotimer_core::Chime;

#[derive(Args)]
pub struct ChimeArgs {
    /// Output file
    #[arg(long, short)]
    out: PathBuf,
    /// Samples per second
    #[arg(
        long,
        default_value_t = 44_100,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SAMPLE_RATE))
    )]
    sample_rate: u32,
}

pub fn run(args: ChimeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let samples = Chime::default().render(args.sample_rate);
    let wav = encode_wav(&samples, args.sample_rate).ok_or("chime too long to encode as WAV")?;
    std::fs::write(&args.out, wav)?;
    println!("wrote {} samples to {}", samples.len(), args.out.display());
    Ok(())
}
