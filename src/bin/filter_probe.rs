use anyhow::Context;
use clap::Parser;
use rolling_stats::Stats;

use tapflow::ChainConfig;

const DEFAULT_CHAIN: &str = r#"
channels = 1

[[filters]]
kind = "iir"
prototype = { type = "butterworth", order = 4 }
band = { type = "bandpass", low = 0.1, high = 0.2 }

[[filters]]
kind = "running_range"
length = 64
"#;

#[derive(Parser, Debug)]
#[command(name = "filter_probe")]
#[command(about = "Run a filter chain over a synthesized multi-tone signal", long_about = None)]
struct Args {
    /// Inline TOML chain description (defaults to a bandpass followed by a running range)
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Number of frames to synthesize
    #[arg(short = 'n', long, default_value = "4096")]
    samples: usize,

    /// Frames per processing block
    #[arg(short = 'b', long, default_value = "512")]
    block_size: usize,

    /// Tone frequencies, normalized to Nyquist
    #[arg(short = 't', long, value_delimiter = ',', default_value = "0.05,0.15,0.4")]
    tones: Vec<f64>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Sum of unit-amplitude tones, the same on every channel apart from a
/// per-channel phase offset.
fn synthesize(tones: &[f64], frames: usize, channels: usize) -> Vec<f64> {
    let mut signal = Vec::with_capacity(frames * channels);
    for t in 0..frames {
        for c in 0..channels {
            let phase = c as f64 * 0.25;
            let x: f64 = tones
                .iter()
                .map(|f| (std::f64::consts::PI * f * t as f64 + phase).sin())
                .sum();
            signal.push(x);
        }
    }
    signal
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let text = args.config.as_deref().unwrap_or(DEFAULT_CHAIN);
    let config = ChainConfig::from_toml_str(text).context("Failed to parse chain config")?;
    let mut chain = config.build().context("Failed to build filter chain")?;

    if args.block_size == 0 {
        anyhow::bail!("Block size must be at least 1");
    }

    let channels = chain.channels();
    let signal = synthesize(&args.tones, args.samples, channels);

    println!(
        "=== filter_probe: {} filters, {} channels, {} frames ===",
        chain.len(),
        channels,
        args.samples
    );
    println!(
        "{:>6} {:>8} {:>12} {:>12} {:>12} {:>12}",
        "block", "count", "mean", "std_dev", "min", "max"
    );

    let mut overall: Stats<f64> = Stats::new();
    for (i, input) in signal.chunks(args.block_size * channels).enumerate() {
        let mut block = input.to_vec();
        chain.process_block(&mut block);

        let mut stats: Stats<f64> = Stats::new();
        for &y in &block {
            stats.update(y);
            overall.update(y);
        }
        println!(
            "{:>6} {:>8} {:>12.6} {:>12.6} {:>12.6} {:>12.6}",
            i, stats.count, stats.mean, stats.std_dev, stats.min, stats.max
        );
    }

    if overall.count > 0 {
        println!();
        println!(
            "overall: mean {:.6}, std_dev {:.6}, min {:.6}, max {:.6}",
            overall.mean, overall.std_dev, overall.min, overall.max
        );
    }

    Ok(())
}
