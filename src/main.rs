use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use crysgraph::model::symmetry::crystal_system;
use crysgraph::tensor::layout::{CHANNELS, SITE_OFFSET};
use crysgraph::utils::logger;
use crysgraph::{Config, DistanceMetric, Result, TensorEncoder};

#[derive(Parser, Debug)]
#[command(name = "crysgraph")]
#[command(about = "Encode a CIF/POSCAR structure as a 64x64x4 crystal graph tensor")]
struct Args {
    /// Structure file (.cif, or POSCAR/CONTCAR format)
    path: PathBuf,

    /// Apply the calibrated normalization after construction.
    #[arg(long)]
    normalize: bool,

    /// Scale for the distance channel (required for --normalize unless set in config).
    #[arg(long)]
    distance_scale: Option<f64>,

    /// Store fractional rather than Cartesian pair distances.
    #[arg(long)]
    fractional_distance: bool,

    /// Config file (defaults to the OS config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective config back to the OS config directory.
    #[arg(long)]
    save_config: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _ = logger::init(logger::level_for_verbosity(args.verbose));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("crysgraph: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => {
            let (cfg, msg) = Config::load();
            info!("{}", msg);
            cfg
        }
    };

    if let Some(scale) = args.distance_scale {
        config.calibration.length = Some(scale);
    }
    if args.fractional_distance {
        config.distance_metric = DistanceMetric::Fractional;
    }

    if args.save_config {
        let path = config.save()?;
        info!("Config saved to {:?}", path);
    }

    let mut encoder = TensorEncoder::from_file_with_config(&args.path, &config)?;
    if args.normalize {
        encoder.normalize()?;
    }

    print_summary(&encoder);
    Ok(())
}

fn print_summary(encoder: &TensorEncoder) {
    let desc = encoder.descriptor();
    let tensor = encoder.tensor();
    let n = desc.sites.len();

    println!("space group   {} ({})", desc.sg, crystal_system(desc.sg));
    println!(
        "cell          a={:.4} b={:.4} c={:.4}  alpha={:.3} beta={:.3} gamma={:.3}",
        desc.a, desc.b, desc.c, desc.alpha, desc.beta, desc.gamma
    );
    println!("sites         {}", n);
    println!("shape         {:?}", tensor.shape());
    println!("normalized    {}", encoder.is_normalized());
    println!("symmetric     {}", tensor.is_symmetric(0.0));

    // Per-channel range over the populated site block
    let sites = SITE_OFFSET..SITE_OFFSET + n;
    let view = tensor.view();
    let block = view.slice(ndarray::s![sites.clone(), sites, ..]);
    let names = ["distance", "dx", "dy", "dz"];
    for k in 0..CHANNELS {
        let channel = block.index_axis(ndarray::Axis(2), k);
        let min = channel.iter().copied().fold(f64::INFINITY, f64::min);
        let max = channel.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!("{:<13} [{:.5}, {:.5}]", names[k], min, max);
    }
}
