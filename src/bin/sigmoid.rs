//! sigmoid: evaluate the logistic function on an encrypted integer.
//!
//! Encrypts the input under BFV, evaluates the degree-7 Taylor series
//! homomorphically, decrypts and prints the integer and decimal results.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use clap::Parser;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use toy_bfv_sigmoid::sigmoid::{
    RING_DEGREE, SigmoidConfig, SigmoidEvaluator, decimal_window,
};

#[derive(Parser)]
#[command(name = "sigmoid")]
#[command(about = "Homomorphic sigmoid approximation over BFV")]
#[command(version)]
struct Args {
    /// Integer input; values above t/2 stand for negatives (t - k is -k)
    #[arg(default_value_t = 2)]
    input: u64,

    /// Random seed for deterministic key generation (optional)
    #[arg(long)]
    seed: Option<u64>,

    /// Run the sigmoid(0) self-test before evaluating
    #[arg(long)]
    self_test: bool,

    /// Log every evaluation stage with its noise budget
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    #[cfg(feature = "dhat-heap")]
    let _dhat = dhat::Profiler::new_heap();

    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = SigmoidConfig::default();
    if let Some(seed) = args.seed {
        config = config.seed(seed);
    }

    let evaluator = SigmoidEvaluator::<RING_DEGREE>::new(&config)?;
    info!(
        plain_modulus = evaluator.context().plain_modulus(),
        window = decimal_window(evaluator.context().plain_modulus()),
        "decimal results are exact within +/- window"
    );

    if args.self_test {
        evaluator.self_test()?;
        info!("self-test passed");
    }

    let output = evaluator.run(args.input)?;
    println!("Decrypted result (integer): {}", output.integer);
    println!("Decrypted result (decimal): {}", output.decimal);
    Ok(())
}
