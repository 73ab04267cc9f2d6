use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

use kessler_lib::{
    ingest,
    model::Model,
    output::CsvSink,
    scenario::Config,
};

#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Scenario configuration toml file.
    ///
    /// The nominal scenario is used when not provided.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override the scenario's PRNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory the positions/collisions/injections CSVs are written to.
    #[arg(long, default_value = "out")]
    output_dir: PathBuf,

    /// Cleaned catalog CSV, as produced by the data-cleaning pipeline
    /// (LEO-filtered, meters and degrees).
    catalog: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let intr = interruptor::Interruptor::new();
    let intr_clone = intr.clone();
    ctrlc::set_handler(move || {
        if intr_clone.is_set() {
            let exit_code = if cfg!(target_family = "unix") {
                // 128 (fatal error signal "n") + 2 (control-c is fatal error signal 2)
                130
            } else {
                // Windows code 3221225786
                // -1073741510 == C000013A
                -1073741510
            };
            std::process::exit(exit_code);
        } else {
            intr_clone.set();
        }
    })?;

    let mut config = match &opts.scenario {
        Some(path) => {
            info!(scenario = %path.display(), "loading scenario");
            Config::load(path)
        }
        None => {
            info!("using nominal scenario");
            Config::nominal()
        }
    };
    if let Some(seed) = opts.seed {
        config.seed = seed;
    }

    let shells = config.shell_index();
    let catalog = BufReader::new(File::open(&opts.catalog)?);
    let population = ingest::bodies_from_csv(catalog, &shells)?;
    info!(
        bodies = population.len(),
        catalog = %opts.catalog.display(),
        "catalog ingested"
    );

    let mut sink = CsvSink::create(&opts.output_dir)?;
    let mut model = Model::new(population, &config);
    model.initialize_to_epoch();

    model.run_with(&mut sink, || intr.is_set())?;
    sink.flush()?;

    println!("Stopped at\n{:#?}", model.sim_info());

    Ok(())
}

mod interruptor {
    use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    #[repr(transparent)]
    pub struct Interruptor(Arc<AtomicBool>);

    impl Interruptor {
        pub fn new() -> Self {
            Interruptor(Arc::new(AtomicBool::new(false)))
        }

        pub fn set(&self) {
            self.0.store(true, SeqCst);
        }

        pub fn is_set(&self) -> bool {
            self.0.load(SeqCst)
        }
    }

    impl Default for Interruptor {
        fn default() -> Self {
            Self::new()
        }
    }
}
