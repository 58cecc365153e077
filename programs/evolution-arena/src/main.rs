//! Evolution Arena - reference experiment driver
//!
//! Runs the reference evolutionary Prisoner's Dilemma experiment several
//! independent times and prints the final population of each trial.

mod experiment;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::experiment::Experiment;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let experiment = Experiment::reference();
    info!(
        trials = experiment.trials,
        agents = experiment.initial.total(),
        generations = experiment.generations,
        rounds = experiment.rounds_per_generation,
        target_size = experiment.target_size,
        "Running reference experiment"
    );

    for (trial, summary) in experiment.run()?.into_iter().enumerate() {
        info!(trial, random_pcts = ?summary.random_uniform_pcts, "Trial finished");
        println!("{}", summary);
    }

    Ok(())
}
