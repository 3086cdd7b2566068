//! Runs a small simulation without any UI and prints a summary.
//!
//! ```text
//! RUST_LOG=affectgrid=debug cargo run --example headless_run -- 500
//! ```

use affectgrid::{BriefingExplainer, Explainer, SimConfig, Simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ticks: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 300,
    };

    let mut sim = Simulation::new(SimConfig::default(), 4, 42)?;
    let mut goals = 0;
    for _ in 0..ticks {
        goals += sim.tick().goals_reached;
    }

    let history = sim.reward_history();
    let recent = history.iter().rev().take(50);
    let count = recent.len().max(1);
    let avg = recent.map(|p| p.avg_reward).sum::<f64>() / count as f64;
    info!(ticks, goals, recent_mean_reward = avg, "run finished");

    for view in sim.agent_views() {
        println!("{}", BriefingExplainer.explain(&view, None));
    }

    #[cfg(feature = "serde")]
    {
        let json = sim.to_json()?;
        info!(bytes = json.len(), "snapshot serialized");
    }

    Ok(())
}
