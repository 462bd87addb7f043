//! Ad hoc CLI entry point for running a toy swarm against one of the
//! built-in scenario environments (§10.2).

use clap::{Parser, ValueEnum};

use fractal_swarm::config::SwarmConfig;
use fractal_swarm::env::bandit::TwoArmBanditEnv;
use fractal_swarm::env::constant::ConstantRewardEnv;
use fractal_swarm::env::rastrigin::rastrigin_2d;
use fractal_swarm::orchestrator::{RunOutcome, SwarmOrchestrator};
use fractal_swarm::policy::{ContinuousNormal, DiscreteUniform};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    Constant,
    Bandit,
    Rastrigin,
}

#[derive(Debug, Parser)]
#[command(name = "explore", about = "Run a toy Fractal Monte-Carlo swarm")]
struct Cli {
    #[arg(value_enum)]
    scenario: Scenario,

    #[arg(long, default_value_t = 64)]
    walkers: usize,

    #[arg(long, default_value_t = 100)]
    max_epochs: usize,

    #[arg(long, default_value_t = 1.0)]
    reward_scale: f32,

    #[arg(long, default_value_t = 1.0)]
    dist_scale: f32,

    #[arg(long)]
    minimize: bool,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    n_workers: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    fractal_swarm::init();
    let cli = Cli::parse();

    let config = SwarmConfig {
        walkers: cli.walkers,
        max_epochs: cli.max_epochs,
        reward_scale: cli.reward_scale,
        dist_scale: cli.dist_scale,
        minimize: cli.minimize,
        accumulate_rewards: true,
        n_workers: cli.n_workers,
        seed: cli.seed,
        pin_best: true,
    };

    match cli.scenario {
        Scenario::Constant => {
            let env = ConstantRewardEnv { reward: 1.0 };
            let policy = Box::new(DiscreteUniform::new(1));
            run(env, policy, config)?;
        }
        Scenario::Bandit => {
            let env = TwoArmBanditEnv;
            let policy = Box::new(DiscreteUniform::new(2));
            run(env, policy, config)?;
        }
        Scenario::Rastrigin => {
            let env = rastrigin_2d(0.5);
            let policy = Box::new(ContinuousNormal::new(0.5, vec![-0.5; 2], vec![0.5; 2]));
            run(env, policy, config)?;
        }
    }
    Ok(())
}

fn run<E>(env: E, policy: Box<dyn fractal_swarm::Policy<E>>, config: SwarmConfig) -> anyhow::Result<()>
where
    E: fractal_swarm::Environment + Clone + 'static,
    E::Action: Default,
    E::State: std::fmt::Debug,
{
    let mut orchestrator = SwarmOrchestrator::new(env, policy, None, config)?;
    orchestrator.reset()?;
    match orchestrator.run()? {
        RunOutcome::Completed { epochs, best } => {
            log::info!("completed after {epochs} epochs, best = {best:?}");
            if let Some(best) = best {
                println!("{:?} (reward={:.4})", best.state, best.reward);
            }
        }
        RunOutcome::Cancelled { epochs, best } => {
            log::warn!("cancelled after {epochs} epochs, best = {best:?}");
        }
    }
    Ok(())
}
