//! Fractal Monte-Carlo swarm search: a population of walkers explores a
//! state space under a user-supplied [`Environment`] and [`Policy`],
//! balancing exploration against a reward signal via cloning.

pub mod callback;
pub mod compose;
pub mod config;
pub mod critic;
pub mod env;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod policy;
pub mod table;
pub mod walker;

pub use callback::{Callback, CallbackSet};
pub use compose::FmcComposer;
pub use config::SwarmConfig;
pub use critic::Critic;
pub use env::{Environment, ResetBatch, TransitionBatch};
pub use error::SwarmError;
pub use orchestrator::{BestRecord, RunOutcome, SwarmOrchestrator};
pub use policy::Policy;
pub use table::StateTable;

/// reward emitted by an [`Environment`] for a single walker transition
pub type Reward = f32;
/// scalar score used internally for distances, virtual rewards, clone probabilities
pub type Score = f64;
/// a value in `[0, 1]` used for sampling decisions
pub type Probability = f64;

/// clone probabilities are clipped to this value before sampling, so a
/// walker whose companion dominates it completely still clones with near
/// certainty rather than exactly `1.0`
pub const CLONE_PROB_CLIP: Probability = 1.1;

/// floor applied to a [`Critic`]'s score before it multiplies a virtual
/// reward, so a critic that returns zero or a negative value can never kill
/// a walker's reward outright
pub const SCORE_MIN_POSITIVE: Score = Score::MIN_POSITIVE;

#[cfg(feature = "cli")]
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// true once a Ctrl-C has been received by a handler installed via [`init`]
#[cfg(feature = "cli")]
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::SeqCst)
}

/// initialize logging to both stderr and a timestamped file under `logs/`,
/// and install a Ctrl-C handler that requests graceful shutdown on the first
/// signal and force-exits on the second
#[cfg(feature = "cli")]
pub fn init() {
    use std::sync::atomic::Ordering;

    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");

    ctrlc::set_handler(move || {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            log::warn!("forcing exit");
            std::process::exit(130);
        }
        log::warn!("interrupt received, stopping after current epoch");
    })
    .expect("install ctrl-c handler");
}
