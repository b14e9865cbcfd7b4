use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gameai::config::GameConfig;
use gameai::game::{Session, SpriteMasks};
use gameai::render::FrameRenderer;
use gameai::rl::flappy::FlappyBirdEnv;
use gameai::rl::runner::{run_episodes, Policy, RunOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Idle,
    Random,
    Hover,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Run Flappy Bird episodes with a scripted policy", long_about = None)]
struct Args {
    /// Number of episodes to play
    #[arg(short, long, default_value = "1")]
    iter: usize,

    /// Log every episode's iteration and score at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Headless mode: no frames, no frame pacing
    #[arg(short, long)]
    daemon: bool,

    /// Seed for pipe generation and the random policy
    #[arg(short, long)]
    seed: Option<u64>,

    /// Path to config file, created with defaults if missing
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input policy
    #[arg(short, long, value_enum, default_value = "hover")]
    policy: PolicyArg,

    /// Flap probability for the random policy
    #[arg(long, default_value = "0.1", value_parser = parse_probability)]
    flap_prob: f64,

    /// Cut episodes short after this many ticks
    #[arg(short, long)]
    max_steps: Option<u64>,

    /// Save the last rendered frame as a PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Directory with sprite PNGs for the hit masks
    #[arg(long)]
    sprites: Option<PathBuf>,

    /// Bird sprite prefix inside the sprite directory
    #[arg(long, default_value = "yellowbird")]
    bird: String,

    /// Pipe sprite suffix inside the sprite directory
    #[arg(long, default_value = "green")]
    pipe: String,
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{} is not a probability in [0, 1]", s))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        if config_path.exists() {
            GameConfig::load(config_path)
                .with_context(|| format!("Failed to load config {}", config_path.display()))?
        } else {
            let config = GameConfig::default();
            config.save(config_path)?;
            tracing::info!("Wrote default config to {}", config_path.display());
            config
        }
    } else {
        GameConfig::default()
    };

    // Override config with command line args
    if args.daemon {
        config.daemon = true;
    }

    let masks = match &args.sprites {
        Some(dir) => SpriteMasks::load_dir(dir, &args.bird, &args.pipe)
            .with_context(|| format!("Failed to load sprites from {}", dir.display()))?,
        None => SpriteMasks::default(),
    };
    let masks = Arc::new(masks);

    let (game_rng, mut policy_rng) = match args.seed {
        Some(seed) => (
            StdRng::seed_from_u64(seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        ),
        None => (StdRng::from_entropy(), StdRng::from_entropy()),
    };

    let session = Session::new(config.clone(), Arc::clone(&masks), game_rng)?;
    let mut env = FlappyBirdEnv::from_session(session);
    if !config.daemon {
        env = env.with_presenter(Box::new(FrameRenderer::new(config.clone(), masks)));
    } else if args.snapshot.is_some() {
        tracing::warn!("No frames are rendered in daemon mode; --snapshot is ignored");
    }

    let policy = match args.policy {
        PolicyArg::Idle => Policy::Idle,
        PolicyArg::Random => Policy::random(args.flap_prob)?,
        PolicyArg::Hover => Policy::Hover,
    };

    let options = RunOptions {
        episodes: args.iter,
        max_steps: args.max_steps,
        frame_time: (!config.daemon && config.fps > 0)
            .then(|| Duration::from_secs_f64(1.0 / config.fps as f64)),
    };

    tracing::info!(
        "Running {} episode(s) with {:?} policy (daemon: {})",
        options.episodes,
        policy,
        config.daemon
    );
    let summary = run_episodes(&mut env, policy, &mut policy_rng, &options)?;

    if let (Some(path), Some(frame)) = (&args.snapshot, &summary.last_observation) {
        frame.save_png(path)?;
        println!("Snapshot saved at {:?}", path);
    }

    println!(
        "Episodes: {}, Best score: {}, Mean score: {:.2}",
        summary.episodes.len(),
        summary.best_score(),
        summary.mean_score()
    );

    Ok(())
}
