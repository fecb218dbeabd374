//! Side-scrolling brawler -- headless round runner.
//!
//! Architecture: one thread, one fixed-cadence loop (`driver::FrameLoop`).
//! Each tick the loop drains input, steps the `World` through its fixed
//! component order and hands a backend-neutral `FrameView` to a presenter:
//!
//!   1. input edges -> `TickIntent` (key bindings from the menu choices)
//!   2. physics, animation, combat, spawning, camera, phase sequencing
//!   3. `render::build_frame` -> `Presenter::present`
//!   4. sleep off the remainder of the tick
//!
//! Two clocks are kept apart: the logical tick counter drives animation
//! cadence, the wall clock drives the phase countdown, hurt expiry and the
//! transition hold. Runs are driven by a replay file, either in real time or
//! on a simulated clock as fast as possible.
//!
//! Round end appends `"<name> <score>"` to the score store and prints the
//! leaderboard. Quitting mid-round saves a resumable snapshot when `--state`
//! is given.

mod ai;
mod animation;
mod camera;
mod choices;
mod combat;
mod config;
mod driver;
mod entity;
mod phase;
mod physics;
mod render;
mod replay;
mod scores;
mod snapshot;
mod spawn;
mod world;

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use brawl_core::time::{Clock, ManualClock, SystemClock};
use clap::Parser;

use animation::SheetRegistry;
use choices::{load_choices_from_path, PlayerChoices};
use config::{load_config_from_path, GameConfig};
use driver::{FrameLoop, LoopExit, Presenter};
use render::FrameView;
use replay::{load_replay_from_path, ReplayInput, ReplaySequence};
use scores::{append_score, load_scores, sort_leaderboard, PlayerName};
use snapshot::{load_snapshot, save_snapshot, WorldSnapshot};
use world::World;

#[derive(Parser)]
#[command(name = "brawl_game")]
#[command(about = "Run a brawler round from a replay of key events")]
struct Args {
    /// Replay JSON driving the player's keys
    replay: PathBuf,
    /// Round tuning JSON (built-in tuning when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Menu selections file (appearance and input scheme)
    #[arg(long, default_value = "menu/choices.txt")]
    choices: PathBuf,
    /// Extra sprite-sheet set JSON; may be repeated
    #[arg(long = "sheets")]
    sheets: Vec<PathBuf>,
    /// Pace ticks on the wall clock instead of simulating time
    #[arg(long)]
    realtime: bool,
    /// Name recorded with the final score
    #[arg(long, default_value = "PLAYER")]
    name: String,
    /// Score store appended to at round end
    #[arg(long, default_value = "score.txt")]
    scores: PathBuf,
    /// Snapshot to resume from and to save to on quit
    #[arg(long)]
    state: Option<PathBuf>,
    /// Seed for spawn positions and enemy patrol
    #[arg(long)]
    seed: Option<u64>,
}

/// Logs frames instead of drawing them.
#[derive(Default)]
struct LogPresenter {
    banner: Option<String>,
}

impl Presenter for LogPresenter {
    fn present(&mut self, frame: &FrameView) {
        log::trace!(
            "frame {} cam=({}, {}) bg={:?} sprites={} timer={} {}",
            frame.tick,
            frame.camera.origin.x,
            frame.camera.origin.y,
            frame.background_src,
            frame.sprites.len(),
            frame.timer_text,
            frame.score_text
        );
        for sprite in &frame.sprites {
            log::trace!(
                "  {} {}#{} src={:?} dst={:?} mirrored={}",
                sprite.sheet_id,
                sprite.clip,
                sprite.frame_index,
                sprite.src,
                sprite.dst,
                sprite.mirrored
            );
        }
        if let Some(fade) = &frame.fade {
            log::trace!("  fade alpha={}", fade.alpha);
        }
        let banner = frame.fade.as_ref().and_then(|fade| fade.banner.clone());
        if banner != self.banner {
            if let Some(text) = &banner {
                log::info!("Banner: {}", text);
            }
            self.banner = banner;
        }
    }
}

struct RoundSetup<'a> {
    config: GameConfig,
    sheets: &'a SheetRegistry,
    choices: PlayerChoices,
    replay: &'a ReplaySequence,
    resume: Option<WorldSnapshot>,
    seed: u64,
}

fn run_round<C: Clock>(setup: RoundSetup<'_>, clock: C) -> Result<(LoopExit, WorldSnapshot), String> {
    let tick_ms = setup.replay.tick_ms.unwrap_or(setup.config.frame.tick_ms);
    let now = clock.now_ms();
    let mut world = World::new(
        setup.config,
        setup.sheets,
        setup.choices.appearance.sheet_id(),
        setup.seed,
        now,
    )?;
    if let Some(snapshot) = &setup.resume {
        world.restore(snapshot, now)?;
    }

    let mut driver = FrameLoop::new(world, setup.choices.input_scheme.bindings(), tick_ms, clock);
    let mut input = ReplayInput::new(setup.replay);
    let mut presenter = LogPresenter::default();
    let exit = driver.run(&mut input, &mut presenter);
    Ok((exit, WorldSnapshot::capture(&driver.world)))
}

fn run(args: &Args) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => GameConfig::default(),
    };
    let replay = load_replay_from_path(&args.replay)?;
    let choices = load_choices_from_path(&args.choices)?;
    let name = PlayerName::new(&args.name)?;

    let mut sheets = SheetRegistry::with_builtin();
    for path in &args.sheets {
        sheets.load_file(path)?;
    }

    let resume = match &args.state {
        Some(path) if path.exists() => Some(load_snapshot(path)?),
        _ => None,
    };
    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });

    let setup = RoundSetup {
        config,
        sheets: &sheets,
        choices,
        replay: &replay,
        resume,
        seed,
    };
    let (exit, snapshot) = if args.realtime {
        run_round(setup, SystemClock::new())?
    } else {
        run_round(setup, ManualClock::new(0))?
    };

    match exit {
        LoopExit::Quit => {
            if let Some(path) = &args.state {
                save_snapshot(path, &snapshot)?;
            }
        }
        LoopExit::RoundOver(result) => {
            log::info!(
                "Round over: score {} after {} phase(s), {} ticks",
                result.score,
                result.phases_played,
                result.ticks
            );
            append_score(&args.scores, &name, result.score)?;
            if let Some(path) = &args.state {
                if path.exists() {
                    fs::remove_file(path)
                        .map_err(|e| format!("Failed to remove {}: {e}", path.display()))?;
                }
            }
            print_leaderboard(&args.scores)?;
        }
    }
    Ok(())
}

fn print_leaderboard(path: &std::path::Path) -> Result<(), String> {
    let mut entries = load_scores(path, scores::DEFAULT_LOAD_LIMIT)?;
    sort_leaderboard(&mut entries);
    println!("=== LEADERBOARD ===");
    for (rank, entry) in entries.iter().take(scores::LEADERBOARD_SIZE).enumerate() {
        println!("{:>2}. {:<15} {}", rank + 1, entry.name, entry.score);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Brawler starting...");

    let args = Args::parse();
    if let Err(err) = run(&args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
