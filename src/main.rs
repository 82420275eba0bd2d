use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};

use tilt_2048::config::Config;
use tilt_2048::engine::{Direction, Game};
use tilt_2048::snapshot::{self, Snapshot};

#[derive(Debug, Parser)]
#[command(
    name = "tilt-2048",
    version,
    about = "Play a sliding-merge tile puzzle with scripted or random moves"
)]
struct Args {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Board size (overrides the config file)
    #[arg(long)]
    size: Option<usize>,
    /// RNG seed for spawns and the random policy (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
    /// Start from a JSON snapshot instead of an empty board
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,
    /// Scripted moves, one letter each: N/E/S/W (or U/R/D/L)
    #[arg(long)]
    moves: Option<String>,
    /// Write the final state as a JSON snapshot
    #[arg(long, value_name = "FILE")]
    dump: Option<PathBuf>,
    /// Only print the final board
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_toml(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(size) = args.size {
        config.board.size = size;
    }
    if let Some(seed) = args.seed {
        config.play.seed = Some(seed);
    }
    config.validate()?;

    let script = match &args.moves {
        Some(moves) => Some(parse_moves(moves)?),
        None => None,
    };

    let mut rng = match config.play.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut game = match &args.snapshot {
        Some(path) => snapshot::read_json_from_path(path)
            .and_then(Snapshot::into_game)
            .with_context(|| format!("failed to load snapshot {}", path.display()))?,
        None => {
            let mut game = Game::with_max_piece(config.board.size, config.board.max_piece);
            for _ in 0..config.play.start_tiles {
                game.add_random_tile(&mut rng);
            }
            game
        }
    };
    game.set_parallel_lines(config.play.parallel_lines);
    info!(
        "starting {0}x{0} game, max piece {1}",
        game.size(),
        game.max_piece()
    );
    if !args.quiet {
        print!("{game}");
    }

    let mut move_count: u64 = 0;
    let mut scripted = script.unwrap_or_default().into_iter();
    while !game.game_over() && move_count < config.play.max_moves {
        let moved = if args.moves.is_some() {
            let Some(dir) = scripted.next() else { break };
            let changed = game.tilt(dir);
            if !changed {
                debug!("scripted move {dir} changed nothing");
            }
            changed.then_some(dir)
        } else {
            random_move(&mut game, &mut rng)
        };
        move_count += 1;
        let Some(dir) = moved else {
            if args.moves.is_none() {
                warn!("no direction changes the board");
                break;
            }
            continue;
        };
        if game.add_random_tile(&mut rng).is_none() {
            debug!("board full after {dir}");
        }
        if !args.quiet {
            println!("{dir}:");
            print!("{game}");
        }
    }

    println!(
        "Moves: {} | score: {} | max score: {} | highest tile: {} | over: {}",
        move_count,
        game.score(),
        game.max_score(),
        game.grid().highest_tile(),
        game.is_over()
    );
    if args.quiet {
        print!("{game}");
    }

    if let Some(path) = args.dump {
        snapshot::write_json_to_path(&path, &Snapshot::from_game(&game))
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    }
    Ok(())
}

fn parse_moves(moves: &str) -> anyhow::Result<Vec<Direction>> {
    let mut out = Vec::with_capacity(moves.len());
    for (idx, c) in moves.chars().filter(|c| !c.is_whitespace()).enumerate() {
        match Direction::from_code(c) {
            Some(dir) => out.push(dir),
            None => bail!("invalid move {c:?} at position {idx}"),
        }
    }
    Ok(out)
}

/// Tilt toward a random direction that changes the board, if any does.
fn random_move(game: &mut Game, rng: &mut StdRng) -> Option<Direction> {
    let mut dirs = Direction::ALL;
    dirs.shuffle(rng);
    dirs.into_iter().find(|&dir| game.tilt(dir))
}
