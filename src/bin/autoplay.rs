use candy_cascade::board::{Board, Palette};
use candy_cascade::cascade::{Cascade, MoveOutcome};
use candy_cascade::config::EngineConfig;
use candy_cascade::hints::{choose_move_first, choose_move_lowest, choose_move_max_clear};
use clap::Parser;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

type StrategyFn = fn(&Board) -> Option<(usize, usize)>;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compares move strategies on seeded boards", long_about = None)]
struct Args {
    /// Number of seeded boards to play
    #[clap(short, long, default_value_t = 20)]
    boards: u64,

    /// Moves played per board
    #[clap(short, long, default_value_t = 30)]
    moves: u32,

    /// Board side length
    #[clap(long, default_value_t = 8)]
    side: usize,

    /// Number of colors (1-6)
    #[clap(long, default_value_t = 6)]
    colors: usize,

    /// Seed of the first board; board `i` uses `seed + i`
    #[clap(long, default_value_t = 0)]
    seed: u64,
}

fn first(board: &Board) -> Option<(usize, usize)> {
    choose_move_first(board)
}

fn max_clear(board: &Board) -> Option<(usize, usize)> {
    choose_move_max_clear(board).map(|(_, mv)| mv)
}

fn lowest(board: &Board) -> Option<(usize, usize)> {
    choose_move_lowest(board).map(|(_, mv)| mv)
}

/// Plays up to `moves` moves with `strategy`, resolving every cascade.
/// Returns the final score and the number of moves made.
fn play(config: &EngineConfig, strategy: StrategyFn, moves: u32) -> Result<(u32, u32), String> {
    let mut game = Cascade::new(config).map_err(|e| e.to_string())?;
    while game.is_busy() {
        game.resolve_tick();
    }
    // The opening cascade is not the strategy's doing.
    let opening_score = game.score();

    for _ in 0..moves {
        let Some((a, b)) = strategy(game.board()) else {
            break;
        };
        match game.commit_move(a, b).map_err(|e| e.to_string())? {
            MoveOutcome::Applied => {}
            other => return Err(format!("strategy chose {:?}, got {:?}", (a, b), other)),
        }
        while game.is_busy() {
            game.resolve_tick();
        }
    }
    Ok((game.score() - opening_score, game.moves()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let strategies: Vec<(&str, StrategyFn)> =
        vec![("FIRST", first), ("MIC", max_clear), ("LMP", lowest)];
    let palette = match Palette::first(args.colors) {
        Ok(palette) => palette,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let mut all_scores: HashMap<&str, Vec<u32>> = HashMap::new();

    println!("Starting strategy evaluation for {} boards...", args.boards);

    for board_idx in 0..args.boards {
        let config = EngineConfig {
            side: args.side,
            palette: palette.tiles().to_vec(),
            seed: Some(args.seed + board_idx),
            tick_interval_ms: 0,
            ..EngineConfig::default()
        };
        if let Err(e) = config.validate() {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }

        println!(
            "\nEvaluating Board {} (Seed: {})",
            board_idx,
            args.seed + board_idx
        );

        for (strategy_name, strategy_fn) in &strategies {
            match play(&config, *strategy_fn, args.moves) {
                Ok((score, moves)) => {
                    println!(
                        "  Strategy: {:<6}, Score: {:<6}, Moves: {}",
                        strategy_name, score, moves
                    );
                    all_scores.entry(*strategy_name).or_default().push(score);
                }
                Err(e) => eprintln!(
                    "Error: strategy {} failed on board {}: {}",
                    strategy_name, board_idx, e
                ),
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("\n--- Average Scores ---");

    let mut sorted_avg_scores: Vec<(&str, f64)> = all_scores
        .iter()
        .filter(|(_, scores)| !scores.is_empty())
        .map(|(name, scores)| {
            let total: u32 = scores.iter().sum();
            (*name, total as f64 / scores.len() as f64)
        })
        .collect();
    sorted_avg_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    for (strategy_name, avg_score) in sorted_avg_scores {
        println!("Strategy {:<6}: Average Score = {:.2}", strategy_name, avg_score);
    }
}
