use candy_cascade::board::Palette;
use candy_cascade::cascade::{MoveOutcome, TickStep};
use candy_cascade::config::EngineConfig;
use candy_cascade::driver::TickDriver;
use candy_cascade::hints::{choose_move_first, has_valid_move};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// TOML config file; command-line flags override its values
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Board side length
    #[clap(long)]
    side: Option<usize>,

    /// Number of colors (1-6)
    #[clap(long)]
    colors: Option<usize>,

    /// Seed for a reproducible game
    #[clap(long)]
    seed: Option<u64>,

    /// Delay between cascade steps, in milliseconds
    #[clap(long)]
    tick_ms: Option<u64>,

    /// Start from a board without matches
    #[clap(long)]
    reroll: bool,
}

fn build_config(args: &Args) -> Result<EngineConfig, String> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load_or_default(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    if let Some(side) = args.side {
        config.side = side;
    }
    if let Some(colors) = args.colors {
        let palette = Palette::first(colors).map_err(|e| e.to_string())?;
        config.palette = palette.tiles().to_vec();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    config.reroll_initial_matches |= args.reroll;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Parses `row col row col` into two cell indices.
fn parse_move(input: &str, side: usize) -> Result<(usize, usize), String> {
    let parts: Vec<usize> = input
        .split_whitespace()
        .map(|p| p.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| "Please enter numbers, e.g. '3 4 3 5'.".to_string())?;
    if parts.len() != 4 {
        return Err("Use 'row col row col', 'h', 'n' or 'q'.".to_string());
    }
    if parts.iter().any(|&p| p >= side) {
        return Err(format!("Row and column must be between 0 and {}.", side - 1));
    }
    Ok((parts[0] * side + parts[1], parts[2] * side + parts[3]))
}

fn resolve(driver: &mut TickDriver) {
    driver.run_until_idle(|report| {
        if let TickStep::Cleared { cells, chain } = report.step {
            println!(
                "Cleared {} candies (chain x{}), score {}",
                cells, chain, report.snapshot.score
            );
        }
        println!("{}\n", report.snapshot.board);
    });
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    let mut driver = match TickDriver::from_config(&config) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("Failed to start a game: {}", e);
            std::process::exit(1);
        }
    };
    let side = config.side;
    println!("Welcome to Candy Cascade!");
    resolve(&mut driver);

    loop {
        println!("---------------------");
        println!(
            "Moves: {}, Score: {}",
            driver.cascade().moves(),
            driver.cascade().score()
        );
        println!("{}", driver.cascade().board());

        if !has_valid_move(driver.cascade().board()) {
            println!("No moves left. Final score: {}", driver.cascade().score());
            println!("Enter 'n' for a new board or 'q' to quit.");
        }

        print!(
            "Enter your move (row col row col), 'h' for a hint, \
             'n' for a new board, 'q' to quit: "
        );
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Please try again.");
                continue;
            }
        }

        match input.trim() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "h" => match choose_move_first(driver.cascade().board()) {
                Some((a, b)) => {
                    let board = driver.cascade().board();
                    let (r1, c1) = board.row_col(a);
                    let (r2, c2) = board.row_col(b);
                    println!("Try swapping ({}, {}) with ({}, {}).", r1, c1, r2, c2);
                    println!("{}", board.to_string_with_highlight(Some(a)));
                }
                None => println!("No valid move on this board."),
            },
            "n" => {
                if let Err(e) = driver.new_session() {
                    println!("Could not create a new board: {}", e);
                    continue;
                }
                resolve(&mut driver);
            }
            other => match parse_move(other, side) {
                Ok((a, b)) => match driver.commit_move(a, b) {
                    Ok(MoveOutcome::Applied) => resolve(&mut driver),
                    Ok(_) => {
                        println!("Invalid move: cells must be neighbours and make a line of 3.")
                    }
                    Err(e) => println!("Move refused: {}", e),
                },
                Err(msg) => println!("{}", msg),
            },
        }
    }
}
