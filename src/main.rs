use std::{
    error::Error,
    io::{prelude::*, stdin},
    time::Instant,
};

use clap::{Parser, Subcommand};
use kestrel_lib::{
    error::{EngineError, EngineResult},
    evaluate::evaluate,
    game::Game,
    options::{SearchOptions, MAX_DEPTH, TIME_LIMIT_MS, TT_SIZE_MB},
    search::Search,
    transposition_table::EvictionPolicy,
};
use log::{info, warn};

mod uci;

// depth cap when the clock alone decides how long to think
const UCI_MAX_DEPTH: usize = 64;

const BENCH_FENS: [&str; 4] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP1B1PPP/R2QKB1R w KQ - 0 8",
];

#[derive(Parser)]
#[command(name = "kestrel", version, about = "Alpha-beta chess engine with a time budget")]
struct Args {
    /// Transposition table size in MB
    #[arg(long, global = true, default_value_t = TT_SIZE_MB)]
    hash: usize,

    /// Transposition table replacement when full: Oldest or ShallowestOfOldest
    #[arg(long, global = true, default_value_t = EvictionPolicy::default())]
    eviction: EvictionPolicy,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Speak UCI on stdin and stdout (the default)
    Uci,
    /// Search a single position and print the best move
    Bestmove {
        /// Position to search, the start position if omitted
        #[arg(long)]
        fen: Option<String>,

        /// Maximum search depth
        #[arg(short, long, default_value_t = MAX_DEPTH)]
        depth: usize,

        /// Time budget in milliseconds
        #[arg(short, long, default_value_t = TIME_LIMIT_MS)]
        time_ms: u64,
    },
    /// Print the static evaluation of a position, white's point of view
    Eval {
        #[arg(long)]
        fen: Option<String>,
    },
    /// Fixed-depth search over a few positions, reports nodes per second
    Bench {
        #[arg(short, long, default_value_t = 5)]
        depth: usize,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let options = SearchOptions::default()
        .tt_size_mb(args.hash)
        .eviction(args.eviction);

    match args.command.unwrap_or(Command::Uci) {
        Command::Uci => uci_loop(options),
        Command::Bestmove {
            fen,
            depth,
            time_ms,
        } => {
            let mut game = load(fen.as_deref())?;
            let options = options.max_depth(depth).time_limit_ms(time_ms).output(true);
            let result = Search::new(options).go(&mut game)?;
            println!("bestmove {}", result.best_move);
            Ok(())
        }
        Command::Eval { fen } => {
            let game = load(fen.as_deref())?;
            println!("{}", evaluate(&game));
            Ok(())
        }
        Command::Bench { depth } => bench(options, depth),
    }
}

fn load(fen: Option<&str>) -> EngineResult<Game> {
    fen.map_or_else(|| Ok(Game::new()), Game::from_fen)
}

fn set_position(fen: Option<&str>, moves: &[String]) -> EngineResult<Game> {
    let mut game = load(fen)?;
    for uci in moves {
        let mv = game.parse_move(uci)?;
        game.apply(&mv)?;
    }
    Ok(game)
}

fn bench(options: SearchOptions, depth: usize) -> Result<(), Box<dyn Error>> {
    let mut search = Search::new(options);
    let mut nodes = 0;

    let start = Instant::now();
    for fen in BENCH_FENS {
        let mut game = Game::from_fen(fen)?;
        let result = search.find_best_move(&mut game, depth, u64::MAX)?;
        info!("{fen}: {} at depth {}", result.best_move, result.depth);
        nodes += result.stats.nodes + result.stats.qnodes;
    }
    let time = start.elapsed();

    let nps = (nodes as f64 / time.as_secs_f64()) as u64;
    println!("{nodes} nodes {nps} nps");
    Ok(())
}

fn uci_loop(options: SearchOptions) -> Result<(), Box<dyn Error>> {
    let mut search = Search::new(options.output(true));
    let mut game = Game::new();

    for line in stdin().lock().lines() {
        let cmd = match uci::parse_uci_command(line?) {
            Ok(cmd) => cmd,
            Err(uci::UciParseError::Empty) => {
                continue;
            }
            Err(uci::UciParseError::Other(e)) => {
                eprintln!("{e}");
                continue;
            }
        };

        match cmd {
            uci::UciCommand::Uci => {
                println!("id name Kestrel");
                println!("id author the Kestrel developers");
                uci::print_uci_options(
                    search.options().tt_size_mb,
                    search.options().quiescence_depth,
                    search.options().eviction,
                );
                println!("uciok");
            }
            uci::UciCommand::IsReady => println!("readyok"),
            uci::UciCommand::SetOption(opt) => match opt {
                uci::UciOption::Hash(mb) => search.set_tt_size_mb(mb),
                uci::UciOption::QuiescenceDepth(depth) => search.set_quiescence_depth(depth),
                uci::UciOption::Eviction(policy) => search.set_eviction(policy),
            },
            uci::UciCommand::UciNewGame => game = Game::new(),
            uci::UciCommand::Position { fen, moves } => {
                match set_position(fen.as_deref(), &moves) {
                    Ok(position) => game = position,
                    Err(e) => warn!("position rejected: {e}"),
                }
            }
            uci::UciCommand::Go(params) => {
                let time_ms = params.time_budget_ms(game.side_to_move());
                let depth = params.depth.unwrap_or(match time_ms {
                    Some(_) => UCI_MAX_DEPTH,
                    None => options.max_depth,
                });
                let time_ms = time_ms.unwrap_or(match params.depth {
                    Some(_) => u64::MAX,
                    None => options.time_limit_ms,
                });

                match search.find_best_move(&mut game, depth, time_ms) {
                    Ok(result) => println!("bestmove {}", result.best_move),
                    Err(EngineError::NoLegalMoves) => println!("bestmove 0000"),
                    Err(e) => eprintln!("{e}"),
                }
            }
            uci::UciCommand::Eval => println!("{}", evaluate(&game)),
            uci::UciCommand::Quit => break,
        }
    }
    Ok(())
}
