//! Command-line front end: search a position or count perft nodes.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use chess_core::{FenFields, Move};
use chess_engine::{perft, perft_divide, Board};
use chess_search::{SearchConfig, SearchResult, Searcher, StandardEvaluator};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-cli")]
#[command(about = "Search chess positions and count perft nodes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the best move for the side to move
    Search {
        /// Position in FEN; defaults to the starting position
        #[arg(long, default_value = FenFields::STARTPOS)]
        fen: String,
        /// Moves in coordinate notation played from the position before searching
        #[arg(long, num_args = 1..)]
        moves: Vec<String>,
        /// TOML search configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Final search depth in plies
        #[arg(short, long)]
        depth: Option<u8>,
        /// Wall-clock budget in milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,
        /// Transposition cache size in positions
        #[arg(long)]
        cache_capacity: Option<usize>,
        /// Plain alpha-beta instead of null-window probing
        #[arg(long)]
        no_null_window: bool,
        /// Count material at quiet leaves, not only after captures
        #[arg(long)]
        count_material: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count leaf nodes of the legal move tree
    Perft {
        #[arg(long, default_value = FenFields::STARTPOS)]
        fen: String,
        #[arg(short, long, default_value = "4")]
        depth: u32,
        /// Print the count below each root move
        #[arg(long)]
        divide: bool,
    },
}

/// Flag overrides layered over the configuration file.
struct Overrides {
    depth: Option<u8>,
    time_limit_ms: Option<u64>,
    cache_capacity: Option<usize>,
    no_null_window: bool,
}

#[derive(Serialize)]
struct SearchJson<'a> {
    fen: &'a str,
    best_move: Option<String>,
    score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    mate_in: Option<i32>,
    depth: u8,
    pv: Vec<String>,
    nodes: u64,
    cache_hits: u64,
    cache_misses: u64,
    cutoffs: u64,
    re_searches: u64,
    evictions: u64,
    elapsed_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Search {
            fen,
            moves,
            config,
            depth,
            time_limit_ms,
            cache_capacity,
            no_null_window,
            count_material,
            json,
        } => {
            let overrides = Overrides {
                depth,
                time_limit_ms,
                cache_capacity,
                no_null_window,
            };
            let config = build_config(config.as_deref(), overrides)?;
            let mut board = Board::from_fen(&fen).context("invalid --fen")?;
            apply_moves(&mut board, &moves)?;
            let fen = board.to_fen();
            tracing::info!(%fen, depth = config.depth, "searching");

            let started = Instant::now();
            let color = board.side_to_move();
            let evaluator = if count_material {
                StandardEvaluator::counting_material(StandardEvaluator::DEFAULT_CAPTURE_SCALE)
            } else {
                StandardEvaluator::default()
            };
            let result =
                Searcher::with_evaluator(config, evaluator).find_best_move(&mut board, color)?;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            if json {
                println!("{}", serde_json::to_string_pretty(&to_json(&fen, &result, elapsed_ms))?);
            } else {
                print_result(&result, elapsed_ms);
            }
        }
        Commands::Perft { fen, depth, divide } => {
            let mut board = Board::from_fen(&fen).context("invalid --fen")?;
            let started = Instant::now();
            let total = if divide {
                let counts = perft_divide(&mut board, depth);
                for (mv, count) in &counts {
                    println!("{mv}: {count}");
                }
                counts.iter().map(|(_, count)| count).sum::<u64>()
            } else {
                perft(&mut board, depth)
            };
            let elapsed = started.elapsed();
            println!("\nNodes: {total}");
            println!("Time: {} ms", elapsed.as_millis());
        }
    }
    Ok(())
}

/// Loads the configuration file if given, then applies flag overrides and validates.
fn build_config(path: Option<&std::path::Path>, overrides: Overrides) -> anyhow::Result<SearchConfig> {
    let mut config = match path {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };
    if let Some(depth) = overrides.depth {
        config.depth = depth;
    }
    if let Some(ms) = overrides.time_limit_ms {
        config.time_limit_ms = Some(ms);
    }
    if let Some(capacity) = overrides.cache_capacity {
        config.cache_capacity = capacity;
    }
    if overrides.no_null_window {
        config.null_window = false;
    }
    config.validate()?;
    Ok(config)
}

/// Plays coordinate-notation moves on `board`, rejecting any illegal one.
fn apply_moves(board: &mut Board, moves: &[String]) -> anyhow::Result<()> {
    for text in moves {
        let Some(parsed) = Move::from_uci(text) else {
            bail!("malformed move {text:?}");
        };
        let mv = board
            .resolve_move(parsed.from(), parsed.to(), parsed.promotion())
            .with_context(|| format!("cannot play {text} in {}", board.to_fen()))?;
        board
            .make_legal_move(mv)
            .with_context(|| format!("cannot play {text}"))?;
    }
    Ok(())
}

fn to_json<'a>(fen: &'a str, result: &SearchResult, elapsed_ms: u64) -> SearchJson<'a> {
    SearchJson {
        fen,
        best_move: result.best_move.map(Move::to_uci),
        score: result.score,
        mate_in: result.mate_in(),
        depth: result.depth,
        pv: result.principal_variation.iter().map(|m| m.to_uci()).collect(),
        nodes: result.stats.nodes,
        cache_hits: result.stats.cache_hits,
        cache_misses: result.stats.cache_misses,
        cutoffs: result.stats.cutoffs,
        re_searches: result.stats.re_searches,
        evictions: result.stats.evictions,
        elapsed_ms,
    }
}

fn print_result(result: &SearchResult, elapsed_ms: u64) {
    match result.best_move {
        Some(mv) => println!("bestmove {mv}"),
        None => println!("bestmove (none)"),
    }
    match result.mate_in() {
        Some(plies) => println!("score mate {plies} plies"),
        None => println!("score {} cp", result.score),
    }
    let pv: Vec<String> = result.principal_variation.iter().map(|m| m.to_uci()).collect();
    println!("depth {}", result.depth);
    println!("pv {}", pv.join(" "));
    println!(
        "nodes {} hits {} misses {} cutoffs {} re-searches {} evictions {} time {} ms",
        result.stats.nodes,
        result.stats.cache_hits,
        result.stats.cache_misses,
        result.stats.cutoffs,
        result.stats.re_searches,
        result.stats.evictions,
        elapsed_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides() -> Overrides {
        Overrides {
            depth: None,
            time_limit_ms: None,
            cache_capacity: None,
            no_null_window: false,
        }
    }

    #[test]
    fn parses_search_with_overrides() {
        let cli = Cli::try_parse_from([
            "chess-cli",
            "search",
            "--depth",
            "6",
            "--no-null-window",
            "--moves",
            "e2e4",
            "e7e5",
        ])
        .unwrap();
        match cli.command {
            Commands::Search {
                fen,
                moves,
                depth,
                no_null_window,
                count_material,
                json,
                ..
            } => {
                assert!(!count_material);
                assert_eq!(fen, FenFields::STARTPOS);
                assert_eq!(moves, ["e2e4", "e7e5"]);
                assert_eq!(depth, Some(6));
                assert!(no_null_window);
                assert!(!json);
            }
            Commands::Perft { .. } => panic!("expected search"),
        }
    }

    #[test]
    fn parses_count_material() {
        let cli = Cli::try_parse_from(["chess-cli", "search", "--count-material", "--json"]).unwrap();
        let Commands::Search {
            count_material, json, ..
        } = cli.command
        else {
            panic!("expected search");
        };
        assert!(count_material);
        assert!(json);
    }

    #[test]
    fn parses_perft() {
        let cli = Cli::try_parse_from(["chess-cli", "perft", "-d", "3", "--divide"]).unwrap();
        match cli.command {
            Commands::Perft { depth, divide, .. } => {
                assert_eq!(depth, 3);
                assert!(divide);
            }
            Commands::Search { .. } => panic!("expected perft"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = build_config(
            None,
            Overrides {
                depth: Some(2),
                time_limit_ms: Some(500),
                cache_capacity: Some(64),
                no_null_window: true,
            },
        )
        .unwrap();
        assert_eq!(config.depth, 2);
        assert_eq!(config.time_limit_ms, Some(500));
        assert_eq!(config.cache_capacity, 64);
        assert!(!config.null_window);

        assert_eq!(build_config(None, no_overrides()).unwrap(), SearchConfig::default());
    }

    #[test]
    fn invalid_override_rejected() {
        let overrides = Overrides {
            depth: Some(0),
            ..no_overrides()
        };
        assert!(build_config(None, overrides).is_err());
    }

    #[test]
    fn apply_moves_plays_legal_moves() {
        let mut board = Board::startpos();
        apply_moves(&mut board, &["e2e4".to_string(), "e7e5".to_string(), "g1f3".to_string()])
            .unwrap();
        assert_eq!(
            board.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn apply_moves_rejects_bad_input() {
        let mut board = Board::startpos();
        assert!(apply_moves(&mut board, &["e2e5".to_string()]).is_err());
        assert!(apply_moves(&mut board, &["zz".to_string()]).is_err());
        assert_eq!(board, Board::startpos());
    }

    #[test]
    fn json_output_fields() {
        let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let result = Searcher::new(SearchConfig::default().with_depth(2))
            .find_best_move(&mut board, chess_core::Color::White)
            .unwrap();
        let value = serde_json::to_value(to_json("fen", &result, 7)).unwrap();
        assert_eq!(value["best_move"], "a1a8");
        assert_eq!(value["mate_in"], 1);
        assert_eq!(value["elapsed_ms"], 7);
        assert_eq!(value["pv"][0], "a1a8");
    }
}
