use std::process::ExitCode;
use std::time::Instant;

use chesscore::{Game, START_FEN};
use clap::Parser;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position};

#[derive(Parser, Debug)]
#[command(author, version, about = "Counts move-tree leaves to validate move generation", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,

    #[arg(short, long, default_value_t = 4)]
    depth: u32,

    /// Print leaf counts per root move
    #[arg(long)]
    divide: bool,

    /// Cross-check against shakmaty and fail on any mismatch
    #[arg(long)]
    verify: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    chesscore::init();

    let mut game = match Game::from_fen(&args.fen) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("invalid FEN '{}': {err}", args.fen);
            return ExitCode::FAILURE;
        }
    };

    println!("Running perft on FEN: '{}' at depth {}", args.fen, args.depth);

    let start = Instant::now();
    let nodes = if args.divide && args.depth > 0 {
        let split = game.divide(args.depth);
        for (mv, count) in &split {
            println!("{mv}: {count}");
        }
        split.iter().map(|(_, count)| count).sum::<u64>()
    } else {
        game.perft(args.depth)
    };
    let duration = start.elapsed();
    println!(
        "perft({}) = {} nodes ({} ms, {:.2} Mnps)",
        args.depth,
        nodes,
        duration.as_millis(),
        nodes as f64 / (duration.as_micros().max(1) as f64)
    );

    if args.verify {
        let reference = match reference_position(&args.fen) {
            Ok(pos) => pos,
            Err(err) => {
                eprintln!("shakmaty rejected the FEN: {err}");
                return ExitCode::FAILURE;
            }
        };
        let expected = perft_shakmaty(&reference, args.depth);
        if expected != nodes {
            eprintln!("MISMATCH: shakmaty perft({}) = {expected}, ours = {nodes}", args.depth);
            if args.divide {
                report_divide_diff(&mut game, &reference, args.depth);
            }
            return ExitCode::FAILURE;
        }
        println!("verified against shakmaty");
    }
    ExitCode::SUCCESS
}

fn reference_position(fen: &str) -> Result<Chess, Box<dyn std::error::Error>> {
    let fen: Fen = fen.parse()?;
    Ok(fen.into_position(CastlingMode::Standard)?)
}

fn perft_shakmaty(pos: &Chess, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for m in pos.legal_moves() {
        let mut next = pos.clone();
        next.play_unchecked(&m);
        nodes += perft_shakmaty(&next, depth - 1);
    }
    nodes
}

/// Prints root moves whose subtree counts disagree.
fn report_divide_diff(game: &mut Game, reference: &Chess, depth: u32) {
    if depth == 0 {
        return;
    }
    let ours = game.divide(depth);
    for m in reference.legal_moves() {
        let uci = m.to_uci(CastlingMode::Standard).to_string();
        let mut next = reference.clone();
        next.play_unchecked(&m);
        let expected = perft_shakmaty(&next, depth - 1);
        match ours.iter().find(|(mv, _)| mv.to_string() == uci) {
            Some((_, count)) if *count == expected => {}
            Some((_, count)) => println!("{uci}: shakmaty {expected}, ours {count}"),
            None => println!("{uci}: missing (shakmaty {expected})"),
        }
    }
    for (mv, count) in &ours {
        let uci = mv.to_string();
        if !reference
            .legal_moves()
            .iter()
            .any(|m| m.to_uci(CastlingMode::Standard).to_string() == uci)
        {
            println!("{uci}: extra ({count})");
        }
    }
}
