// Cross-checks against shakmaty on positions that stress the special rules.

use chesscore::Game;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position};

fn shakmaty_position(fen: &str) -> Chess {
    let fen: Fen = fen.parse().expect("shakmaty FEN");
    fen.into_position(CastlingMode::Standard)
        .expect("Shakmaty should accept FEN")
}

fn shakmaty_perft(pos: &Chess, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for m in pos.legal_moves() {
        let mut new_pos = pos.clone();
        new_pos.play_unchecked(&m);
        nodes += shakmaty_perft(&new_pos, depth - 1);
    }
    nodes
}

fn run_perft_check(fen: &str, depth: u32, name: &str) {
    chesscore::init();
    let mut game = Game::from_fen(fen).expect("Valid FEN");
    let ours = game.perft(depth);
    let expected = shakmaty_perft(&shakmaty_position(fen), depth);
    assert_eq!(ours, expected, "Mismatch in {name} at depth {depth}");
}

fn assert_same_legal_moves(fen: &str) {
    let mut game = Game::from_fen(fen).unwrap();
    let mut ours: Vec<String> = game.legal_moves().iter().map(|m| m.to_string()).collect();
    let mut theirs: Vec<String> = shakmaty_position(fen)
        .legal_moves()
        .iter()
        .map(|m| m.to_uci(CastlingMode::Standard).to_string())
        .collect();
    ours.sort();
    theirs.sort();
    assert_eq!(ours, theirs, "legal moves differ for {fen}");
}

#[test]
fn en_passant_exposing_the_king_is_illegal() {
    // bxc6 e.p. would open the fifth rank to the h5 rook.
    let fen = "8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1";
    let mut game = Game::from_fen(fen).unwrap();
    let ep = game.parse_move("b5c6").unwrap();
    assert!(!game.play_move(ep));
    assert_same_legal_moves(fen);
}

#[test]
fn en_passant_capture_matches() {
    let fen = "8/8/8/k1pP3R/8/8/8/4K3 w - c6 0 1";
    assert_same_legal_moves(fen);
    run_perft_check(fen, 4, "en passant next to the king");
}

#[test]
fn castling_out_of_and_through_check() {
    // In check: no castling at all.
    assert_same_legal_moves("r3k2r/8/8/8/4r3/8/8/R3K2R w KQkq - 0 1");
    // Transit squares attacked on both sides.
    assert_same_legal_moves("r3k2r/8/8/8/8/8/3r1r2/R3K2R w KQkq - 0 1");
    // b1 attacked but not crossed by the king: queen-side castling stays legal.
    assert_same_legal_moves("r3k2r/8/8/8/8/8/1r6/R3K2R w KQkq - 0 1");
    run_perft_check("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", 3, "bare castling");
}

#[test]
fn promotion_with_capture_and_check() {
    let fen = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1";
    assert_same_legal_moves(fen);
    run_perft_check(fen, 3, "promotion storm");
}

#[test]
fn pinned_pieces_and_double_check() {
    assert_same_legal_moves("4k3/8/8/8/1b6/8/3P4/4K3 w - - 0 1");
    assert_same_legal_moves("4k3/8/8/8/8/5n2/8/r3K3 w - - 0 1");
    run_perft_check("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1", 3, "position 4 mirrored");
}

#[test]
fn random_walks_match_shakmaty() {
    use chesscore::utils::SplitMix64;

    let mut rng = SplitMix64::new(0xC0FF_EE00);
    for _ in 0..20 {
        let mut game = Game::from_fen(chesscore::START_FEN).unwrap();
        for _ in 0..40 {
            let fen = game.fen();
            assert_same_legal_moves(&fen);
            let moves = game.legal_moves();
            if moves.is_empty() {
                break;
            }
            let mv = moves[(rng.next_u64() % moves.len() as u64) as usize];
            assert!(game.play_move(mv));
        }
    }
}
