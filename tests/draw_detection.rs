use chesscore::{Game, GameResult, START_FEN};

fn play(game: &mut Game, uci: &str) {
    let mv = game
        .parse_move(uci)
        .unwrap_or_else(|e| panic!("Move {uci} not parsed: {e}"));
    assert!(game.play_move(mv), "Move {uci} illegal");
}

#[test]
fn test_threefold_repetition_simple() {
    chesscore::init();
    let mut game = Game::from_fen(START_FEN).unwrap();

    // 1. Nf3 Nf6 2. Ng1 Ng8 3. Nf3 Nf6 4. Ng1 Ng8
    let moves = ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"];
    for (i, uci) in moves.iter().enumerate() {
        play(&mut game, uci);
        if i < 7 {
            assert_eq!(game.result(), GameResult::Ongoing, "no draw after ply {}", i + 1);
        }
    }
    assert!(game.is_draw_by_repetition());
    assert_eq!(game.result(), GameResult::Draw);
}

#[test]
fn test_king_shuffle_repetition() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
    for uci in ["e1d1", "e8d8", "d1e1", "d8e8", "e1d1", "e8d8", "d1e1", "d8e8"] {
        play(&mut game, uci);
    }
    assert_eq!(game.result(), GameResult::Draw);
}

#[test]
fn test_50_move_rule() {
    let mut game = Game::from_fen("8/8/8/8/8/8/1R6/k6K w - - 99 1").unwrap();
    assert_eq!(game.result(), GameResult::Ongoing, "99 halfmoves is not yet draw");

    play(&mut game, "b2b3");
    assert!(game.current_position().is_draw_by_fifty_move_rule());
    assert_eq!(game.result(), GameResult::Draw, "100 halfmoves should be draw (50 move rule)");
}

#[test]
fn test_capture_resets_halfmove_clock() {
    let mut game = Game::from_fen("8/8/8/8/8/1r6/1R6/k6K w - - 99 1").unwrap();
    play(&mut game, "b2b3");
    assert_eq!(game.current_position().halfmove_clock, 0);
    assert_eq!(game.result(), GameResult::Ongoing);
}

#[test]
fn test_insufficient_material() {
    for fen in [
        "8/8/8/4k3/8/8/8/4K3 w - - 0 1",
        "8/8/8/4k3/8/8/8/3NK3 w - - 0 1",
        "8/8/8/3bk3/8/8/8/3BK3 w - - 0 1",
    ] {
        let mut game = Game::from_fen(fen).unwrap();
        assert_eq!(game.result(), GameResult::Draw, "{fen}");
    }
    for fen in [
        "8/8/8/4k3/8/8/8/2NNK3 w - - 0 1",
        "8/8/8/4k3/8/8/4P3/4K3 w - - 0 1",
        "8/8/8/4k3/8/8/8/3RK3 w - - 0 1",
    ] {
        let mut game = Game::from_fen(fen).unwrap();
        assert_eq!(game.result(), GameResult::Ongoing, "{fen}");
    }
}

#[test]
fn test_mate_results() {
    // Fool's mate.
    let mut game = Game::from_fen(START_FEN).unwrap();
    for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        play(&mut game, uci);
    }
    assert!(game.is_checkmate());
    assert_eq!(game.result(), GameResult::BlackWon);
    assert_eq!(game.result().to_string(), "0-1");
}
