use chesscore::notation::parse_fen;
use chesscore::utils::SplitMix64;
use chesscore::{Game, START_FEN};

#[test]
fn fen_round_trips_along_random_games() {
    chesscore::init();
    let mut rng = SplitMix64::new(0x5EED);
    for _ in 0..10 {
        let mut game = Game::from_fen(START_FEN).unwrap();
        for _ in 0..120 {
            let fen = game.fen();
            let (position, fullmove) = parse_fen(&fen).unwrap();
            assert_eq!(&position, game.current_position(), "position differs for {fen}");
            assert_eq!(fullmove, game.fullmove_number());

            let reloaded = Game::from_fen(&fen).unwrap();
            assert_eq!(reloaded.fen(), fen);
            assert_eq!(reloaded.hash(), game.hash());
            assert_eq!(reloaded.board(), game.board());

            let moves = game.legal_moves();
            if moves.is_empty() {
                break;
            }
            let mv = moves[(rng.next_u64() % moves.len() as u64) as usize];
            assert!(game.play_move(mv));
        }
    }
}

#[test]
fn known_fens_round_trip() {
    for fen in [
        START_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        "8/8/8/8/8/8/1R6/k6K b - - 57 90",
    ] {
        assert_eq!(Game::from_fen(fen).unwrap().fen(), fen);
    }
}
