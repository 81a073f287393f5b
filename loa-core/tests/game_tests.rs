//! Integration tests for loa-core
//!
//! Full games between bots, history persistence and replay, and the
//! rule scenarios every front end depends on.

use loa_core::{
    board::Position,
    movegen::legal_moves,
    replay, Board, Bot, BotConfig, Difficulty, Game, GameResult, Move, Player, SearchConfig,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn sq(s: &str) -> Position {
    s.parse().unwrap()
}

fn seeded_bot(difficulty: Difficulty, seed: u64) -> Bot {
    let config = BotConfig::new(difficulty)
        .with_seed(seed)
        .with_search(SearchConfig::default().with_max_depth(2));
    Bot::from_config(&config)
}

/// Play until the game ends or `max_moves` is reached
fn play_out(black: &mut Bot, white: &mut Bot, max_moves: usize) -> Game {
    let mut game = Game::new();
    while !game.is_over() && game.history().len() < max_moves {
        let moves = game.legal_moves();
        let bot = match game.to_move() {
            Player::Black => &mut *black,
            Player::White => &mut *white,
        };
        let mv = bot.select_move(game.board(), &moves).unwrap();
        game.play_move(mv).unwrap();
    }
    game
}

// ============================================================================
// FULL GAMES
// ============================================================================

#[test]
fn test_random_games_reach_a_result() {
    for seed in 0..5 {
        let mut black = seeded_bot(Difficulty::Easy, seed);
        let mut white = seeded_bot(Difficulty::Easy, seed + 100);
        let game = play_out(&mut black, &mut white, 1_000);
        assert!(replay(game.history()).is_ok());
        if game.is_over() {
            let winner = game.result().winner().unwrap();
            assert!(Player::ALL.contains(&winner));
        }
    }
}

#[test]
fn test_replay_reproduces_every_board() {
    let mut black = seeded_bot(Difficulty::Medium, 11);
    let mut white = seeded_bot(Difficulty::Easy, 12);
    let game = play_out(&mut black, &mut white, 60);

    // Every intermediate board, rebuilt move by move
    let mut expected = vec![Board::initial()];
    let mut board = Board::initial();
    for mv in game.history() {
        board.apply(mv.from, mv.to);
        expected.push(board);
    }

    let json = serde_json::to_string(game.history()).unwrap();
    let restored: Vec<Move> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, game.history());

    let boards = replay(&restored).unwrap();
    assert_eq!(boards, expected);
    assert_eq!(boards.last(), Some(game.board()));
}

#[test]
fn test_hard_bot_plays_legal_moves() {
    let mut black = seeded_bot(Difficulty::Hard, 1);
    let mut white = seeded_bot(Difficulty::Medium, 2);
    let game = play_out(&mut black, &mut white, 10);
    assert!(replay(game.history()).is_ok());
}

// ============================================================================
// RULE SCENARIOS
// ============================================================================

#[test]
fn test_black_b8_scenario() {
    let game = Game::new();
    let mut dests = game.destinations(Position::new(0, 1));
    dests.sort();
    assert_eq!(dests, vec![Position::new(0, 7), Position::new(2, 1), Position::new(2, 3)]);
    // White's pieces are not Black's to move
    assert!(game.destinations(sq("a7")).is_empty());
}

#[test]
fn test_lone_white_piece_wins() {
    let board = Board::parse(
        "
        .b...b..
        ........
        ...w....
        ........
        b......b
        ........
        ........
        ..b..b..
        ",
    )
    .unwrap();
    let game = Game::from_board(board, Player::White);
    assert_eq!(game.result(), GameResult::WhiteWins);
}

#[test]
fn test_simultaneous_connection_credits_mover() {
    let board = Board::parse(
        "
        ........
        ........
        ..bw....
        ........
        .b......
        ........
        .....ww.
        .....ww.
        ",
    )
    .unwrap();
    let mut game = Game::from_board(board, Player::Black);
    let mv = game.play(sq("b4"), sq("d6")).unwrap();
    assert!(mv.captured);
    assert!(loa_core::is_connected(game.board(), Player::White));
    assert_eq!(game.result(), GameResult::BlackWins);
}

#[test]
fn test_initial_moves_match_destinations() {
    let board = Board::initial();
    for player in Player::ALL {
        let moves = legal_moves(&board, player);
        let from_dests: usize = board
            .pieces(player)
            .map(|p| loa_core::destinations(&board, player, p).len())
            .sum();
        assert_eq!(moves.len(), from_dests);
    }
}
