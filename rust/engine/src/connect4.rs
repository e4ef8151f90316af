//! Gravity-drop connect-four on an 8x8 board.
//!
//! Two players alternate dropping marks into columns; the first to line up
//! four in any direction wins, and a full board without a line is a draw.

use serde::{Deserialize, Serialize};

use crate::context::GameContext;
use crate::engine::{GameEngine, PlayerId};
use crate::errors::GameError;
use crate::events::GameEvent;
use crate::poker::Phase;

pub const ROWS: usize = 8;
pub const COLS: usize = 8;

/// A connect-four move. Wire shape: `{"type": "place", "column": 3}`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Connect4Move {
    Place { column: usize },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Connect4Action {
    pub player: PlayerId,
    pub mv: Connect4Move,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDirection {
    Horizontal,
    Vertical,
    DiagonalDown,
    DiagonalUp,
}

/// The four cells that decided the game, as (row, column) pairs with row 0
/// at the top of the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct WinningLine {
    pub direction: LineDirection,
    pub cells: [(usize, usize); 4],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect4State {
    /// `board[row][col]`; row `ROWS - 1` is the bottom, where marks land.
    pub board: [[Option<PlayerId>; COLS]; ROWS],
    pub players: [PlayerId; 2],
    /// Index into `players` of the side on turn.
    pub turn: usize,
    pub moves: u32,
    pub winner: Option<PlayerId>,
    pub winning_line: Option<WinningLine>,
    pub finished: bool,
}

pub struct Connect4Engine {
    state: Connect4State,
    ctx: GameContext,
}

impl Connect4Engine {
    pub fn new(players: [PlayerId; 2], ctx: GameContext) -> Self {
        let state = Connect4State {
            board: [[None; COLS]; ROWS],
            players,
            turn: 0,
            moves: 0,
            winner: None,
            winning_line: None,
            finished: false,
        };
        Self { state, ctx }
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    fn drop_row(&self, column: usize) -> Option<usize> {
        (0..ROWS).rev().find(|&r| self.state.board[r][column].is_none())
    }

    /// Scan the four line orientations through `(row, col)` for a run of
    /// four marks belonging to `player`.
    fn find_line(&self, player: PlayerId, row: usize, col: usize) -> Option<WinningLine> {
        const DIRECTIONS: [(isize, isize, LineDirection); 4] = [
            (0, 1, LineDirection::Horizontal),
            (1, 0, LineDirection::Vertical),
            (1, 1, LineDirection::DiagonalDown),
            (-1, 1, LineDirection::DiagonalUp),
        ];
        for &(dr, dc, direction) in &DIRECTIONS {
            let mut run = vec![(row, col)];
            for sign in [-1isize, 1] {
                let (mut r, mut c) = (row as isize, col as isize);
                loop {
                    r += dr * sign;
                    c += dc * sign;
                    if r < 0 || c < 0 || r as usize >= ROWS || c as usize >= COLS {
                        break;
                    }
                    if self.state.board[r as usize][c as usize] != Some(player) {
                        break;
                    }
                    run.push((r as usize, c as usize));
                }
            }
            if run.len() >= 4 {
                run.sort_unstable();
                let cells = [run[0], run[1], run[2], run[3]];
                return Some(WinningLine { direction, cells });
            }
        }
        None
    }
}

impl GameEngine for Connect4Engine {
    type State = Connect4State;
    type Action = Connect4Action;

    fn apply_action(&mut self, action: &Connect4Action) -> Result<(), GameError> {
        if self.state.finished {
            return Err(GameError::GameFinished);
        }
        if !self.state.players.contains(&action.player) {
            return Err(GameError::UnknownPlayer(action.player));
        }
        if self.state.players[self.state.turn] != action.player {
            return Err(GameError::NotPlayersTurn(action.player));
        }
        let Connect4Move::Place { column } = action.mv;
        if column >= COLS {
            return Err(GameError::ColumnOutOfRange(column));
        }
        let row = self.drop_row(column).ok_or(GameError::ColumnFull(column))?;

        self.state.board[row][column] = Some(action.player);
        self.state.moves += 1;
        self.ctx
            .events
            .emit(&GameEvent::action_executed(action.player, action.mv));

        if let Some(line) = self.find_line(action.player, row, column) {
            self.state.winner = Some(action.player);
            self.state.winning_line = Some(line);
            self.state.finished = true;
        } else if self.state.moves as usize == ROWS * COLS {
            self.state.finished = true; // draw
        } else {
            self.state.turn = 1 - self.state.turn;
            return Ok(());
        }

        tracing::info!(
            match_id = %self.ctx.match_id,
            winner = ?self.state.winner,
            moves = self.state.moves,
            "connect-four game finished"
        );
        self.ctx.events.emit(&GameEvent::HandCompleted {
            winners: self.state.winner.into_iter().collect(),
            players: self.state.players.to_vec(),
            hand_number: 1,
            phase: Phase::Showdown,
            showdown: false,
            pot: 0,
            ts: crate::context::now_rfc3339(),
        });
        Ok(())
    }

    fn valid_actions(&self, player: PlayerId) -> Vec<Connect4Action> {
        if self.state.finished || self.state.players[self.state.turn] != player {
            return Vec::new();
        }
        (0..COLS)
            .filter(|&c| self.state.board[0][c].is_none())
            .map(|column| Connect4Action {
                player,
                mv: Connect4Move::Place { column },
            })
            .collect()
    }

    fn current_player(&self) -> Option<PlayerId> {
        if self.state.finished {
            None
        } else {
            Some(self.state.players[self.state.turn])
        }
    }

    fn is_game_over(&self) -> bool {
        self.state.finished
    }

    fn winners(&self) -> Vec<PlayerId> {
        self.state.winner.into_iter().collect()
    }

    fn state(&self) -> &Connect4State {
        &self.state
    }
}
