use thiserror::Error;

use crate::engine::PlayerId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid bet amount {amount}, minimum {minimum}")]
    InvalidBetAmount { amount: u32, minimum: u32 },
    #[error("cannot check facing a bet of {to_call}")]
    CheckFacingBet { to_call: u32 },
    #[error("no hand in progress")]
    NoHandInProgress,
    #[error("hand already complete")]
    HandAlreadyComplete,
    #[error("player {0} has already folded")]
    PlayerAlreadyFolded(PlayerId),
    #[error("player {0} is all-in and cannot act")]
    PlayerAllIn(PlayerId),
    #[error("it is not player {0}'s turn")]
    NotPlayersTurn(PlayerId),
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("not enough players with chips to start a hand")]
    NotEnoughPlayers,
    #[error("deck exhausted")]
    DeckExhausted,
    #[error("column {0} is out of range")]
    ColumnOutOfRange(usize),
    #[error("column {0} is full")]
    ColumnFull(usize),
    #[error("game already finished")]
    GameFinished,
}
