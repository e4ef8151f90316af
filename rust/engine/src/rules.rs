use crate::errors::GameError;
use crate::player::PlayerAction;

/// A structurally valid action with its settled chip movement.
///
/// Amounts are what actually leaves the stack: `Call` carries the matched
/// amount, `Raise` the delta over the current bet, `AllIn` the whole
/// remaining stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    Call(u32),
    Bet(u32),
    Raise(u32),
    AllIn(u32),
}

/// Validate a requested action against the betting rules.
///
/// * `stack` - the acting player's remaining chips
/// * `to_call` - chips needed to match the current bet
/// * `min_raise` - minimum raise delta (reset to the big blind each street)
///
/// Requests the stack cannot cover degrade to all-in rather than being
/// rejected; checking into a live bet and under-sized bets or raises are
/// rejected with the state untouched.
pub fn validate_action(
    stack: u32,
    to_call: u32,
    min_raise: u32,
    action: PlayerAction,
) -> Result<ValidatedAction, GameError> {
    match action {
        PlayerAction::Fold => Ok(ValidatedAction::Fold),
        PlayerAction::Check => {
            if to_call == 0 {
                Ok(ValidatedAction::Check)
            } else {
                Err(GameError::CheckFacingBet { to_call })
            }
        }
        PlayerAction::Call => {
            if to_call == 0 {
                Ok(ValidatedAction::Check)
            } else if stack <= to_call {
                Ok(ValidatedAction::AllIn(stack))
            } else {
                Ok(ValidatedAction::Call(to_call))
            }
        }
        PlayerAction::Bet { amount } => {
            if to_call > 0 {
                // A bet into a live bet is a raise request by convention.
                return validate_action(stack, to_call, min_raise, PlayerAction::Raise { amount });
            }
            if amount >= stack {
                Ok(ValidatedAction::AllIn(stack))
            } else if amount < min_raise {
                Err(GameError::InvalidBetAmount {
                    amount,
                    minimum: min_raise,
                })
            } else {
                Ok(ValidatedAction::Bet(amount))
            }
        }
        PlayerAction::Raise { amount } => {
            if amount.saturating_add(to_call) >= stack {
                Ok(ValidatedAction::AllIn(stack))
            } else if amount < min_raise {
                Err(GameError::InvalidBetAmount {
                    amount,
                    minimum: min_raise,
                })
            } else {
                Ok(ValidatedAction::Raise(amount))
            }
        }
        PlayerAction::AllIn => Ok(ValidatedAction::AllIn(stack)),
    }
}
