//! Reply validation.
//!
//! The external service is untrusted: replies arrive as arbitrary JSON
//! and nothing in them is taken at face value. A reply yields a decision
//! only when its proposed action, after stripping decorative fields,
//! deserializes into the game's move type and matches one of the legal
//! actions exactly. Everything else is a miss and the caller falls back.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A reply that survived validation. The action is guaranteed to be one
/// of the legal actions supplied by the engine.
#[derive(Debug, Clone)]
pub struct ValidatedDecision<M> {
    pub action: M,
    pub confidence: f64,
    pub reasoning: String,
}

/// Validate a raw reply against the legal actions. Returns `None` when
/// no usable action can be recovered; never panics on malformed input.
pub fn validate_reply<M>(reply: &Value, legal: &[M]) -> Option<ValidatedDecision<M>>
where
    M: DeserializeOwned + PartialEq + Clone,
{
    let action = match_candidate(reply.get("action")?, legal).or_else(|| {
        // The primary action was illegal or unparseable; walk the
        // stated alternatives in order.
        reply
            .get("alternativeActions")?
            .as_array()?
            .iter()
            .find_map(|alt| match_candidate(alt, legal))
    })?;

    Some(ValidatedDecision {
        action,
        confidence: coerce_confidence(reply.get("confidence")),
        reasoning: extract_reasoning(reply),
    })
}

fn match_candidate<M>(candidate: &Value, legal: &[M]) -> Option<M>
where
    M: DeserializeOwned + PartialEq + Clone,
{
    let parsed: M = serde_json::from_value(strip_decoration(candidate)).ok()?;
    legal.iter().find(|&m| *m == parsed).cloned()
}

// Models routinely echo timestamps and player ids back into the action
// object; those never affect legality and must not defeat the match.
fn strip_decoration(candidate: &Value) -> Value {
    match candidate {
        Value::Object(map) => {
            let mut map = map.clone();
            map.remove("timestamp");
            map.remove("playerId");
            map.remove("player_id");
            Value::Object(map)
        }
        other => other.clone(),
    }
}

/// Normalize whatever the model put in `confidence` to `[0.0, 1.0]`.
/// Accepts a number, a numeric string, or a percentage string; anything
/// else becomes the neutral 0.5.
pub fn coerce_confidence(raw: Option<&Value>) -> f64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let s = s.trim();
            if let Some(pct) = s.strip_suffix('%') {
                pct.trim().parse::<f64>().ok().map(|p| p / 100.0)
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    let value = parsed.unwrap_or(0.5);
    // Bare numbers above 1 are almost always percentages missing the sign.
    let value = if value > 1.0 && value <= 100.0 {
        value / 100.0
    } else {
        value
    };
    value.clamp(0.0, 1.0)
}

/// Pull a human-readable rationale out of the reply, tolerating the
/// field names different models favor.
pub fn extract_reasoning(reply: &Value) -> String {
    for key in ["reasoning", "rationale", "explanation", "thought"] {
        if let Some(text) = reply.get(key).and_then(Value::as_str) {
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    "no reasoning provided".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_engine::player::PlayerAction;
    use serde_json::json;

    fn legal() -> Vec<PlayerAction> {
        vec![
            PlayerAction::Check,
            PlayerAction::Bet { amount: 100 },
            PlayerAction::AllIn,
            PlayerAction::Fold,
        ]
    }

    #[test]
    fn exact_action_match_passes() {
        let reply = json!({
            "action": { "type": "bet", "amount": 100 },
            "confidence": 0.8,
            "reasoning": "value bet"
        });
        let v = validate_reply(&reply, &legal()).unwrap();
        assert_eq!(v.action, PlayerAction::Bet { amount: 100 });
        assert_eq!(v.confidence, 0.8);
        assert_eq!(v.reasoning, "value bet");
    }

    #[test]
    fn decorative_fields_do_not_defeat_the_match() {
        let reply = json!({
            "action": {
                "type": "check",
                "timestamp": "2026-01-01T00:00:00Z",
                "playerId": 3
            }
        });
        let v = validate_reply(&reply, &legal()).unwrap();
        assert_eq!(v.action, PlayerAction::Check);
    }

    #[test]
    fn illegal_amount_falls_through_to_alternatives() {
        let reply = json!({
            "action": { "type": "bet", "amount": 7 },
            "alternativeActions": [
                { "type": "raise", "amount": 50 },
                { "type": "check" }
            ]
        });
        let v = validate_reply(&reply, &legal()).unwrap();
        assert_eq!(v.action, PlayerAction::Check);
    }

    #[test]
    fn missing_action_is_a_miss_even_with_confidence() {
        let reply = json!({ "confidence": "85%", "reasoning": "I feel good" });
        assert!(validate_reply(&reply, &legal()).is_none());
    }

    #[test]
    fn garbage_reply_is_a_miss() {
        for reply in [json!(null), json!("fold"), json!(42), json!({ "action": "???" })] {
            assert!(validate_reply(&reply, &legal()).is_none());
        }
    }

    #[test]
    fn confidence_coercion_handles_the_usual_shapes() {
        assert_eq!(coerce_confidence(Some(&json!(0.9))), 0.9);
        assert_eq!(coerce_confidence(Some(&json!("0.75"))), 0.75);
        assert_eq!(coerce_confidence(Some(&json!("85%"))), 0.85);
        assert_eq!(coerce_confidence(Some(&json!(85))), 0.85);
        assert_eq!(coerce_confidence(Some(&json!("very sure"))), 0.5);
        assert_eq!(coerce_confidence(None), 0.5);
        assert_eq!(coerce_confidence(Some(&json!(-3.0))), 0.0);
    }

    #[test]
    fn reasoning_falls_through_known_field_names() {
        assert_eq!(
            extract_reasoning(&json!({ "rationale": "pot odds" })),
            "pot odds"
        );
        assert_eq!(
            extract_reasoning(&json!({ "reasoning": "  " })),
            "no reasoning provided"
        );
    }
}
