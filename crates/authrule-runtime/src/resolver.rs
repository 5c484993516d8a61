//! Decision resolution
//!
//! Turns the matched rules of a pass into the final decision. Anything short
//! of a deciding DENY or APPROVE falls back to a DENY with code 96.

use authrule_core::response_codes::{self, SYSTEM_MALFUNCTION};
use authrule_core::{Decision, MatchedRule, RuleAction};

pub const FALLBACK_RESPONSE_MESSAGE: &str = "System error - no rules matched";

pub struct DecisionResolver;

impl DecisionResolver {
    /// The fail-closed decision
    pub fn fallback() -> Decision {
        Decision {
            action: RuleAction::Deny,
            response_code: SYSTEM_MALFUNCTION.to_string(),
            response_message: FALLBACK_RESPONSE_MESSAGE.to_string(),
        }
    }

    /// The authoritative match, if any
    pub fn deciding(matched: &[MatchedRule]) -> Option<&MatchedRule> {
        matched.iter().find(|m| m.was_deciding)
    }

    /// Resolve a decision.
    ///
    /// `message_for` looks up the response message of a rule by id. When the
    /// rule is gone or carries no message, the response code description is
    /// used instead.
    pub fn resolve<F>(matched: &[MatchedRule], message_for: F) -> Decision
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(deciding) = Self::deciding(matched) else {
            return Self::fallback();
        };

        let response_message = message_for(&deciding.rule_id)
            .filter(|msg| !msg.is_empty())
            .or_else(|| response_codes::describe(&deciding.response_code).map(str::to_string))
            .unwrap_or_else(|| "Unknown".to_string());

        Decision {
            action: deciding.action,
            response_code: deciding.response_code.clone(),
            response_message,
        }
    }
}
