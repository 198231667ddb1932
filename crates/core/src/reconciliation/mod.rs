//! Reconciliation Matcher: proposes the invoice or payslip an imported bank
//! transfer most likely settles.
//!
//! Matching is a heuristic and never auto-links: the matcher only proposes,
//! and the actual link write goes through the Payment Registrar once a human
//! confirms.

pub mod error;
pub mod matching;
pub mod service;
pub mod types;

#[cfg(test)]
mod matching_props;

pub use error::ReconciliationError;
pub use matching::{
    AMOUNT_MATCH_SCORE, AMOUNT_RELATIVE_TOLERANCE, NAME_MATCH_SCORE, SUGGESTION_THRESHOLD,
    amounts_match, names_match, score_candidate,
};
pub use service::ReconciliationMatcher;
pub use types::{MatchCandidate, MatchConfirmation};
