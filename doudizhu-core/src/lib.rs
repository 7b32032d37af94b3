//! # doudizhu-core
//!
//! Rules engine and partial-information game tracker for Dou Dizhu ("Fight
//! the Landlord"): a pure combination classifier, a hand-combination
//! generator and legal-move filter, and a replayable per-session game state
//! machine for one seated player who observes the other two.
//!
//! ## Quick start
//!
//! ```rust
//! use doudizhu_core::parser::parse_action_text;
//! use doudizhu_core::classify::classify;
//!
//! let hand = parse_action_text("33344456").unwrap();
//! let info = classify(&hand);
//! println!("{:?} rank={:?} len={:?}", info.kind, info.rank, info.length);
//! ```
//!
//! ## Module structure
//!
//! - [`card`]: rank vocabulary, codes, deck copies, text tokens.
//! - [`parser`]: text/structured-payload parsing and rendering.
//! - [`classify`]: the pure combination classifier.
//! - [`generator`]: enumerates every combination a hand can form.
//! - [`filter`]: legal-action filtering against a rival move.
//! - [`state`]: the per-session game state machine.
//! - [`error`]: the [`error::ParseError`] and [`error::ValidationError`] types.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod card;
pub mod classify;
pub mod error;
pub mod filter;
pub mod generator;
pub mod parser;
pub mod state;

pub use classify::{classify, MoveInfo, MoveKind};
pub use error::{ParseError, ParseResult, ValidationError, ValidationResult};
pub use filter::legal_actions;
pub use generator::Generator;
pub use state::{GameRules, GameState, InfoSet, Role, Snapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn s6_round_trip_text() {
        let cards = parser::parse_action_text("10JQKA2XD").unwrap();
        assert_eq!(cards, vec![10, 11, 12, 13, 14, 17, 20, 30]);
        assert_eq!(parser::action_to_text(&cards), "10JQKA2XD");
    }

    #[test]
    fn s2_classifier_scenarios() {
        assert_eq!(classify(&[20, 30]).kind, MoveKind::KingBomb);

        let bomb = classify(&[7, 7, 7, 7]);
        assert_eq!(bomb.kind, MoveKind::Bomb);
        assert_eq!(bomb.rank, Some(7));

        assert_eq!(classify(&[3, 4]).kind, MoveKind::Wrong);

        let serial = classify(&[3, 3, 3, 4, 4, 4, 5, 6]);
        assert_eq!(serial.kind, MoveKind::SerialTripleOne);
        assert_eq!(serial.rank, Some(3));
        assert_eq!(serial.length, Some(2));
    }
}
