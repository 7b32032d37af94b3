//! Error types for the doudizhu-core library.

use thiserror::Error;

/// Errors raised while turning text or structured payloads into card multisets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An unrecognised glyph was encountered; names the offending suffix.
    #[error("invalid card token: {suffix}")]
    InvalidToken {
        /// The unconsumed tail of the input starting at the bad token.
        suffix: String,
    },

    /// A hand-like payload parsed to an empty multiset, which is never valid for a hand.
    #[error("{field} cannot be empty/PASS")]
    EmptyHandPayload {
        /// Name of the field being parsed, for diagnostics.
        field: String,
    },

    /// A rank appeared more cards than the parser's flat cap allows (4 of any rank).
    #[error("{field} rank '{rank}' exceeds {max} cards ({count})")]
    TooManyOfRank {
        /// Name of the field being parsed.
        field: String,
        /// Display text of the offending rank.
        rank: String,
        /// Count observed.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A rank appeared more times than the deck actually contains (jokers: 1 copy).
    #[error("{field} has too many '{rank}' cards ({count}), deck only has {deck_copies}")]
    ExceedsDeckCopies {
        /// Name of the field being parsed.
        field: String,
        /// Display text of the offending rank.
        rank: String,
        /// Count observed.
        count: usize,
        /// Deck copies available for that rank.
        deck_copies: usize,
    },

    /// A hand-only field contained a rank outside the playable deck vocabulary.
    #[error("{field} contains unsupported cards")]
    UnsupportedCards {
        /// Name of the field being parsed.
        field: String,
    },

    /// An unsupported rank name was given in a structured counts payload.
    #[error("unsupported rank: {0}")]
    UnsupportedRank(String),

    /// A negative count was given in a structured counts payload.
    #[error("negative count is not allowed: {rank}={count}")]
    NegativeCount {
        /// Rank the negative count was attached to.
        rank: String,
        /// The offending (negative) count.
        count: i64,
    },

    /// The action payload was neither text, a counts map, nor a recognised tagged object.
    #[error("unsupported action payload format; use text like '3344'/'PASS' or a counts object")]
    UnsupportedPayloadShape,
}

/// Errors raised while validating a state transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `user_role` was not one of the three recognised roles.
    #[error("unsupported role: {0}")]
    UnknownRole(String),

    /// The initial hand did not have the expected size for a non-landlord seat.
    #[error("expected {expected} cards in initial hand, got {actual}")]
    WrongHandSize {
        /// Required hand size.
        expected: usize,
        /// Actual hand size supplied.
        actual: usize,
    },

    /// `three_bottom` did not contain exactly three cards.
    #[error("three_bottom must contain exactly 3 cards, got {actual}")]
    WrongBottomSize {
        /// Actual size supplied.
        actual: usize,
    },

    /// The initial hand plus bottom cards used more copies of a rank than the deck has.
    #[error("card count exceeds deck limit for rank {rank}")]
    DeckCopiesExceeded {
        /// The offending rank code.
        rank: u8,
    },

    /// An operation that requires the user's turn was called off-turn.
    #[error("not the user's turn")]
    NotUsersTurn,

    /// The game has already ended.
    #[error("game already over")]
    GameAlreadyOver,

    /// The user attempted to play a combination not in `legal_actions`.
    #[error("invalid action for your turn: {text}")]
    IllegalUserAction {
        /// Canonical text of the rejected action.
        text: String,
    },

    /// An opponent action failed one of the §4.5 opponent-action checks.
    #[error("opponent action rejected: {reason}")]
    IllegalOpponentAction {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// An opponent attempted to pass while leading a new round.
    #[error("PASS is not allowed when leading a new round")]
    PassOnLead,

    /// `undo` was called with an empty action log.
    #[error("no action to undo")]
    EmptyActionLog,
}

/// Result alias for parsing operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result alias for state-machine validation operations.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
