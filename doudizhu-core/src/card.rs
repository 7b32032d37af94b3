//! Card rank vocabulary: codes, deck copies, and text rendering.
//!
//! Ranks are encoded as small integers so that numeric comparison reflects
//! Dou Dizhu's ordering. Code gaps (14 -> 17, 17 -> 20, 20 -> 30) guarantee
//! that the two jokers and the "2" never appear in any arithmetic
//! "consecutive" sequence.

use std::fmt;

/// A card rank, ordered low to high the way Dou Dizhu compares them.
///
/// `Two` outranks `Ace`, and both jokers outrank everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    /// 3 - lowest rank
    Three = 3,
    /// 4
    Four = 4,
    /// 5
    Five = 5,
    /// 6
    Six = 6,
    /// 7
    Seven = 7,
    /// 8
    Eight = 8,
    /// 9
    Nine = 9,
    /// 10
    Ten = 10,
    /// Jack
    Jack = 11,
    /// Queen
    Queen = 12,
    /// King
    King = 13,
    /// Ace
    Ace = 14,
    /// 2 - highest natural rank
    Two = 17,
    /// Black Joker
    BlackJoker = 20,
    /// Red Joker - highest rank in the deck
    RedJoker = 30,
}

impl Rank {
    /// All fourteen ranks in ascending order.
    pub const ALL: [Rank; 15 - 1] = [
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
        Rank::Two,
        Rank::BlackJoker,
        Rank::RedJoker,
    ];

    /// Returns the numeric rank code as used throughout the engine.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Builds a `Rank` from its numeric code, if it names a real rank.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            14 => Some(Rank::Ace),
            17 => Some(Rank::Two),
            20 => Some(Rank::BlackJoker),
            30 => Some(Rank::RedJoker),
            _ => None,
        }
    }

    /// Number of copies of this rank present in a single 54-card deck.
    #[must_use]
    pub const fn deck_copies(self) -> usize {
        match self {
            Rank::BlackJoker | Rank::RedJoker => 1,
            _ => 4,
        }
    }

    /// True for the two jokers, which never participate in sequences.
    #[must_use]
    pub const fn is_joker(self) -> bool {
        matches!(self, Rank::BlackJoker | Rank::RedJoker)
    }

    /// Parses a single-rank text token ("3".."9", "10"/"T", "J","Q","K","A","2","X","D").
    ///
    /// Case-insensitive; the caller is expected to have already upper-cased
    /// and stripped whitespace from the token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "3" => Some(Rank::Three),
            "4" => Some(Rank::Four),
            "5" => Some(Rank::Five),
            "6" => Some(Rank::Six),
            "7" => Some(Rank::Seven),
            "8" => Some(Rank::Eight),
            "9" => Some(Rank::Nine),
            "10" | "T" => Some(Rank::Ten),
            "J" => Some(Rank::Jack),
            "Q" => Some(Rank::Queen),
            "K" => Some(Rank::King),
            "A" => Some(Rank::Ace),
            "2" => Some(Rank::Two),
            "X" => Some(Rank::BlackJoker),
            "D" => Some(Rank::RedJoker),
            _ => None,
        }
    }

    /// Canonical upper-case text rendering of this rank.
    #[must_use]
    pub const fn as_text(self) -> &'static str {
        match self {
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::BlackJoker => "X",
            Rank::RedJoker => "D",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// Returns the full 54-card deck as a sorted multiset of rank codes.
#[must_use]
pub fn full_deck() -> Vec<u8> {
    let mut cards = Vec::with_capacity(54);
    for rank in Rank::ALL {
        for _ in 0..rank.deck_copies() {
            cards.push(rank.code());
        }
    }
    cards
}

/// Number of copies of `rank_code` present in a single deck, or 0 for an unknown code.
#[must_use]
pub fn deck_copies(rank_code: u8) -> usize {
    Rank::from_code(rank_code).map_or(0, Rank::deck_copies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_ordering() {
        assert!(Rank::Two > Rank::Ace);
        assert!(Rank::Ace > Rank::King);
        assert!(Rank::BlackJoker > Rank::Two);
        assert!(Rank::RedJoker > Rank::BlackJoker);
    }

    #[test]
    fn round_trip_codes() {
        for rank in Rank::ALL {
            assert_eq!(Rank::from_code(rank.code()), Some(rank));
        }
        assert_eq!(Rank::from_code(15), None);
    }

    #[test]
    fn token_aliases() {
        assert_eq!(Rank::from_token("T"), Some(Rank::Ten));
        assert_eq!(Rank::from_token("10"), Some(Rank::Ten));
        assert_eq!(Rank::from_token("Z"), None);
    }

    #[test]
    fn deck_has_54_cards() {
        let deck = full_deck();
        assert_eq!(deck.len(), 54);
        assert_eq!(deck.iter().filter(|&&c| c == Rank::BlackJoker.code()).count(), 1);
        assert_eq!(deck.iter().filter(|&&c| c == Rank::Three.code()).count(), 4);
    }
}
