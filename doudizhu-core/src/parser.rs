//! Parsing of user-facing card text and structured action payloads into
//! sorted rank-code multisets, plus the inverse text rendering.

use std::collections::BTreeMap;

use crate::card::{deck_copies, Rank};
use crate::error::{ParseError, ParseResult};

/// Maximum copies of any single rank a flat action payload may name, independent
/// of how many copies the deck actually holds for that rank (jokers are capped
/// at 1 copy by [`validate_cards_not_exceed_deck`] instead).
const MAX_COUNT_PER_RANK: usize = 4;

/// The fifteen rank codes the deck actually contains.
///
/// A hand-only field is checked against this set independently of the
/// tokenizer, the same defense-in-depth the hand-payload boundary applies
/// before [`validate_cards_not_exceed_deck`].
const VALID_CARDS: [u8; 15] = [3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 17, 20, 30];

/// Checks that every rank in `cards` is one of the fifteen playable ranks.
pub fn validate_cards_are_recognised(cards: &[u8], field_name: &str) -> ParseResult<()> {
    if cards.iter().any(|card| !VALID_CARDS.contains(card)) {
        return Err(ParseError::UnsupportedCards {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

/// The accepted shapes of an action/hand payload (see spec §6, §9).
///
/// Implementations at the boundary should construct this explicitly rather
/// than threading a dynamically-typed value through the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPayload {
    /// Card text such as `"334455"` or `"PASS"`.
    Text(String),
    /// A rank-name to count mapping, e.g. `{"3": 2, "A": 1}`.
    Counts(BTreeMap<String, i64>),
    /// The explicit pass payload `{"type": "pass"}`.
    Pass,
}

impl From<&str> for ActionPayload {
    fn from(text: &str) -> Self {
        ActionPayload::Text(text.to_string())
    }
}

impl From<String> for ActionPayload {
    fn from(text: String) -> Self {
        ActionPayload::Text(text)
    }
}

fn tokenize_text_cards(text: &str) -> ParseResult<Vec<String>> {
    let payload: String = text
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if payload == "PASS" || payload == "P" {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = payload.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i..].starts_with(&['1', '0']) {
            tokens.push("10".to_string());
            i += 2;
            continue;
        }

        let token: String = chars[i].to_string();
        if Rank::from_token(&token).is_some() {
            tokens.push(token);
            i += 1;
            continue;
        }

        return Err(ParseError::InvalidToken {
            suffix: chars[i..].iter().collect(),
        });
    }

    Ok(tokens)
}

/// Parses card text ("334455", "10JQKA2XD", "PASS"/"P") into a sorted rank-code multiset.
///
/// `PASS`/`P` parse to an empty multiset; callers that require a non-empty
/// hand should go through [`parse_hand_payload`] instead.
pub fn parse_action_text(text: &str) -> ParseResult<Vec<u8>> {
    let tokens = tokenize_text_cards(text)?;
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let mut cards: Vec<u8> = tokens
        .iter()
        .map(|t| Rank::from_token(t).expect("tokenizer only emits recognised tokens").code())
        .collect();

    validate_cards_max_four(&cards, "action")?;
    cards.sort_unstable();
    Ok(cards)
}

/// Parses a rank-name to count mapping (e.g. from a UI click payload) into a sorted multiset.
pub fn parse_action_counts(counts: &BTreeMap<String, i64>) -> ParseResult<Vec<u8>> {
    let mut cards = Vec::new();

    for (raw_rank, &count) in counts {
        let mut key = raw_rank.trim().to_uppercase();
        if key == "T" {
            key = "10".to_string();
        }

        let rank = Rank::from_token(&key).ok_or_else(|| ParseError::UnsupportedRank(raw_rank.clone()))?;

        if count < 0 {
            return Err(ParseError::NegativeCount {
                rank: raw_rank.clone(),
                count,
            });
        }

        for _ in 0..count {
            cards.push(rank.code());
        }
    }

    validate_cards_max_four(&cards, "action")?;
    cards.sort_unstable();
    Ok(cards)
}

/// Parses any of the accepted action payload shapes into a sorted multiset.
pub fn parse_action_payload(payload: &ActionPayload) -> ParseResult<Vec<u8>> {
    match payload {
        ActionPayload::Text(text) => parse_action_text(text),
        ActionPayload::Counts(counts) => parse_action_counts(counts),
        ActionPayload::Pass => Ok(Vec::new()),
    }
}

/// Parses a hand-like payload. Unlike [`parse_action_payload`], an empty result is rejected
/// and every rank must stay within the deck's actual copy count (jokers: 1, others: 4).
pub fn parse_hand_payload(payload: &ActionPayload, field_name: &str) -> ParseResult<Vec<u8>> {
    let cards = parse_action_payload(payload)?;
    if cards.is_empty() {
        return Err(ParseError::EmptyHandPayload {
            field: field_name.to_string(),
        });
    }
    validate_cards_are_recognised(&cards, field_name)?;
    validate_cards_not_exceed_deck(&cards, field_name)?;
    Ok(cards)
}

/// Checks that no rank in `cards` appears more than [`MAX_COUNT_PER_RANK`] times.
pub fn validate_cards_max_four(cards: &[u8], field_name: &str) -> ParseResult<()> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for &card in cards {
        *counts.entry(card).or_insert(0) += 1;
    }

    for (&rank_code, &count) in &counts {
        if count > MAX_COUNT_PER_RANK {
            return Err(ParseError::TooManyOfRank {
                field: field_name.to_string(),
                rank: rank_text(rank_code),
                count,
                max: MAX_COUNT_PER_RANK,
            });
        }
    }

    Ok(())
}

/// Checks that no rank in `cards` appears more times than a single deck actually contains.
pub fn validate_cards_not_exceed_deck(cards: &[u8], field_name: &str) -> ParseResult<()> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for &card in cards {
        *counts.entry(card).or_insert(0) += 1;
    }

    for (&rank_code, &count) in &counts {
        let copies = deck_copies(rank_code);
        if count > copies {
            return Err(ParseError::ExceedsDeckCopies {
                field: field_name.to_string(),
                rank: rank_text(rank_code),
                count,
                deck_copies: copies,
            });
        }
    }

    Ok(())
}

fn rank_text(rank_code: u8) -> String {
    Rank::from_code(rank_code).map_or_else(|| rank_code.to_string(), |r| r.as_text().to_string())
}

/// Renders a sorted rank-code multiset as canonical upper-case card text.
///
/// An empty action renders as `"PASS"`.
#[must_use]
pub fn action_to_text(action: &[u8]) -> String {
    if action.is_empty() {
        return "PASS".to_string();
    }

    let mut sorted = action.to_vec();
    sorted.sort_unstable();
    sorted.iter().map(|&c| rank_text(c)).collect()
}

/// Renders a list of actions, each via [`action_to_text`].
#[must_use]
pub fn actions_to_text(actions: &[Vec<u8>]) -> Vec<String> {
    actions.iter().map(|a| action_to_text(a)).collect()
}

#[cfg(feature = "serde")]
mod json {
    use super::{parse_action_counts, ActionPayload};
    use crate::error::ParseError;
    use std::collections::BTreeMap;

    impl ActionPayload {
        /// Builds an [`ActionPayload`] from a JSON value accepted by the action endpoint:
        /// a string, a flat counts object, `{"counts": {...}}`, or `{"type": "pass"}`.
        pub fn from_json(value: &serde_json::Value) -> Result<Self, ParseError> {
            match value {
                serde_json::Value::String(text) => Ok(ActionPayload::Text(text.clone())),
                serde_json::Value::Object(map) => {
                    if let Some(type_value) = map.get("type") {
                        if type_value
                            .as_str()
                            .is_some_and(|s| s.eq_ignore_ascii_case("pass"))
                        {
                            return Ok(ActionPayload::Pass);
                        }
                    }

                    if let Some(counts) = map.get("counts") {
                        return Ok(ActionPayload::Counts(counts_from_json(counts)?));
                    }

                    Ok(ActionPayload::Counts(counts_from_json(value)?))
                }
                _ => Err(ParseError::UnsupportedPayloadShape),
            }
        }
    }

    fn counts_from_json(value: &serde_json::Value) -> Result<BTreeMap<String, i64>, ParseError> {
        let map = value.as_object().ok_or(ParseError::UnsupportedPayloadShape)?;
        let mut counts = BTreeMap::new();
        for (rank, raw_count) in map {
            let count = raw_count.as_i64().ok_or_else(|| ParseError::NegativeCount {
                rank: rank.clone(),
                count: -1,
            })?;
            counts.insert(rank.clone(), count);
        }
        Ok(counts)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::parser::parse_action_payload;

        #[test]
        fn pass_tag_round_trips() {
            let value = serde_json::json!({"type": "pass"});
            let payload = ActionPayload::from_json(&value).unwrap();
            assert_eq!(payload, ActionPayload::Pass);
            assert_eq!(parse_action_payload(&payload).unwrap(), Vec::<u8>::new());
        }

        #[test]
        fn counts_wrapped() {
            let value = serde_json::json!({"counts": {"3": 2, "A": 1}});
            let payload = ActionPayload::from_json(&value).unwrap();
            let cards = parse_action_payload(&payload).unwrap();
            assert_eq!(cards, vec![3, 3, 14]);
        }

        #[test]
        fn flat_counts_mapping() {
            let value = serde_json::json!({"3": 2, "X": 1});
            let payload = ActionPayload::from_json(&value).unwrap();
            let cards = parse_action_payload(&payload).unwrap();
            assert_eq!(cards, vec![3, 3, 20]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_concatenated_text() {
        assert_eq!(parse_action_text("334455").unwrap(), vec![3, 3, 4, 4, 5, 5]);
    }

    #[test]
    fn ten_token_takes_precedence() {
        let cards = parse_action_text("10JQKA2XD").unwrap();
        assert_eq!(cards, vec![10, 11, 12, 13, 14, 17, 20, 30]);
        assert_eq!(action_to_text(&cards), "10JQKA2XD");
    }

    #[test]
    fn t_is_alias_for_ten() {
        assert_eq!(parse_action_text("TT").unwrap(), vec![10, 10]);
    }

    #[test]
    fn pass_variants() {
        assert_eq!(parse_action_text("pass").unwrap(), Vec::<u8>::new());
        assert_eq!(parse_action_text("P").unwrap(), Vec::<u8>::new());
        assert_eq!(parse_action_text(" p ").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn invalid_token_names_suffix() {
        let err = parse_action_text("33Z").unwrap_err();
        assert_eq!(err, ParseError::InvalidToken { suffix: "Z".to_string() });
    }

    #[test]
    fn rejects_more_than_four_of_a_rank() {
        assert!(parse_action_text("33333").is_err());
    }

    #[test]
    fn counts_payload() {
        let mut counts = BTreeMap::new();
        counts.insert("3".to_string(), 2);
        counts.insert("A".to_string(), 1);
        counts.insert("X".to_string(), 1);
        assert_eq!(parse_action_counts(&counts).unwrap(), vec![3, 3, 14, 20]);
    }

    #[test]
    fn hand_payload_rejects_empty() {
        let payload = ActionPayload::Text("PASS".to_string());
        assert!(parse_hand_payload(&payload, "my_hand").is_err());
    }

    #[test]
    fn hand_payload_rejects_exceeding_joker_copies() {
        let payload = ActionPayload::Text("XX".to_string());
        let err = parse_hand_payload(&payload, "my_hand").unwrap_err();
        assert!(matches!(err, ParseError::ExceedsDeckCopies { .. }));
    }

    #[test]
    fn hand_payload_rejects_unrecognised_card_code() {
        let err = validate_cards_are_recognised(&[3, 4, 99], "my_hand").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnsupportedCards {
                field: "my_hand".to_string()
            }
        );
    }

    #[test]
    fn round_trip_text() {
        for text in ["334455", "10JQKA2XD", "7777", "PASS"] {
            let cards = parse_action_text(text).unwrap();
            assert_eq!(action_to_text(&cards), text.to_uppercase());
        }
    }
}
