//! Filters a hand's generated combinations down to the ones legal against
//! the current rival move (spec §4.4).

use crate::classify::{classify, classify_with_thresholds, MoveInfo, MoveKind, SerialThresholds};
use crate::generator::Generator;

/// Extracts the move the next actor must beat or pass on.
///
/// The last entry if non-empty; otherwise the entry before it, if that one
/// is itself non-empty (two consecutive passes return the lead, so there is
/// no rival to beat).
#[must_use]
pub fn rival_move(action_seq: &[Vec<u8>]) -> Option<Vec<u8>> {
    let last = action_seq.last()?;
    if !last.is_empty() {
        return Some(last.clone());
    }
    if action_seq.len() < 2 {
        return None;
    }
    let prev = &action_seq[action_seq.len() - 2];
    if prev.is_empty() {
        None
    } else {
        Some(prev.clone())
    }
}

/// True for `Bomb` and `KingBomb`.
#[must_use]
pub fn is_bomb(action: &[u8]) -> bool {
    classify(action).is_bomb()
}

fn same_kind_candidates(gen: &Generator, rival: &MoveInfo) -> Vec<Vec<u8>> {
    match rival.kind {
        MoveKind::Single => gen.singles.clone(),
        MoveKind::Pair => gen.pairs.clone(),
        MoveKind::Triple => gen.triples.clone(),
        MoveKind::TripleOne => gen.triple_one(),
        MoveKind::TripleTwo => gen.triple_two(),
        MoveKind::SerialSingle => gen.serial_singles_of_len(rival.length.unwrap_or(0)),
        MoveKind::SerialPair => gen.serial_pairs_of_len(rival.length.unwrap_or(0)),
        MoveKind::SerialTriple => gen.serial_triples_of_len(rival.length.unwrap_or(0)),
        MoveKind::SerialTripleOne => gen.serial_triple_one(rival.length),
        MoveKind::SerialTripleTwo => gen.serial_triple_two(rival.length),
        MoveKind::FourTwo => gen.four_two(),
        MoveKind::FourTwoPairs => gen.four_two_pairs(),
        MoveKind::Pass | MoveKind::Wrong | MoveKind::Bomb | MoveKind::KingBomb => Vec::new(),
    }
}

/// Every combination `hand` may legally play given the action history so far,
/// using the default (real-game) [`SerialThresholds`].
///
/// An empty `action_seq`, or one whose last two entries are both passes,
/// means the caller is leading: every combination the hand can form is
/// legal and `PASS` is not offered (the game forbids passing on a lead).
/// Otherwise the result is every strictly-greater combination of the
/// rival's kind, every bomb and the king bomb (unless the rival itself was
/// a bomb, in which case only strictly-greater bombs and the king bomb
/// apply), plus the empty multiset for `PASS`.
#[must_use]
pub fn legal_actions(hand: &[u8], action_seq: &[Vec<u8>]) -> Vec<Vec<u8>> {
    legal_actions_with_thresholds(hand, action_seq, SerialThresholds::default())
}

/// As [`legal_actions`], with caller-supplied minimum serial-run lengths —
/// how a [`GameState`](crate::state::GameState) threads its configured
/// [`GameRules`](crate::state::GameRules) into filtering.
#[must_use]
pub fn legal_actions_with_thresholds(hand: &[u8], action_seq: &[Vec<u8>], thresholds: SerialThresholds) -> Vec<Vec<u8>> {
    let gen = Generator::with_thresholds(hand, thresholds);

    let Some(rival) = rival_move(action_seq) else {
        return gen.gen_all();
    };

    let rival_info = classify_with_thresholds(&rival, thresholds);

    let mut out = match rival_info.kind {
        MoveKind::KingBomb => return Vec::new(),
        MoveKind::Bomb => {
            let rank = rival_info.rank.unwrap_or(0);
            let mut beating: Vec<Vec<u8>> = gen.bombs.iter().filter(|b| b[0] > rank).cloned().collect();
            beating.extend(gen.king_bomb.iter().cloned());
            beating
        }
        _ => {
            let rank = rival_info.rank.unwrap_or(0);
            let mut beating: Vec<Vec<u8>> = same_kind_candidates(&gen, &rival_info)
                .into_iter()
                .filter(|c| classify_with_thresholds(c, thresholds).rank.is_some_and(|r| r > rank))
                .collect();
            beating.extend(gen.bombs.iter().cloned());
            beating.extend(gen.king_bomb.iter().cloned());
            beating
        }
    };

    out.push(Vec::new());
    for combo in &mut out {
        combo.sort_unstable();
    }
    out
}

/// Checks whether `action` can legally follow `rival_move`, using only what
/// is visible from the two multisets (no hidden hand information), with the
/// default (real-game) [`SerialThresholds`].
///
/// This is the predicate [`legal_actions`] implicitly enforces; exposed
/// standalone so the state machine can validate an opponent's reported
/// action without re-deriving the opponent's whole hand.
#[must_use]
pub fn is_action_compatible_with_rival(action: &[u8], rival: &[u8]) -> bool {
    is_action_compatible_with_rival_with_thresholds(action, rival, SerialThresholds::default())
}

/// As [`is_action_compatible_with_rival`], with caller-supplied minimum
/// serial-run lengths.
#[must_use]
pub fn is_action_compatible_with_rival_with_thresholds(action: &[u8], rival: &[u8], thresholds: SerialThresholds) -> bool {
    let mut action = action.to_vec();
    action.sort_unstable();
    let mut rival = rival.to_vec();
    rival.sort_unstable();

    if action.is_empty() {
        return !rival.is_empty();
    }

    let action_info = classify_with_thresholds(&action, thresholds);
    if action_info.kind == MoveKind::Wrong {
        return false;
    }

    if rival.is_empty() {
        return true;
    }

    let rival_info = classify_with_thresholds(&rival, thresholds);

    if action_info.kind == MoveKind::KingBomb {
        return rival_info.kind != MoveKind::KingBomb;
    }

    if action_info.kind == MoveKind::Bomb {
        if rival_info.kind == MoveKind::KingBomb {
            return false;
        }
        if rival_info.kind == MoveKind::Bomb {
            return action_info.rank > rival_info.rank;
        }
        return true;
    }

    if matches!(rival_info.kind, MoveKind::Bomb | MoveKind::KingBomb) {
        return false;
    }

    if action_info.kind != rival_info.kind {
        return false;
    }

    if action_info.length != rival_info.length {
        return false;
    }

    action_info.rank > rival_info.rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{action_to_text, parse_action_text};

    fn hand(text: &str) -> Vec<u8> {
        parse_action_text(text).unwrap()
    }

    fn as_text_set(actions: &[Vec<u8>]) -> std::collections::BTreeSet<String> {
        actions.iter().map(|a| action_to_text(a)).collect()
    }

    #[test]
    fn s1_scenario_from_spec() {
        let h = hand("345XD");
        let seq = vec![hand("4")];
        let legal = legal_actions(&h, &seq);
        let rendered = as_text_set(&legal);
        assert!(rendered.contains("5"));
        assert!(rendered.contains("X"));
        assert!(rendered.contains("D"));
        assert!(rendered.contains("XD"));
        assert!(rendered.contains("PASS"));
        assert!(!rendered.contains("3"));
    }

    #[test]
    fn leading_returns_gen_all_without_pass() {
        let h = hand("345");
        let legal = legal_actions(&h, &[]);
        let rendered = as_text_set(&legal);
        assert!(!rendered.contains("PASS"));
        assert!(rendered.contains("3"));
    }

    #[test]
    fn two_consecutive_passes_return_lead() {
        let h = hand("345");
        let seq = vec![hand("4"), Vec::new(), Vec::new()];
        let legal = legal_actions(&h, &seq);
        assert!(!as_text_set(&legal).contains("PASS"));
    }

    #[test]
    fn king_bomb_rival_yields_no_follow() {
        let h = hand("77779999");
        let seq = vec![hand("XD")];
        assert!(legal_actions(&h, &seq).is_empty());
    }

    #[test]
    fn bomb_rival_only_beaten_by_higher_bomb_or_king_bomb() {
        let h = hand("33339999XD");
        let seq = vec![hand("5555")];
        let legal = legal_actions(&h, &seq);
        let rendered = as_text_set(&legal);
        assert!(rendered.contains("9999"));
        assert!(rendered.contains("XD"));
        assert!(!rendered.contains("3333"));
        assert!(rendered.contains("PASS"));
    }

    #[test]
    fn compatibility_matches_classify() {
        assert!(is_action_compatible_with_rival(&hand("7777"), &hand("5")));
        assert!(!is_action_compatible_with_rival(&hand("6"), &hand("7")));
        assert!(is_action_compatible_with_rival(&hand("XD"), &hand("7777")));
        assert!(!is_action_compatible_with_rival(&[], &[]));
    }
}
