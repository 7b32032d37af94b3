//! Pure classification of a sorted multiset of rank codes into a [`MoveInfo`].

use std::collections::BTreeMap;

/// Minimum length of a legal serial-single run.
pub const MIN_SERIAL_SINGLE_LEN: usize = 5;
/// Minimum length of a legal serial-pair run.
pub const MIN_SERIAL_PAIR_LEN: usize = 3;
/// Minimum length of a legal serial-triple run (airplane).
pub const MIN_SERIAL_TRIPLE_LEN: usize = 2;

/// Configurable floors for the three serial move families.
///
/// [`classify`] and [`Generator`](crate::generator::Generator) use
/// [`SerialThresholds::default`] (5/3/2, the real Dou Dizhu minimums) unless
/// a caller supplies its own via [`classify_with_thresholds`] — this is how
/// [`GameState`](crate::state::GameState) threads its configured
/// [`GameRules`](crate::state::GameRules) through instead of the fixed
/// module-level constants. Raising a floor is always safe; a run shorter
/// than the *structural* minimum baked into `classify`'s size dispatch (5
/// for singles, 3 for pairs, 2 for triples) can never be reached regardless
/// of how low a threshold is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialThresholds {
    /// Minimum length of a legal serial-single run.
    pub min_serial_single_len: usize,
    /// Minimum length of a legal serial-pair run.
    pub min_serial_pair_len: usize,
    /// Minimum length of a legal serial-triple run (airplane).
    pub min_serial_triple_len: usize,
}

impl Default for SerialThresholds {
    fn default() -> Self {
        Self {
            min_serial_single_len: MIN_SERIAL_SINGLE_LEN,
            min_serial_pair_len: MIN_SERIAL_PAIR_LEN,
            min_serial_triple_len: MIN_SERIAL_TRIPLE_LEN,
        }
    }
}

/// The recognised combination kinds (spec §3, §4.2).
///
/// `Pass` and `Wrong` are terminal tags used by the filter and state machine
/// but never emitted as a *legal* candidate by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// An empty action.
    Pass,
    /// A single card.
    Single,
    /// A pair of equal rank.
    Pair,
    /// Three of a rank.
    Triple,
    /// Four of a rank.
    Bomb,
    /// Both jokers.
    KingBomb,
    /// Triple plus one distinct single kicker.
    TripleOne,
    /// Triple plus one distinct pair kicker.
    TripleTwo,
    /// A run of `length` consecutive singles, `length >= 5`.
    SerialSingle,
    /// A run of `length` consecutive pairs, `length >= 3`.
    SerialPair,
    /// A run of `length` consecutive triples (airplane), `length >= 2`.
    SerialTriple,
    /// `length` consecutive triples plus `length` single/pair kickers.
    SerialTripleOne,
    /// `length` consecutive triples plus `length` distinct pair kickers.
    SerialTripleTwo,
    /// A bomb plus two distinct singles or one pair.
    FourTwo,
    /// A bomb plus two distinct pairs.
    FourTwoPairs,
    /// Not a legal Dou Dizhu combination.
    Wrong,
}

/// The result of classifying a multiset of rank codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveInfo {
    /// The recognised kind.
    pub kind: MoveKind,
    /// Comparison rank, present for every kind except `Pass`, `KingBomb`, and `Wrong`.
    pub rank: Option<u8>,
    /// Run length, present only for the five serial kinds.
    pub length: Option<usize>,
}

impl MoveInfo {
    const fn new(kind: MoveKind, rank: Option<u8>, length: Option<usize>) -> Self {
        Self { kind, rank, length }
    }

    const fn pass() -> Self {
        Self::new(MoveKind::Pass, None, None)
    }

    const fn wrong() -> Self {
        Self::new(MoveKind::Wrong, None, None)
    }

    const fn king_bomb() -> Self {
        Self::new(MoveKind::KingBomb, None, None)
    }

    const fn rank_only(kind: MoveKind, rank: u8) -> Self {
        Self::new(kind, Some(rank), None)
    }

    const fn serial(kind: MoveKind, rank: u8, length: usize) -> Self {
        Self::new(kind, Some(rank), Some(length))
    }

    /// True for `Bomb` and `KingBomb` — the two kinds that can override any non-bomb play.
    #[must_use]
    pub fn is_bomb(&self) -> bool {
        matches!(self.kind, MoveKind::Bomb | MoveKind::KingBomb)
    }
}

fn is_continuous_seq(values: &[u8]) -> bool {
    values.windows(2).all(|w| w[1] - w[0] == 1)
}

fn counter(cards: &[u8]) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for &card in cards {
        *counts.entry(card).or_insert(0) += 1;
    }
    counts
}

/// Classifies a sorted multiset of rank codes per spec §4.2, using the
/// default (real-game) [`SerialThresholds`].
///
/// The input need not be pre-sorted; `classify` sorts defensively.
#[must_use]
pub fn classify(cards: &[u8]) -> MoveInfo {
    classify_with_thresholds(cards, SerialThresholds::default())
}

/// As [`classify`], but with caller-supplied minimum serial-run lengths.
#[must_use]
pub fn classify_with_thresholds(cards: &[u8], thresholds: SerialThresholds) -> MoveInfo {
    let mut move_: Vec<u8> = cards.to_vec();
    move_.sort_unstable();
    let size = move_.len();
    let move_dict = counter(&move_);

    match size {
        0 => return MoveInfo::pass(),
        1 => return MoveInfo::rank_only(MoveKind::Single, move_[0]),
        2 => {
            if move_[0] == move_[1] {
                return MoveInfo::rank_only(MoveKind::Pair, move_[0]);
            }
            if move_ == [20, 30] {
                return MoveInfo::king_bomb();
            }
            return MoveInfo::wrong();
        }
        3 => {
            if move_dict.len() == 1 {
                return MoveInfo::rank_only(MoveKind::Triple, move_[0]);
            }
            return MoveInfo::wrong();
        }
        4 => {
            if move_dict.len() == 1 {
                return MoveInfo::rank_only(MoveKind::Bomb, move_[0]);
            }
            if move_dict.len() == 2 {
                if move_[0] == move_[1] && move_[1] == move_[2] || move_[1] == move_[2] && move_[2] == move_[3] {
                    return MoveInfo::rank_only(MoveKind::TripleOne, move_[1]);
                }
                return MoveInfo::wrong();
            }
            return MoveInfo::wrong();
        }
        _ => {}
    }

    if is_continuous_seq(&move_) && size >= thresholds.min_serial_single_len {
        return MoveInfo::serial(MoveKind::SerialSingle, move_[0], size);
    }

    if size == 5 {
        if move_dict.len() == 2 {
            return MoveInfo::rank_only(MoveKind::TripleTwo, move_[2]);
        }
        return MoveInfo::wrong();
    }

    let mut count_dict: BTreeMap<usize, usize> = BTreeMap::new();
    for &count in move_dict.values() {
        *count_dict.entry(count).or_insert(0) += 1;
    }

    if size == 6
        && (move_dict.len() == 2 || move_dict.len() == 3)
        && count_dict.get(&4) == Some(&1)
        && (count_dict.get(&2) == Some(&1) || count_dict.get(&1) == Some(&2))
    {
        return MoveInfo::rank_only(MoveKind::FourTwo, move_[2]);
    }

    if size == 8
        && (((move_dict.len() == 3 || move_dict.len() == 2)
            && count_dict.get(&4) == Some(&1)
            && count_dict.get(&2) == Some(&2))
            || count_dict.get(&4) == Some(&2))
    {
        let rank = move_dict
            .iter()
            .filter(|(_, &count)| count == 4)
            .map(|(&rank, _)| rank)
            .max()
            .expect("size==8 branch guarantees at least one quad");
        return MoveInfo::rank_only(MoveKind::FourTwoPairs, rank);
    }

    let md_keys: Vec<u8> = move_dict.keys().copied().collect();

    if move_dict.len() == *count_dict.get(&2).unwrap_or(&0)
        && is_continuous_seq(&md_keys)
        && md_keys.len() >= thresholds.min_serial_pair_len
    {
        return MoveInfo::serial(MoveKind::SerialPair, md_keys[0], md_keys.len());
    }

    if move_dict.len() == *count_dict.get(&3).unwrap_or(&0)
        && is_continuous_seq(&md_keys)
        && md_keys.len() >= thresholds.min_serial_triple_len
    {
        return MoveInfo::serial(MoveKind::SerialTriple, md_keys[0], md_keys.len());
    }

    if *count_dict.get(&3).unwrap_or(&0) >= thresholds.min_serial_triple_len {
        let mut serial_3 = Vec::new();
        let mut singles = 0usize;
        let mut pairs = 0usize;

        for (&rank, &count) in &move_dict {
            match count {
                3 => serial_3.push(rank),
                1 => singles += 1,
                2 => pairs += 1,
                _ => return MoveInfo::wrong(),
            }
        }

        serial_3.sort_unstable();

        if is_continuous_seq(&serial_3) {
            if serial_3.len() == singles + pairs * 2 {
                return MoveInfo::serial(MoveKind::SerialTripleOne, serial_3[0], serial_3.len());
            }
            if serial_3.len() == pairs && move_dict.len() == serial_3.len() * 2 {
                return MoveInfo::serial(MoveKind::SerialTripleTwo, serial_3[0], serial_3.len());
            }
        }

        if serial_3.len() == 4 {
            if is_continuous_seq(&serial_3[1..]) {
                return MoveInfo::serial(MoveKind::SerialTripleOne, serial_3[1], 3);
            }
            if is_continuous_seq(&serial_3[..3]) {
                return MoveInfo::serial(MoveKind::SerialTripleOne, serial_3[0], 3);
            }
        }
    }

    MoveInfo::wrong()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_king_bomb() {
        assert_eq!(classify(&[20, 30]).kind, MoveKind::KingBomb);
    }

    #[test]
    fn raised_serial_single_threshold_rejects_shorter_runs() {
        let thresholds = SerialThresholds {
            min_serial_single_len: 6,
            ..SerialThresholds::default()
        };
        assert_eq!(classify(&[3, 4, 5, 6, 7]).kind, MoveKind::SerialSingle);
        assert_eq!(classify_with_thresholds(&[3, 4, 5, 6, 7], thresholds).kind, MoveKind::Wrong);
        assert_eq!(
            classify_with_thresholds(&[3, 4, 5, 6, 7, 8], thresholds).kind,
            MoveKind::SerialSingle
        );
    }

    #[test]
    fn classify_bomb() {
        let info = classify(&[7, 7, 7, 7]);
        assert_eq!(info.kind, MoveKind::Bomb);
        assert_eq!(info.rank, Some(7));
    }

    #[test]
    fn classify_wrong_pair_like() {
        assert_eq!(classify(&[3, 4]).kind, MoveKind::Wrong);
    }

    #[test]
    fn classify_serial_triple_one() {
        // triples 3,4 + kickers 5,6
        let info = classify(&[3, 3, 3, 4, 4, 4, 5, 6]);
        assert_eq!(info.kind, MoveKind::SerialTripleOne);
        assert_eq!(info.rank, Some(3));
        assert_eq!(info.length, Some(2));
    }

    #[test]
    fn classify_four_triple_relaxation() {
        // triples {3,4,5,7}; 4-triple run with 7 non-consecutive -> 3-run {3,4,5}
        let cards = [3, 3, 3, 4, 4, 4, 5, 5, 5, 6, 7, 7, 7, 8];
        let info = classify(&cards);
        assert_eq!(info.kind, MoveKind::SerialTripleOne);
        assert_eq!(info.length, Some(3));
        assert_eq!(info.rank, Some(3));
    }

    #[test]
    fn classify_totality_never_panics() {
        // A representative sweep: classify must always return, never panic.
        let samples: [&[u8]; 6] = [
            &[],
            &[3],
            &[3, 3, 3, 3, 3],
            &[3, 4, 5, 6, 7],
            &[3, 3, 4, 4, 5, 5, 6, 6],
            &[20, 30, 3, 3],
        ];
        for sample in samples {
            let _ = classify(sample);
        }
    }

    #[test]
    fn classify_serial_pair_and_triple() {
        assert_eq!(classify(&[3, 3, 4, 4, 5, 5]).kind, MoveKind::SerialPair);
        assert_eq!(classify(&[3, 3, 3, 4, 4, 4]).kind, MoveKind::SerialTriple);
    }

    #[test]
    fn classify_four_two_and_four_two_pairs() {
        let four_two = classify(&[7, 7, 7, 7, 3, 9]);
        assert_eq!(four_two.kind, MoveKind::FourTwo);
        assert_eq!(four_two.rank, Some(7));

        let four_two_pairs = classify(&[7, 7, 7, 7, 3, 3, 9, 9]);
        assert_eq!(four_two_pairs.kind, MoveKind::FourTwoPairs);
        assert_eq!(four_two_pairs.rank, Some(7));
    }
}
