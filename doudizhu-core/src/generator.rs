//! Enumerates every legal combination playable from a concrete hand.
//!
//! [`Generator`] is a pure, re-entrant view over a hand: it precomputes the
//! atomic combinations (singles/pairs/triples/bombs/king bomb) at
//! construction and derives the composite kinds (triple+kicker, serials,
//! airplane-with-wings, bomb+kickers) on demand.

use std::collections::BTreeMap;

use crate::classify::{classify, MoveKind, SerialThresholds};

/// A pure utility over one hand that enumerates every legal combination of each kind.
///
/// Construction is `O(hand.len())`; every `*_of_len` / composite method is computed
/// on demand and does not mutate or cache beyond the atomic combination lists.
#[derive(Debug, Clone)]
pub struct Generator {
    hand: Vec<u8>,
    counts: BTreeMap<u8, usize>,
    thresholds: SerialThresholds,
    /// Every single card in the hand, one combination per card.
    pub singles: Vec<Vec<u8>>,
    /// Every pair the hand can form (one per rank with count >= 2).
    pub pairs: Vec<Vec<u8>>,
    /// Every triple the hand can form (one per rank with count >= 3).
    pub triples: Vec<Vec<u8>>,
    /// Every bomb the hand can form (one per rank with count == 4).
    pub bombs: Vec<Vec<u8>>,
    /// The king bomb, if the hand holds both jokers.
    pub king_bomb: Vec<Vec<u8>>,
}

fn counter(cards: &[u8]) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for &card in cards {
        *counts.entry(card).or_insert(0) += 1;
    }
    counts
}

/// Splits a sorted, distinct rank list into maximal consecutive runs.
fn maximal_runs(ranks: &[u8]) -> Vec<Vec<u8>> {
    let mut runs = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for &rank in ranks {
        if let Some(&last) = current.last() {
            if rank == last + 1 {
                current.push(rank);
                continue;
            }
            runs.push(std::mem::take(&mut current));
        }
        current.push(rank);
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Emits every contiguous sub-run of `run` with length `>= min_len`, or (when
/// `exact_len` is set) only sub-runs of that exact length.
fn sub_runs(run: &[u8], min_len: usize, exact_len: Option<usize>) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    if run.len() < min_len {
        return out;
    }

    if let Some(len) = exact_len {
        if len < min_len || len > run.len() {
            return out;
        }
        for start in 0..=(run.len() - len) {
            out.push(run[start..start + len].to_vec());
        }
        return out;
    }

    for len in min_len..=run.len() {
        for start in 0..=(run.len() - len) {
            out.push(run[start..start + len].to_vec());
        }
    }
    out
}

/// Enumerates all k-combinations of "kicker" ranks from `candidates`, each
/// contributing either one card (a single) or two cards (a pair, only when
/// `counts[rank] >= 2`), summing to exactly `k` cards. Every rank is used at
/// most once, which avoids the raw-card-identity duplicates a naive
/// combinations-of-cards approach would produce.
fn kicker_combos(candidates: &[u8], counts: &BTreeMap<u8, usize>, k: usize) -> Vec<Vec<u8>> {
    fn go(
        idx: usize,
        candidates: &[u8],
        counts: &BTreeMap<u8, usize>,
        remaining: usize,
        current: &mut Vec<u8>,
        out: &mut Vec<Vec<u8>>,
    ) {
        if remaining == 0 {
            out.push(current.clone());
            return;
        }
        if idx >= candidates.len() {
            return;
        }

        let rank = candidates[idx];
        let count = *counts.get(&rank).unwrap_or(&0);

        go(idx + 1, candidates, counts, remaining, current, out);

        if count >= 1 && remaining >= 1 {
            current.push(rank);
            go(idx + 1, candidates, counts, remaining - 1, current, out);
            current.pop();
        }

        if count >= 2 && remaining >= 2 {
            current.push(rank);
            current.push(rank);
            go(idx + 1, candidates, counts, remaining - 2, current, out);
            current.pop();
            current.pop();
        }
    }

    let mut out = Vec::new();
    let mut current = Vec::new();
    go(0, candidates, counts, k, &mut current, &mut out);
    out
}

/// All k-combinations of distinct ranks drawn from `candidates`.
fn rank_combinations(candidates: &[u8], k: usize) -> Vec<Vec<u8>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if candidates.len() < k {
        return Vec::new();
    }

    let mut out = Vec::new();
    for (i, &first) in candidates.iter().enumerate() {
        for mut rest in rank_combinations(&candidates[i + 1..], k - 1) {
            rest.insert(0, first);
            out.push(rest);
        }
    }
    out
}

impl Generator {
    /// Builds a generator over `hand`, precomputing the atomic combination kinds,
    /// using the default (real-game) [`SerialThresholds`].
    #[must_use]
    pub fn new(hand: &[u8]) -> Self {
        Self::with_thresholds(hand, SerialThresholds::default())
    }

    /// As [`Generator::new`], with caller-supplied minimum serial-run lengths —
    /// how a [`GameState`](crate::state::GameState) threads its configured
    /// [`GameRules`](crate::state::GameRules) into enumeration.
    #[must_use]
    pub fn with_thresholds(hand: &[u8], thresholds: SerialThresholds) -> Self {
        let mut sorted_hand = hand.to_vec();
        sorted_hand.sort_unstable();
        let counts = counter(&sorted_hand);

        let singles = counts.keys().map(|&r| vec![r]).collect();
        let pairs = counts
            .iter()
            .filter(|(_, &c)| c >= 2)
            .map(|(&r, _)| vec![r, r])
            .collect();
        let triples = counts
            .iter()
            .filter(|(_, &c)| c >= 3)
            .map(|(&r, _)| vec![r, r, r])
            .collect();
        let bombs = counts
            .iter()
            .filter(|(_, &c)| c == 4)
            .map(|(&r, _)| vec![r, r, r, r])
            .collect();
        let king_bomb = if counts.contains_key(&20) && counts.contains_key(&30) {
            vec![vec![20, 30]]
        } else {
            Vec::new()
        };

        Self {
            hand: sorted_hand,
            counts,
            thresholds,
            singles,
            pairs,
            triples,
            bombs,
            king_bomb,
        }
    }

    fn ranks_with_count_at_least(&self, min_count: usize) -> Vec<u8> {
        self.counts
            .iter()
            .filter(|(_, &c)| c >= min_count)
            .map(|(&r, _)| r)
            .collect()
    }

    /// Every `TripleOne` combination: a triple plus any one distinct single kicker.
    #[must_use]
    pub fn triple_one(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        for triple in &self.triples {
            let triple_rank = triple[0];
            for single in &self.singles {
                if single[0] != triple_rank {
                    let mut combo = triple.clone();
                    combo.extend(single);
                    out.push(combo);
                }
            }
        }
        out
    }

    /// Every `TripleTwo` combination: a triple plus any one distinct pair kicker.
    #[must_use]
    pub fn triple_two(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        for triple in &self.triples {
            let triple_rank = triple[0];
            for pair in &self.pairs {
                if pair[0] != triple_rank {
                    let mut combo = triple.clone();
                    combo.extend(pair);
                    out.push(combo);
                }
            }
        }
        out
    }

    fn serial_from(&self, min_multiplicity: usize, copies: usize, min_len: usize, exact_len: Option<usize>) -> Vec<Vec<u8>> {
        let ranks = self.ranks_with_count_at_least(min_multiplicity);
        let mut out = Vec::new();
        for run in maximal_runs(&ranks) {
            for sub in sub_runs(&run, min_len, exact_len) {
                let mut combo = Vec::new();
                for rank in sub {
                    for _ in 0..copies {
                        combo.push(rank);
                    }
                }
                out.push(combo);
            }
        }
        out
    }

    /// Every serial-single run of length `>= self.thresholds.min_serial_single_len`.
    #[must_use]
    pub fn serial_singles(&self) -> Vec<Vec<u8>> {
        self.serial_from(1, 1, self.thresholds.min_serial_single_len, None)
    }

    /// Every serial-single run of exactly `len` cards.
    #[must_use]
    pub fn serial_singles_of_len(&self, len: usize) -> Vec<Vec<u8>> {
        self.serial_from(1, 1, self.thresholds.min_serial_single_len, Some(len))
    }

    /// Every serial-pair run of length `>= self.thresholds.min_serial_pair_len`.
    #[must_use]
    pub fn serial_pairs(&self) -> Vec<Vec<u8>> {
        self.serial_from(2, 2, self.thresholds.min_serial_pair_len, None)
    }

    /// Every serial-pair run of exactly `len` pairs.
    #[must_use]
    pub fn serial_pairs_of_len(&self, len: usize) -> Vec<Vec<u8>> {
        self.serial_from(2, 2, self.thresholds.min_serial_pair_len, Some(len))
    }

    /// Every serial-triple (airplane) run of length `>= self.thresholds.min_serial_triple_len`.
    #[must_use]
    pub fn serial_triples(&self) -> Vec<Vec<u8>> {
        self.serial_from(3, 3, self.thresholds.min_serial_triple_len, None)
    }

    /// Every serial-triple (airplane) run of exactly `len` triples.
    #[must_use]
    pub fn serial_triples_of_len(&self, len: usize) -> Vec<Vec<u8>> {
        self.serial_from(3, 3, self.thresholds.min_serial_triple_len, Some(len))
    }

    /// Every `SerialTripleOne(len)` combination, optionally constrained to an exact airplane length.
    #[must_use]
    pub fn serial_triple_one(&self, exact_len: Option<usize>) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let airplanes = match exact_len {
            Some(len) => self.serial_triples_of_len(len),
            None => self.serial_triples(),
        };

        for airplane in airplanes {
            let triple_ranks: std::collections::BTreeSet<u8> = airplane.iter().copied().collect();
            let k = triple_ranks.len();
            let candidates: Vec<u8> = self
                .counts
                .keys()
                .copied()
                .filter(|r| !triple_ranks.contains(r))
                .collect();

            for kickers in kicker_combos(&candidates, &self.counts, k) {
                let mut combo = airplane.clone();
                combo.extend(kickers);
                out.push(combo);
            }
        }
        out
    }

    /// Every `SerialTripleTwo(len)` combination, optionally constrained to an exact airplane length.
    #[must_use]
    pub fn serial_triple_two(&self, exact_len: Option<usize>) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let airplanes = match exact_len {
            Some(len) => self.serial_triples_of_len(len),
            None => self.serial_triples(),
        };

        for airplane in airplanes {
            let triple_ranks: std::collections::BTreeSet<u8> = airplane.iter().copied().collect();
            let k = triple_ranks.len();
            let pair_candidates: Vec<u8> = self
                .ranks_with_count_at_least(2)
                .into_iter()
                .filter(|r| !triple_ranks.contains(r))
                .collect();

            for combo_ranks in rank_combinations(&pair_candidates, k) {
                let mut combo = airplane.clone();
                for rank in combo_ranks {
                    combo.push(rank);
                    combo.push(rank);
                }
                out.push(combo);
            }
        }
        out
    }

    /// Every `FourTwo` combination: a bomb plus any two distinct singles, or one pair.
    #[must_use]
    pub fn four_two(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        for bomb in &self.bombs {
            let bomb_rank = bomb[0];
            let candidates: Vec<u8> = self.counts.keys().copied().filter(|&r| r != bomb_rank).collect();
            for kickers in kicker_combos(&candidates, &self.counts, 2) {
                let mut combo = bomb.clone();
                combo.extend(kickers);
                out.push(combo);
            }
        }
        out
    }

    /// Every `FourTwoPairs` combination: a bomb plus two distinct pairs.
    #[must_use]
    pub fn four_two_pairs(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        for bomb in &self.bombs {
            let bomb_rank = bomb[0];
            let pair_candidates: Vec<u8> = self
                .ranks_with_count_at_least(2)
                .into_iter()
                .filter(|&r| r != bomb_rank)
                .collect();
            for combo_ranks in rank_combinations(&pair_candidates, 2) {
                let mut combo = bomb.clone();
                for rank in combo_ranks {
                    combo.push(rank);
                    combo.push(rank);
                }
                out.push(combo);
            }
        }
        out
    }

    /// Concatenation of every kind, in the kind order spec.md §4.3 lists them — used
    /// when the caller is leading (no rival to beat).
    #[must_use]
    pub fn gen_all(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        out.extend(self.singles.iter().cloned());
        out.extend(self.pairs.iter().cloned());
        out.extend(self.triples.iter().cloned());
        out.extend(self.bombs.iter().cloned());
        out.extend(self.king_bomb.iter().cloned());
        out.extend(self.triple_one());
        out.extend(self.triple_two());
        out.extend(self.serial_singles());
        out.extend(self.serial_pairs());
        out.extend(self.serial_triples());
        out.extend(self.serial_triple_one(None));
        out.extend(self.serial_triple_two(None));
        out.extend(self.four_two());
        out.extend(self.four_two_pairs());

        for combo in &mut out {
            combo.sort_unstable();
        }
        out
    }

    /// The hand this generator was built over.
    #[must_use]
    pub fn hand(&self) -> &[u8] {
        &self.hand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<u8>) -> Vec<u8> {
        v.sort_unstable();
        v
    }

    #[test]
    fn soundness_every_combo_is_sub_multiset_and_legal() {
        let hand = [3, 3, 3, 4, 4, 4, 5, 6, 7, 8, 9, 20, 30];
        let gen = Generator::new(&hand);
        let hand_counts = counter(&hand);

        for combo in gen.gen_all() {
            let combo_counts = counter(&combo);
            for (rank, count) in &combo_counts {
                assert!(
                    hand_counts.get(rank).copied().unwrap_or(0) >= *count,
                    "combo {combo:?} uses more of rank {rank} than the hand has"
                );
            }
            let info = classify(&combo);
            assert!(!matches!(info.kind, MoveKind::Pass | MoveKind::Wrong), "combo {combo:?} classified as {:?}", info.kind);
        }
    }

    #[test]
    fn generates_serial_single_runs() {
        let hand = [3, 4, 5, 6, 7, 8];
        let gen = Generator::new(&hand);
        let runs = gen.serial_singles();
        assert!(runs.iter().any(|r| sorted(r.clone()) == vec![3, 4, 5, 6, 7]));
        assert!(runs.iter().any(|r| sorted(r.clone()) == vec![4, 5, 6, 7, 8]));
        assert!(runs.iter().any(|r| sorted(r.clone()) == vec![3, 4, 5, 6, 7, 8]));
    }

    #[test]
    fn breaks_run_at_two_and_jokers() {
        let hand = [12, 13, 14, 17, 20, 30];
        let gen = Generator::new(&hand);
        assert!(gen.serial_singles().is_empty());
    }

    #[test]
    fn triple_one_excludes_same_rank_kicker() {
        let hand = [5, 5, 5, 5, 9];
        let gen = Generator::new(&hand);
        let combos = gen.triple_one();
        assert!(combos.iter().all(|c| {
            let counts = counter(c);
            counts.get(&5) == Some(&3) && counts.get(&9) == Some(&1)
        }));
    }

    #[test]
    fn serial_triple_one_generates_kickers() {
        let hand = [3, 3, 3, 4, 4, 4, 5, 6];
        let gen = Generator::new(&hand);
        let combos = gen.serial_triple_one(None);
        assert!(combos.iter().any(|c| sorted(c.clone()) == vec![3, 3, 3, 4, 4, 4, 5, 6]));
    }

    #[test]
    fn four_two_pairs_excludes_bomb_rank() {
        let hand = [9, 9, 9, 9, 3, 3, 5, 5];
        let gen = Generator::new(&hand);
        let combos = gen.four_two_pairs();
        assert_eq!(combos.len(), 1);
        assert_eq!(sorted(combos[0].clone()), vec![3, 3, 5, 5, 9, 9, 9, 9]);
    }
}
