//! The per-session game state machine: turn order, action application,
//! partial-information tracking, undo, and termination.

use std::collections::BTreeMap;
use std::fmt;

use crate::card::full_deck;
use crate::classify::{classify_with_thresholds, MoveKind, SerialThresholds};
use crate::error::{ValidationError, ValidationResult};
use crate::filter::{is_action_compatible_with_rival_with_thresholds, is_bomb, legal_actions_with_thresholds, rival_move};
use crate::parser::action_to_text;

/// Tuning knobs for the state machine; spec defaults are hard Dou Dizhu rules,
/// factored out so alternate table sizes and minimum serial-run lengths can
/// be exercised in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    /// Cards dealt to each non-landlord seat before the bottom is revealed.
    pub hand_size_non_landlord: usize,
    /// Size of the bottom (kitty) dealt to the landlord.
    pub bottom_size: usize,
    /// Landlord's hand size once the bottom is merged in.
    pub landlord_start_size: usize,
    /// Minimum length of a legal serial-single run.
    pub min_serial_single_len: usize,
    /// Minimum length of a legal serial-pair run.
    pub min_serial_pair_len: usize,
    /// Minimum length of a legal serial-triple run (airplane).
    pub min_serial_triple_len: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            hand_size_non_landlord: 17,
            bottom_size: 3,
            landlord_start_size: 20,
            min_serial_single_len: 5,
            min_serial_pair_len: 3,
            min_serial_triple_len: 2,
        }
    }
}

impl GameRules {
    /// The [`SerialThresholds`] this configuration implies for the classifier,
    /// generator, and filter.
    #[must_use]
    pub fn serial_thresholds(&self) -> SerialThresholds {
        SerialThresholds {
            min_serial_single_len: self.min_serial_single_len,
            min_serial_pair_len: self.min_serial_pair_len,
            min_serial_triple_len: self.min_serial_triple_len,
        }
    }
}

/// One of the three seats at a Dou Dizhu table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Role {
    /// The bidder who took the bottom cards.
    Landlord,
    /// The farmer seated after the landlord.
    LandlordDown,
    /// The farmer seated before the landlord.
    LandlordUp,
}

/// Seating order: `Landlord -> LandlordDown -> LandlordUp -> Landlord`.
pub const ROLE_ORDER: [Role; 3] = [Role::Landlord, Role::LandlordDown, Role::LandlordUp];

impl Role {
    /// The seat that acts after this one.
    #[must_use]
    pub fn next(self) -> Self {
        let idx = ROLE_ORDER.iter().position(|&r| r == self).expect("Role is always one of ROLE_ORDER");
        ROLE_ORDER[(idx + 1) % ROLE_ORDER.len()]
    }

    /// The contract role name used in the information set and role-keyed maps.
    #[must_use]
    pub fn as_text(self) -> &'static str {
        match self {
            Role::Landlord => "landlord",
            Role::LandlordDown => "landlord_down",
            Role::LandlordUp => "landlord_up",
        }
    }

    /// Parses a role name as used in the information set contract.
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "landlord" => Some(Role::Landlord),
            "landlord_down" => Some(Role::LandlordDown),
            "landlord_up" => Some(Role::LandlordUp),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// The side that won the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Winner {
    /// The landlord emptied their hand first.
    Landlord,
    /// One of the two farmers emptied their hand first.
    Farmer,
}

/// One recorded step in the action log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLogEntry {
    /// Seat that took the action.
    pub actor: Role,
    /// Sorted rank-code multiset played (empty for a pass).
    pub action: Vec<u8>,
}

fn counter(cards: &[u8]) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for &card in cards {
        *counts.entry(card).or_insert(0) += 1;
    }
    counts
}

fn remove_one(hand: &mut Vec<u8>, card: u8) -> bool {
    if let Some(pos) = hand.iter().position(|&c| c == card) {
        hand.remove(pos);
        true
    } else {
        false
    }
}

/// The immutable starting configuration a [`GameState`] was created from.
///
/// Kept around so [`GameState::undo`] can reconstruct the initial runtime
/// state and replay the trimmed log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    user_role: Role,
    initial_my_hand: Vec<u8>,
    initial_three_bottom: Vec<u8>,
    rules: GameRules,
}

impl GameConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.initial_my_hand.len() != self.rules.hand_size_non_landlord {
            return Err(ValidationError::WrongHandSize {
                expected: self.rules.hand_size_non_landlord,
                actual: self.initial_my_hand.len(),
            });
        }
        if self.initial_three_bottom.len() != self.rules.bottom_size {
            return Err(ValidationError::WrongBottomSize {
                actual: self.initial_three_bottom.len(),
            });
        }

        let mut known = counter(&self.initial_my_hand);
        for (&card, &count) in &counter(&self.initial_three_bottom) {
            *known.entry(card).or_insert(0) += count;
        }

        let deck_counts = counter(&full_deck());
        for (card, count) in known {
            if count > deck_counts.get(&card).copied().unwrap_or(0) {
                return Err(ValidationError::DeckCopiesExceeded { rank: card });
            }
        }

        Ok(())
    }
}

/// The information set handed to an external recommender on the user's turn.
///
/// Field names mirror spec §6's contract exactly; this is a plain value type
/// built by copying, never a view over `GameState`'s live fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InfoSet {
    /// The user's seat.
    pub player_position: Role,
    /// The user's current hand, sorted.
    pub player_hand_cards: Vec<u8>,
    /// Cards remaining in hand per role.
    pub num_cards_left_dict: BTreeMap<Role, usize>,
    /// The three bottom cards (may already be partially or fully played).
    pub three_landlord_cards: Vec<u8>,
    /// The full action history so far, in order.
    pub card_play_action_seq: Vec<Vec<u8>>,
    /// Unseen cards from the user's perspective: deck minus `my_hand` minus everything played.
    pub other_hand_cards: Vec<u8>,
    /// Every combination the user may legally play now.
    pub legal_actions: Vec<Vec<u8>>,
    /// The rival move the user must beat or pass on (empty if leading).
    pub last_move: Vec<u8>,
    /// The last two entries of `card_play_action_seq`, newest last, padded with empty multisets.
    pub last_two_moves: [Vec<u8>; 2],
    /// Most recent action per role.
    pub last_move_dict: BTreeMap<Role, Vec<u8>>,
    /// All cards played so far per role.
    pub played_cards: BTreeMap<Role, Vec<u8>>,
    /// Known hands per role; only the user's is populated, others are empty.
    pub all_handcards: BTreeMap<Role, Vec<u8>>,
    /// The role that played the most recent non-pass move.
    pub last_pid: Role,
    /// Bombs (including the king bomb) played so far.
    pub bomb_num: usize,
}

/// A user-facing, text-rendered view of the whole session, suitable for
/// rendering a UI or reconstructing a replay log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Snapshot {
    /// The user's seat.
    pub user_role: Role,
    /// The seat whose turn it currently is.
    pub acting_role: Role,
    /// The user's hand, rendered as card text.
    pub my_hand_text: String,
    /// Cards remaining in hand per role.
    pub num_cards_left_dict: BTreeMap<Role, usize>,
    /// Cards played so far per role, rendered as card text.
    pub played_cards_text: BTreeMap<Role, String>,
    /// Most recent action per role, rendered as card text.
    pub last_move_dict_text: BTreeMap<Role, String>,
    /// The full action history, rendered as card text.
    pub card_play_action_seq_text: Vec<String>,
    /// Bombs (including the king bomb) played so far.
    pub bomb_num: usize,
    /// The role that played the most recent non-pass move.
    pub last_pid: Role,
    /// The three bottom cards, rendered as card text.
    pub three_landlord_cards_text: String,
    /// Whether the hand has ended.
    pub game_over: bool,
    /// The winning side, once `game_over` is true.
    pub winner: Option<Winner>,
    /// Whether it is currently the user's turn to act.
    pub need_user_action: bool,
    /// The full action log, one entry per applied action (including passes).
    pub action_log: Vec<SnapshotLogEntry>,
}

/// One rendered entry of [`Snapshot::action_log`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SnapshotLogEntry {
    /// 1-based position in the log.
    pub step: usize,
    /// Seat that took the action.
    pub actor: Role,
    /// Card text of the action (`"PASS"` for an empty one).
    pub text: String,
}

/// Mutable game state for one seated player's view, with replay-based undo.
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    action_log: Vec<ActionLogEntry>,

    user_role: Role,
    acting_role: Role,
    my_hand: Vec<u8>,
    three_bottom: Vec<u8>,
    card_play_action_seq: Vec<Vec<u8>>,
    played_cards: BTreeMap<Role, Vec<u8>>,
    last_move_dict: BTreeMap<Role, Vec<u8>>,
    num_cards_left_dict: BTreeMap<Role, usize>,
    last_pid: Role,
    bomb_num: usize,
    game_over: bool,
    winner: Option<Winner>,
}

impl GameState {
    /// Creates a new session from the user's seat, starting hand, and the bottom cards.
    ///
    /// Validates `|my_hand| = 17`, `|three_bottom| = 3`, and that the union
    /// never exceeds deck copies for any rank, using the default [`GameRules`].
    pub fn create(user_role: Role, my_hand: Vec<u8>, three_bottom: Vec<u8>) -> ValidationResult<Self> {
        Self::create_with_rules(user_role, my_hand, three_bottom, GameRules::default())
    }

    /// As [`GameState::create`], taking the user's seat as the role-name text
    /// used by the information-set contract (`"landlord"`, `"landlord_down"`,
    /// `"landlord_up"`) instead of a typed [`Role`].
    ///
    /// The natural entry point when `user_role` arrives from an external
    /// boundary (a request payload, a config file) rather than already-typed
    /// Rust code.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownRole`] if `role_text` names none of
    /// the three seats.
    pub fn create_from_role_text(role_text: &str, my_hand: Vec<u8>, three_bottom: Vec<u8>) -> ValidationResult<Self> {
        let user_role = Role::from_text(role_text).ok_or_else(|| ValidationError::UnknownRole(role_text.to_string()))?;
        Self::create(user_role, my_hand, three_bottom)
    }

    /// As [`GameState::create`], with an explicit [`GameRules`] instead of the table default.
    pub fn create_with_rules(
        user_role: Role,
        mut my_hand: Vec<u8>,
        mut three_bottom: Vec<u8>,
        rules: GameRules,
    ) -> ValidationResult<Self> {
        my_hand.sort_unstable();
        three_bottom.sort_unstable();

        let config = GameConfig {
            user_role,
            initial_my_hand: my_hand,
            initial_three_bottom: three_bottom,
            rules,
        };
        config.validate()?;

        let mut state = Self {
            config,
            action_log: Vec::new(),
            user_role,
            acting_role: Role::Landlord,
            my_hand: Vec::new(),
            three_bottom: Vec::new(),
            card_play_action_seq: Vec::new(),
            played_cards: BTreeMap::new(),
            last_move_dict: BTreeMap::new(),
            num_cards_left_dict: BTreeMap::new(),
            last_pid: Role::Landlord,
            bomb_num: 0,
            game_over: false,
            winner: None,
        };
        state.reset_runtime_state();
        log::debug!("created session for {user_role} with {} hand cards", state.my_hand.len());
        Ok(state)
    }

    fn reset_runtime_state(&mut self) {
        let rules = self.config.rules;
        self.acting_role = Role::Landlord;
        self.my_hand = self.config.initial_my_hand.clone();
        if self.user_role == Role::Landlord {
            self.my_hand.extend(&self.config.initial_three_bottom);
            self.my_hand.sort_unstable();
        }
        self.three_bottom = self.config.initial_three_bottom.clone();
        self.card_play_action_seq = Vec::new();
        self.played_cards = ROLE_ORDER.iter().map(|&r| (r, Vec::new())).collect();
        self.last_move_dict = ROLE_ORDER.iter().map(|&r| (r, Vec::new())).collect();
        self.num_cards_left_dict = ROLE_ORDER
            .iter()
            .map(|&r| {
                let count = if r == Role::Landlord {
                    rules.landlord_start_size
                } else {
                    rules.hand_size_non_landlord
                };
                (r, count)
            })
            .collect();
        self.last_pid = Role::Landlord;
        self.bomb_num = 0;
        self.game_over = false;
        self.winner = None;
    }

    fn remaining_unseen_counter(&self) -> BTreeMap<u8, usize> {
        let mut deck = counter(&full_deck());
        for &card in &self.my_hand {
            if let Some(count) = deck.get_mut(&card) {
                *count = count.saturating_sub(1);
            }
        }
        for role in ROLE_ORDER {
            for &card in &self.played_cards[&role] {
                if let Some(count) = deck.get_mut(&card) {
                    *count = count.saturating_sub(1);
                }
            }
        }
        deck.retain(|_, &mut count| count > 0);
        deck
    }

    fn remaining_unseen_cards(&self) -> Vec<u8> {
        let mut cards = Vec::new();
        for (&card, &count) in &self.remaining_unseen_counter() {
            cards.extend(std::iter::repeat(card).take(count));
        }
        cards
    }

    /// The rival move the acting role must beat or pass on (empty if leading).
    #[must_use]
    pub fn last_move(&self) -> Vec<u8> {
        rival_move(&self.card_play_action_seq).unwrap_or_default()
    }

    /// The last two entries of the action log, newest last, padded with empty multisets.
    #[must_use]
    pub fn last_two_moves(&self) -> [Vec<u8>; 2] {
        let len = self.card_play_action_seq.len();
        let mut out: [Vec<u8>; 2] = [Vec::new(), Vec::new()];
        if len >= 1 {
            out[1] = self.card_play_action_seq[len - 1].clone();
        }
        if len >= 2 {
            out[0] = self.card_play_action_seq[len - 2].clone();
        }
        out
    }

    /// True exactly when the game is still ongoing and it is the user's turn.
    #[must_use]
    pub fn need_user_action(&self) -> bool {
        !self.game_over && self.acting_role == self.user_role
    }

    /// Legal actions for the user; empty unless it is the user's turn and the game is ongoing.
    #[must_use]
    pub fn legal_actions_for_user(&self) -> Vec<Vec<u8>> {
        if !self.need_user_action() {
            return Vec::new();
        }
        legal_actions_with_thresholds(&self.my_hand, &self.card_play_action_seq, self.config.rules.serial_thresholds())
    }

    /// The role the user is seated as.
    #[must_use]
    pub fn user_role(&self) -> Role {
        self.user_role
    }

    /// The role currently acting.
    #[must_use]
    pub fn acting_role(&self) -> Role {
        self.acting_role
    }

    /// The user's current hand, sorted.
    #[must_use]
    pub fn my_hand(&self) -> &[u8] {
        &self.my_hand
    }

    /// Whether the hand has ended.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// The winning side, once the hand has ended.
    #[must_use]
    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    /// Builds the [`InfoSet`] for the external recommender.
    ///
    /// # Errors
    /// Returns [`ValidationError::NotUsersTurn`] unless it is currently the user's turn.
    pub fn build_infoset(&self) -> ValidationResult<InfoSet> {
        if !self.need_user_action() {
            log::warn!("{}", ValidationError::NotUsersTurn);
            return Err(ValidationError::NotUsersTurn);
        }

        let legal = self.legal_actions_for_user();
        let mut all_handcards: BTreeMap<Role, Vec<u8>> = ROLE_ORDER.iter().map(|&r| (r, Vec::new())).collect();
        all_handcards.insert(self.user_role, self.my_hand.clone());

        log::debug!("building infoset for {}, {} legal actions", self.user_role, legal.len());

        Ok(InfoSet {
            player_position: self.user_role,
            player_hand_cards: self.my_hand.clone(),
            num_cards_left_dict: self.num_cards_left_dict.clone(),
            three_landlord_cards: self.three_bottom.clone(),
            card_play_action_seq: self.card_play_action_seq.clone(),
            other_hand_cards: self.remaining_unseen_cards(),
            legal_actions: legal,
            last_move: self.last_move(),
            last_two_moves: self.last_two_moves(),
            last_move_dict: self.last_move_dict.clone(),
            played_cards: self.played_cards.clone(),
            all_handcards,
            last_pid: self.last_pid,
            bomb_num: self.bomb_num,
        })
    }

    fn validate_user_action(&self, action: &[u8]) -> ValidationResult<()> {
        let legal = self.legal_actions_for_user();
        if !legal.contains(&action.to_vec()) {
            return Err(ValidationError::IllegalUserAction {
                text: action_to_text(action),
            });
        }
        Ok(())
    }

    fn validate_opponent_action(&self, action: &[u8]) -> ValidationResult<()> {
        let actor = self.acting_role;
        let rival = self.last_move();

        if action.is_empty() {
            if rival.is_empty() {
                return Err(ValidationError::PassOnLead);
            }
            return Ok(());
        }

        if action.len() > self.num_cards_left_dict[&actor] {
            return Err(ValidationError::IllegalOpponentAction {
                reason: format!("{actor} does not have enough cards left for this action"),
            });
        }

        let thresholds = self.config.rules.serial_thresholds();

        if classify_with_thresholds(action, thresholds).kind == MoveKind::Wrong {
            return Err(ValidationError::IllegalOpponentAction {
                reason: "not a valid Dou Dizhu move".to_string(),
            });
        }

        if !is_action_compatible_with_rival_with_thresholds(action, &rival, thresholds) {
            return Err(ValidationError::IllegalOpponentAction {
                reason: "cannot beat the current rival move".to_string(),
            });
        }

        let unseen = self.remaining_unseen_counter();
        for (card, count) in counter(action) {
            if count > unseen.get(&card).copied().unwrap_or(0) {
                return Err(ValidationError::IllegalOpponentAction {
                    reason: "exceeds visible remaining card pool".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Applies `action` (a sorted multiset, empty for a pass) for the currently acting role.
    ///
    /// With `validate = true`, a user action is checked against
    /// [`GameState::legal_actions_for_user`] and an opponent action against the
    /// §4.5 opponent-action checks. With `validate = false` the action is
    /// trusted (used by [`GameState::undo`] to replay the log).
    ///
    /// # Errors
    /// Returns a [`ValidationError`] if the game has already ended or the
    /// action fails validation. On error, no mutation has occurred.
    pub fn apply(&mut self, action: &[u8], validate: bool) -> ValidationResult<()> {
        if self.game_over {
            log::warn!("{}", ValidationError::GameAlreadyOver);
            return Err(ValidationError::GameAlreadyOver);
        }

        let mut action = action.to_vec();
        action.sort_unstable();
        let actor = self.acting_role;

        if validate {
            let result = if actor == self.user_role {
                self.validate_user_action(&action)
            } else {
                self.validate_opponent_action(&action)
            };
            if let Err(err) = result {
                log::warn!("rejected action for {actor}: {err}");
                return Err(err);
            }
        }

        self.action_log.push(ActionLogEntry {
            actor,
            action: action.clone(),
        });

        self.last_move_dict.insert(actor, action.clone());
        self.card_play_action_seq.push(action.clone());

        if !action.is_empty() {
            if actor == self.user_role {
                for &card in &action {
                    if !remove_one(&mut self.my_hand, card) {
                        panic!("invariant violation: {actor} played a card not in hand");
                    }
                }
            }

            self.played_cards.get_mut(&actor).expect("every role has an entry").extend(&action);

            let left = self.num_cards_left_dict.get_mut(&actor).expect("every role has an entry");
            *left = left
                .checked_sub(action.len())
                .unwrap_or_else(|| panic!("invariant violation: {actor} card count dropped below zero"));

            if actor == Role::Landlord && !self.three_bottom.is_empty() {
                self.three_bottom.retain(|c| !action.contains(c));
            }

            self.last_pid = actor;
        }

        if is_bomb(&action) {
            self.bomb_num += 1;
        }

        self.check_game_over();
        if !self.game_over {
            self.acting_role = self.acting_role.next();
        }

        log::debug!("{actor} played {} -> acting {}", action_to_text(&action), self.acting_role);
        Ok(())
    }

    fn check_game_over(&mut self) {
        for &role in &ROLE_ORDER {
            if self.num_cards_left_dict[&role] == 0 {
                self.game_over = true;
                self.winner = Some(if role == Role::Landlord { Winner::Landlord } else { Winner::Farmer });
                return;
            }
        }
    }

    /// Undoes the most recent action: pops it from the log, resets runtime
    /// state to the initial configuration, and replays the remaining log
    /// with validation disabled.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyActionLog`] if the log is empty.
    pub fn undo(&mut self) -> ValidationResult<()> {
        if self.action_log.is_empty() {
            log::warn!("{}", ValidationError::EmptyActionLog);
            return Err(ValidationError::EmptyActionLog);
        }
        self.action_log.pop();
        let replay: Vec<Vec<u8>> = self.action_log.iter().map(|e| e.action.clone()).collect();

        self.reset_runtime_state();
        self.action_log.clear();
        for action in replay {
            self.apply(&action, false).expect("a previously-accepted log replays cleanly");
        }

        log::debug!("undo: {} actions remain in log", self.action_log.len());
        Ok(())
    }

    /// Renders the whole session as user-facing text, suitable for UI display or replay logs.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            user_role: self.user_role,
            acting_role: self.acting_role,
            my_hand_text: action_to_text(&self.my_hand),
            num_cards_left_dict: self.num_cards_left_dict.clone(),
            played_cards_text: self.played_cards.iter().map(|(&r, c)| (r, action_to_text(c))).collect(),
            last_move_dict_text: self.last_move_dict.iter().map(|(&r, c)| (r, action_to_text(c))).collect(),
            card_play_action_seq_text: self.card_play_action_seq.iter().map(|a| action_to_text(a)).collect(),
            bomb_num: self.bomb_num,
            last_pid: self.last_pid,
            three_landlord_cards_text: action_to_text(&self.three_bottom),
            game_over: self.game_over,
            winner: self.winner,
            need_user_action: self.need_user_action(),
            action_log: self
                .action_log
                .iter()
                .enumerate()
                .map(|(i, e)| SnapshotLogEntry {
                    step: i + 1,
                    actor: e.actor,
                    text: action_to_text(&e.action),
                })
                .collect(),
        }
    }
}
