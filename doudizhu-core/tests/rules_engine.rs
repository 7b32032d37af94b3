//! End-to-end coverage of the classifier, generator, filter, and state
//! machine working together, plus the concrete scenarios from spec §8.

use doudizhu_core::classify::{classify, MoveKind};
use doudizhu_core::filter::legal_actions;
use doudizhu_core::generator::Generator;
use doudizhu_core::parser::{action_to_text, parse_action_text};
use doudizhu_core::state::{GameState, Role, Winner};
use doudizhu_core::ValidationError;

fn c(text: &str) -> Vec<u8> {
    parse_action_text(text).unwrap()
}

#[test]
fn s1_hand_345xd_beats_a_four() {
    let hand = c("345XD");
    let legal = legal_actions(&hand, &[c("4")]);
    let rendered: std::collections::BTreeSet<String> = legal.iter().map(|a| action_to_text(a)).collect();

    assert!(rendered.contains("5"));
    assert!(rendered.contains("X"));
    assert!(rendered.contains("D"));
    assert!(rendered.contains("XD"));
    assert!(rendered.contains("PASS"));
    assert!(!rendered.contains("3"));
}

#[test]
fn s2_classifier_scenarios() {
    assert_eq!(classify(&c("XD")).kind, MoveKind::KingBomb);

    let bomb = classify(&c("7777"));
    assert_eq!(bomb.kind, MoveKind::Bomb);
    assert_eq!(bomb.rank, Some(7));

    assert_eq!(classify(&c("34")).kind, MoveKind::Wrong);

    let serial = classify(&c("33344456"));
    assert_eq!(serial.kind, MoveKind::SerialTripleOne);
    assert_eq!(serial.rank, Some(3));
    assert_eq!(serial.length, Some(2));
}

#[test]
fn s3_four_triple_relaxation() {
    let info = classify(&c("33344455567778"));
    assert_eq!(info.kind, MoveKind::SerialTripleOne);
    assert_eq!(info.length, Some(3));
    assert_eq!(info.rank, Some(3));
}

#[test]
fn s4_landlord_leads_then_opponent_cannot_pass_on_a_new_lead() {
    let hand = c("34567899TTJJQQKKA");
    let bottom = c("223");
    let mut state = GameState::create(Role::Landlord, hand, bottom).unwrap();
    assert_eq!(state.acting_role(), Role::Landlord);

    state.apply(&c("5"), true).unwrap();
    assert_eq!(state.acting_role(), Role::LandlordDown);

    // A fresh session where the user is the opponent facing a lead.
    let hand2 = c("34567899TTJJQQKKA");
    let bottom2 = c("223");
    let mut leading_state = GameState::create(Role::LandlordDown, hand2, bottom2).unwrap();
    let err = leading_state.apply(&[], true).unwrap_err();
    assert!(matches!(err, ValidationError::PassOnLead));
}

#[test]
fn s5_apply_then_undo_restores_prior_state() {
    let hand = c("34567899TTJJQQKKA");
    let bottom = c("223");
    let mut state = GameState::create(Role::Landlord, hand, bottom).unwrap();

    state.apply(&c("5"), true).unwrap();
    state.apply(&c("6"), false).unwrap();
    state.undo().unwrap();

    assert_eq!(state.snapshot().card_play_action_seq_text, vec!["5".to_string()]);
    assert_eq!(state.acting_role(), Role::LandlordDown);
    assert_eq!(state.snapshot().num_cards_left_dict[&Role::Landlord], 19);
}

#[test]
fn s6_round_trip_ten_through_red_joker() {
    let cards = parse_action_text("10JQKA2XD").unwrap();
    assert_eq!(cards, vec![10, 11, 12, 13, 14, 17, 20, 30]);
    assert_eq!(action_to_text(&cards), "10JQKA2XD");
}

#[test]
fn property_classifier_totality() {
    // Every size from 1..=14 should classify to *something*, never panic.
    for size in 1..=14usize {
        let sample: Vec<u8> = (0..size as u8).map(|i| 3 + i % 13).collect();
        let _ = classify(&sample);
    }
    assert_eq!(classify(&[]).kind, MoveKind::Pass);
}

#[test]
fn property_generator_soundness() {
    let hand = c("33344456789TTJJQQKKA2XD");
    let gen = Generator::new(&hand);
    let mut hand_counts = std::collections::BTreeMap::new();
    for &card in &hand {
        *hand_counts.entry(card).or_insert(0usize) += 1;
    }

    for combo in gen.gen_all() {
        let mut combo_counts = std::collections::BTreeMap::new();
        for &card in &combo {
            *combo_counts.entry(card).or_insert(0usize) += 1;
        }
        for (rank, count) in &combo_counts {
            assert!(hand_counts.get(rank).copied().unwrap_or(0) >= *count);
        }
        assert!(!matches!(classify(&combo).kind, MoveKind::Pass | MoveKind::Wrong));
    }
}

#[test]
fn property_filter_soundness_and_bomb_override() {
    let hand = c("33449999");
    let seq = vec![c("77")];
    let legal = legal_actions(&hand, &seq);

    for action in &legal {
        if action.is_empty() {
            continue;
        }
        let info = classify(action);
        assert!(info.is_bomb() || info.rank.is_some_and(|r| r > 7));
    }

    // The bomb in the hand must appear since the rival move was not a bomb.
    assert!(legal.iter().any(|a| classify(a).is_bomb()));
}

#[test]
fn property_king_bomb_ends_the_exchange() {
    let hand = c("77778888");
    let legal = legal_actions(&hand, &[c("XD")]);
    assert!(legal.is_empty());
}

#[test]
fn property_termination_and_winner() {
    let rules = doudizhu_core::GameRules {
        hand_size_non_landlord: 1,
        bottom_size: 3,
        landlord_start_size: 4,
        ..doudizhu_core::GameRules::default()
    };
    let mut state = GameState::create_with_rules(Role::Landlord, vec![7], vec![8, 8, 8], rules).unwrap();
    state.apply(&[7, 8, 8, 8], true).unwrap();

    assert!(state.game_over());
    assert_eq!(state.winner(), Some(Winner::Landlord));
    assert_eq!(state.snapshot().winner, Some(Winner::Landlord));
}

#[test]
fn property_round_trip_text_for_every_accepted_string() {
    for text in ["334455", "10JQKA2XD", "7777", "PASS", "XD"] {
        let cards = parse_action_text(text).unwrap();
        assert_eq!(action_to_text(&cards), text.to_uppercase());
    }
}

#[test]
fn build_infoset_reflects_the_rival_move() {
    let hand = c("34567899TTJJQQKKA");
    let bottom = c("223");
    let mut state = GameState::create(Role::LandlordUp, hand, bottom).unwrap();

    // Landlord leads, landlord_down passes, then it is the user's turn facing a rival.
    state.apply(&c("9"), false).unwrap();
    state.apply(&[], false).unwrap();

    let infoset = state.build_infoset().unwrap();
    assert_eq!(infoset.last_move, c("9"));
    assert_eq!(infoset.player_position, Role::LandlordUp);
    assert!(infoset.legal_actions.iter().any(|a| a.is_empty()));
}
