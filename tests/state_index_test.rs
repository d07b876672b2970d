mod helpers;

use helpers::{store_text, test_cache};
use engram::error::EngramError;
use engram::memory::state;

/// `by_state` must return exactly the subset with |state − value| ≤
/// tolerance — verified here against a brute-force filter over a spread of
/// state values.
#[test]
fn tolerance_filter_matches_brute_force() {
    let (_dir, mut cache, generator) = test_cache();
    let states: Vec<u8> = (0..=25).map(|i| i * 10).collect();
    for state in &states {
        let text = format!("entry tagged {state}");
        store_text(&mut cache, &generator, &format!("id-{state}"), &text, Some(*state));
    }

    for (value, tolerance) in [(0u8, 0u16), (100, 15), (128, 64), (250, 30), (255, 255)] {
        let results = state::by_state(&cache, value, tolerance);
        let mut got: Vec<u8> = results.iter().map(|r| r.state_value.unwrap()).collect();
        got.sort_unstable();

        let mut expected: Vec<u8> = states
            .iter()
            .copied()
            .filter(|s| (*s as i32 - value as i32).abs() <= tolerance as i32)
            .collect();
        expected.sort_unstable();

        assert_eq!(got, expected, "value={value} tolerance={tolerance}");
    }
}

#[test]
fn range_filter_matches_brute_force() {
    let (_dir, mut cache, generator) = test_cache();
    let states: Vec<u8> = vec![0, 1, 63, 64, 127, 128, 150, 191, 192, 254, 255];
    for state in &states {
        let text = format!("entry tagged {state}");
        store_text(&mut cache, &generator, &format!("id-{state}"), &text, Some(*state));
    }

    for (min, max) in [(0u8, 255u8), (0, 0), (255, 255), (64, 191), (150, 255)] {
        let results = state::by_state_range(&cache, min, max).unwrap();
        let mut got: Vec<u8> = results.iter().map(|r| r.state_value.unwrap()).collect();
        got.sort_unstable();

        let mut expected: Vec<u8> = states
            .iter()
            .copied()
            .filter(|s| *s >= min && *s <= max)
            .collect();
        expected.sort_unstable();

        assert_eq!(got, expected, "range {min}-{max}");
    }
}

#[test]
fn tolerance_scores_decay_linearly_with_distance() {
    let (_dir, mut cache, generator) = test_cache();
    for (id, state) in [("center", 100u8), ("off-by-four", 104), ("off-by-eight", 92)] {
        let text = format!("entry {id}");
        store_text(&mut cache, &generator, id, &text, Some(state));
    }

    let results = state::by_state(&cache, 100, 8);
    assert_eq!(results[0].content_id, "center");
    assert_eq!(results[0].score, 1.0);
    assert_eq!(results[1].content_id, "off-by-four");
    assert!((results[1].score - 0.5).abs() < 1e-9);
    assert_eq!(results[2].content_id, "off-by-eight");
    assert!(results[2].score.abs() < 1e-9);
}

#[test]
fn inverted_range_is_invalid_input() {
    let (_dir, mut cache, generator) = test_cache();
    store_text(&mut cache, &generator, "a", "an entry", Some(50));

    assert!(matches!(
        state::by_state_range(&cache, 100, 50),
        Err(EngramError::InvalidInput(_))
    ));
}

#[test]
fn distribution_over_a_journal_week() {
    let (_dir, mut cache, generator) = test_cache();
    let days = [
        ("mon", "productive monday", Some(180u8)),
        ("tue", "slow tuesday", Some(90)),
        ("wed", "difficult wednesday", Some(30)),
        ("thu", "recovering thursday", Some(90)),
        ("fri", "great friday", Some(220)),
        ("sat", "untagged saturday", None),
    ];
    for (id, text, state) in days {
        store_text(&mut cache, &generator, id, text, state);
    }

    let stats = state::distribution(&cache);
    assert_eq!(stats.tagged_entries, 5);
    assert_eq!(stats.unique_states, 4);
    assert_eq!(stats.counts[&90], 2);
    assert_eq!(stats.min_state, Some(30));
    assert_eq!(stats.max_state, Some(220));
    assert!((stats.mean_state.unwrap() - 122.0).abs() < 1e-9);
    assert_eq!(stats.most_frequent.as_ref().unwrap().state, 90);

    // Bands: low 0-63 gets wed; medium-low 64-127 gets tue+thu;
    // medium-high 128-191 gets mon; high 192-255 gets fri.
    let counts: Vec<u64> = stats.bands.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![1, 2, 1, 1]);
}
