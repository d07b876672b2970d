use anyhow::Result;

use crate::config::EngramConfig;
use crate::memory::cache::MemoryCache;
use crate::memory::state;
use crate::memory::types::SearchResult;

/// Look up entries near a state value.
pub fn by_state(config: &EngramConfig, value: u8, tolerance: Option<u16>) -> Result<()> {
    let generator = crate::fingerprint::create_generator(&config.fingerprint)?;
    let cache = MemoryCache::open(config.resolved_cache_path(), generator.as_ref())?;

    let tolerance = tolerance.unwrap_or(config.search.default_tolerance);
    let results = state::by_state(&cache, value, tolerance);

    println!("State {value} ±{tolerance}:");
    print_results(&results);
    Ok(())
}

/// Look up entries inside a state range.
pub fn by_state_range(config: &EngramConfig, min: u8, max: u8) -> Result<()> {
    let generator = crate::fingerprint::create_generator(&config.fingerprint)?;
    let cache = MemoryCache::open(config.resolved_cache_path(), generator.as_ref())?;

    let results = state::by_state_range(&cache, min, max)?;

    println!("States {min}–{max}:");
    print_results(&results);
    Ok(())
}

/// Print the state distribution report.
pub fn distribution(config: &EngramConfig) -> Result<()> {
    let generator = crate::fingerprint::create_generator(&config.fingerprint)?;
    let cache = MemoryCache::open(config.resolved_cache_path(), generator.as_ref())?;

    let stats = state::distribution(&cache);
    if stats.tagged_entries == 0 {
        println!("No entries carry a state value yet.");
        return Ok(());
    }

    println!("State Distribution");
    println!("{}", "=".repeat(40));
    println!("  Tagged entries:      {}", stats.tagged_entries);
    println!("  Unique states:       {}", stats.unique_states);
    if let (Some(min), Some(max)) = (stats.min_state, stats.max_state) {
        println!("  Range:               {min}–{max}");
    }
    if let Some(mean) = stats.mean_state {
        println!("  Mean:                {mean:.2}");
    }
    if let Some(std_dev) = stats.std_dev {
        println!("  Std deviation:       {std_dev:.2}");
    }
    println!();

    println!("By Band:");
    for band in &stats.bands {
        println!("  {:<12} ({:>3}–{:>3})  {}", band.label, band.lo, band.hi, band.count);
    }
    println!();

    if let Some(ref most) = stats.most_frequent {
        println!("Most frequent state:   {} ({}x)", most.state, most.count);
    }
    if let Some(ref least) = stats.least_frequent {
        println!("Least frequent state:  {} ({}x)", least.state, least.count);
    }

    Ok(())
}

fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("  (no matching entries)");
        return;
    }
    for (i, result) in results.iter().enumerate() {
        let state = result
            .state_value
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}. {} (state {state}, score: {:.3})",
            i + 1,
            result.content_id,
            result.score,
        );
        println!("     {}", result.preview);
    }
}
