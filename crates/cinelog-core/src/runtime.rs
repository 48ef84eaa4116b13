//! Runtime estimation for TV shows.
//!
//! TMDB reports a list of per-episode runtimes (often empty for older or
//! obscure shows) and an episode count. The stored runtime of a watched show
//! is the product of the two.

/// Per-episode minutes assumed when no keyword matches.
pub const DEFAULT_EPISODE_RUNTIME: i32 = 45;

/// Known shows whose episode length differs from the default.
/// Lowercase keywords, matched as substrings of the lowercased title.
const EPISODE_RUNTIME_HINTS: &[(&str, i32)] = &[
    ("simpsons", 22),
    ("family guy", 22),
    ("south park", 22),
    ("futurama", 22),
    ("friends", 22),
    ("the office", 22),
    ("big bang theory", 22),
    ("how i met your mother", 22),
    ("brooklyn nine-nine", 22),
    ("rick and morty", 23),
    ("the mandalorian", 38),
    ("breaking bad", 47),
    ("stranger things", 51),
    ("game of thrones", 57),
    ("the crown", 58),
];

/// Total minutes for `episodes` episodes of `per_episode` minutes each.
///
/// Returns 0 when the per-episode runtime is unknown or non-positive, or when
/// the episode count is not positive. Saturates instead of overflowing.
pub fn estimate_runtime(per_episode: Option<i32>, episodes: i32) -> i32 {
    match per_episode {
        Some(minutes) if minutes > 0 && episodes > 0 => minutes.saturating_mul(episodes),
        _ => 0,
    }
}

/// Guess the episode length of a show from its title.
pub fn typical_episode_runtime(title: &str) -> i32 {
    let title = title.to_lowercase();
    EPISODE_RUNTIME_HINTS
        .iter()
        .find(|(keyword, _)| title.contains(keyword))
        .map(|(_, minutes)| *minutes)
        .unwrap_or(DEFAULT_EPISODE_RUNTIME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_runtime() {
        assert_eq!(estimate_runtime(Some(45), 10), 450);
        assert_eq!(estimate_runtime(Some(22), 1), 22);
        assert_eq!(estimate_runtime(Some(60), 0), 0);
    }

    #[test]
    fn test_estimate_runtime_unknown_inputs() {
        assert_eq!(estimate_runtime(None, 10), 0);
        assert_eq!(estimate_runtime(Some(0), 10), 0);
        assert_eq!(estimate_runtime(Some(-5), 10), 0);
        assert_eq!(estimate_runtime(Some(45), -3), 0);
    }

    #[test]
    fn test_estimate_runtime_saturates() {
        assert_eq!(estimate_runtime(Some(i32::MAX), 2), i32::MAX);
    }

    #[test]
    fn test_typical_episode_runtime() {
        assert_eq!(typical_episode_runtime("The Simpsons"), 22);
        assert_eq!(typical_episode_runtime("GAME OF THRONES"), 57);
        assert_eq!(typical_episode_runtime("Breaking Bad"), 47);
        assert_eq!(typical_episode_runtime("Some Unknown Drama"), DEFAULT_EPISODE_RUNTIME);
        assert_eq!(typical_episode_runtime(""), DEFAULT_EPISODE_RUNTIME);
    }
}
