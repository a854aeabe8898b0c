//! "Did you mean" matching for miskeyed section names.

/// Largest edit distance still offered as a suggestion.
pub const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Return the candidate closest to `input`, if any is within
/// [`MAX_SUGGESTION_DISTANCE`] edits.
///
/// Ties keep the candidate that comes first.
pub fn suggest<'a, S: AsRef<str>>(input: &str, candidates: &'a [S]) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        let candidate = candidate.as_ref();
        let distance = levenshtein(input, candidate);
        if distance > MAX_SUGGESTION_DISTANCE {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Classic Levenshtein distance over chars; every edit costs 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, val) in dp[0].iter_mut().enumerate() {
        *val = j;
    }
    for i in 1..=m {
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }
    dp[m][n]
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHASE_0_SECTIONS: [&str; 8] = [
        "overview",
        "structure",
        "frontmatter",
        "progressive-disclosure",
        "skill-types",
        "freedom-levels",
        "invocation-control",
        "runtime-specific",
    ];

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("frontmat", "frontmatter"), 3);
        assert_eq!(levenshtein("フロント", "フロソト"), 1);
    }

    #[test]
    fn test_suggests_close_typo() {
        assert_eq!(suggest("frontmat", &PHASE_0_SECTIONS), Some("frontmatter"));
        assert_eq!(suggest("strcture", &PHASE_0_SECTIONS), Some("structure"));
    }

    #[test]
    fn test_no_suggestion_beyond_threshold() {
        assert_eq!(suggest("xyz", &["overview", "structure", "frontmatter"]), None);
        assert_eq!(suggest("anything", &[] as &[&str]), None);
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        assert_eq!(suggest("ab", &["aa", "bb"]), Some("aa"));
        assert_eq!(suggest("ab", &["bb", "aa"]), Some("bb"));
    }

    #[test]
    fn test_exact_match_wins() {
        assert_eq!(suggest("metrics", &["metric", "metrics"]), Some("metrics"));
    }
}
