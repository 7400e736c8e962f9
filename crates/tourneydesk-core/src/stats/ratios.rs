/// (kills + assists) / deaths, or kills + assists when there are no deaths
pub fn kda_ratio(kills: u32, deaths: u32, assists: u32) -> f64 {
    let contributions = f64::from(kills) + f64::from(assists);
    if deaths == 0 {
        contributions
    } else {
        contributions / f64::from(deaths)
    }
}

/// KDA formatted with two decimals, halves rounded up. Missing inputs count
/// as zero.
pub fn compute_kda(kills: Option<u32>, deaths: Option<u32>, assists: Option<u32>) -> String {
    let ratio = kda_ratio(
        kills.unwrap_or(0),
        deaths.unwrap_or(0),
        assists.unwrap_or(0),
    );
    format!("{:.2}", (ratio * 100.0).round() / 100.0)
}

/// Rounded percentage of wins; 0 when no matches were played
pub fn win_rate_percent(wins: u32, total_matches: u32) -> u32 {
    if total_matches == 0 {
        return 0;
    }
    (f64::from(wins) / f64::from(total_matches) * 100.0).round() as u32
}

/// Win rate as a display percentage, e.g. `"75%"`. Missing inputs count as zero.
pub fn compute_win_rate(wins: Option<u32>, total_matches: Option<u32>) -> String {
    format!(
        "{}%",
        win_rate_percent(wins.unwrap_or(0), total_matches.unwrap_or(0))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kda_without_deaths_is_sum() {
        assert_eq!(compute_kda(Some(10), Some(0), Some(5)), "15.00");
        assert_eq!(compute_kda(Some(3), None, None), "3.00");
        for (k, a) in [(0, 0), (1, 2), (27, 14), (100, 0)] {
            assert_eq!(compute_kda(Some(k), Some(0), Some(a)), format!("{:.2}", f64::from(k + a)));
        }
    }

    #[test]
    fn test_kda_with_deaths() {
        assert_eq!(compute_kda(Some(10), Some(5), Some(5)), "3.00");
        assert_eq!(compute_kda(Some(7), Some(3), Some(0)), "2.33");
        assert_eq!(compute_kda(Some(2), Some(3), Some(0)), "0.67");
    }

    #[test]
    fn test_kda_rounds_halves_up() {
        let kdas: Vec<String> = [(1, 8), (5, 8), (9, 8), (3, 8)]
            .iter()
            .map(|&(k, d)| compute_kda(Some(k), Some(d), Some(0)))
            .collect();
        assert_eq!(kdas, vec!["0.13", "0.63", "1.13", "0.38"]);
    }

    #[test]
    fn test_kda_all_missing() {
        assert_eq!(compute_kda(None, None, None), "0.00");
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(compute_win_rate(Some(0), Some(0)), "0%");
        assert_eq!(compute_win_rate(Some(3), Some(4)), "75%");
        assert_eq!(compute_win_rate(Some(1), Some(3)), "33%");
        assert_eq!(compute_win_rate(Some(2), Some(3)), "67%");
        assert_eq!(compute_win_rate(None, Some(5)), "0%");
        assert_eq!(compute_win_rate(Some(5), None), "0%");
    }

    #[test]
    fn test_win_rate_rounds_half_up() {
        assert_eq!(win_rate_percent(1, 8), 13); // 12.5
        assert_eq!(win_rate_percent(8, 8), 100);
    }
}
