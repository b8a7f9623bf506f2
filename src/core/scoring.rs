/// Attractiveness score (0-1) from the likes and dislikes a user has received
///
/// score = likes / (likes + dislikes), rounded to two decimal places.
/// A user nobody has swiped on scores 0.0, so unseen profiles rank last
/// rather than first.
#[inline]
pub fn attractiveness_score(likes: i64, dislikes: i64) -> f64 {
    let likes = likes.max(0);
    let total_swipes = likes + dislikes.max(0);
    if total_swipes == 0 {
        return 0.0;
    }

    let score = likes as f64 / total_swipes as f64;

    round_to_hundredths(score)
}

#[inline]
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cold_start_scores_zero() {
        assert_eq!(attractiveness_score(0, 0), 0.0);
    }

    #[test]
    fn test_ratio_of_likes() {
        assert_eq!(attractiveness_score(1, 0), 1.0);
        assert_eq!(attractiveness_score(0, 5), 0.0);
        assert_eq!(attractiveness_score(1, 1), 0.5);
        assert_eq!(attractiveness_score(3, 1), 0.75);
    }

    #[test]
    fn test_rounded_to_two_places() {
        assert_eq!(attractiveness_score(1, 2), 0.33);
        assert_eq!(attractiveness_score(2, 1), 0.67);
        assert_eq!(attractiveness_score(1, 6), 0.14);
    }

    #[test]
    fn test_bounded_and_deterministic() {
        for likes in 0..40 {
            for dislikes in 0..40 {
                let score = attractiveness_score(likes, dislikes);
                assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
                assert_eq!(score, attractiveness_score(likes, dislikes));
            }
        }
    }
}
