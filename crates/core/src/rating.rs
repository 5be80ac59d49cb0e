//! Rating classification and aggregate display formatting.
//!
//! Every marker carries a server-maintained `rating_avg` / `rating_count`
//! pair. The UI colour-codes markers by which band the average falls into;
//! the same bands double as the map's rating filter.

use serde::{Deserialize, Serialize};

/// One of six mutually exclusive colour bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingBucket {
    /// No votes yet. Neutral colour.
    #[serde(rename = "none")]
    None,
    #[serde(rename = "1-2")]
    OneTwo,
    #[serde(rename = "3-4")]
    ThreeFour,
    #[serde(rename = "5-6")]
    FiveSix,
    #[serde(rename = "7-8")]
    SevenEight,
    #[serde(rename = "9-10")]
    NineTen,
}

/// Buckets offered as filters, best first (the order of the map's segment buttons).
pub const FILTER_BUCKETS: [RatingBucket; 5] = [
    RatingBucket::NineTen,
    RatingBucket::SevenEight,
    RatingBucket::FiveSix,
    RatingBucket::ThreeFour,
    RatingBucket::OneTwo,
];

/// Range predicate for a bucket filter.
///
/// `min` is inclusive, `below` is exclusive. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketBounds {
    pub min: Option<f64>,
    pub below: Option<f64>,
}

impl RatingBucket {
    /// Classify an aggregate.
    ///
    /// A non-positive count is always [`RatingBucket::None`], whatever the
    /// average says. Otherwise bands are checked top-down and each band owns
    /// its lower bound: 9.0 is `9-10`, 8.999 is `7-8`. A missing average with
    /// votes counts as 0.
    pub fn classify(avg: Option<f64>, count: i64) -> Self {
        if count <= 0 {
            return Self::None;
        }
        let x = avg.unwrap_or(0.0);
        if x >= 9.0 {
            Self::NineTen
        } else if x >= 7.0 {
            Self::SevenEight
        } else if x >= 5.0 {
            Self::FiveSix
        } else if x >= 3.0 {
            Self::ThreeFour
        } else {
            Self::OneTwo
        }
    }

    /// CSS class used for colour-coding.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::None => "rating-none",
            Self::OneTwo => "rating-1-2",
            Self::ThreeFour => "rating-3-4",
            Self::FiveSix => "rating-5-6",
            Self::SevenEight => "rating-7-8",
            Self::NineTen => "rating-9-10",
        }
    }

    /// Filter key (`"9-10"` etc). The neutral bucket is not filterable.
    pub fn key(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::OneTwo => Some("1-2"),
            Self::ThreeFour => Some("3-4"),
            Self::FiveSix => Some("5-6"),
            Self::SevenEight => Some("7-8"),
            Self::NineTen => Some("9-10"),
        }
    }

    /// Human label with an en dash, as shown on the segment buttons.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Any",
            Self::OneTwo => "1–2",
            Self::ThreeFour => "3–4",
            Self::FiveSix => "5–6",
            Self::SevenEight => "7–8",
            Self::NineTen => "9–10",
        }
    }

    /// Parse a filter key. Unknown or empty keys yield `None`.
    pub fn parse_key(key: &str) -> Option<Self> {
        FILTER_BUCKETS
            .into_iter()
            .find(|b| b.key() == Some(key.trim()))
    }

    /// Range predicate matching exactly the averages [`classify`] puts in this
    /// bucket (given at least one vote).
    ///
    /// [`classify`]: RatingBucket::classify
    pub fn bounds(self) -> Option<BucketBounds> {
        let (min, below) = match self {
            Self::None => return None,
            Self::OneTwo => (None, Some(3.0)),
            Self::ThreeFour => (Some(3.0), Some(5.0)),
            Self::FiveSix => (Some(5.0), Some(7.0)),
            Self::SevenEight => (Some(7.0), Some(9.0)),
            Self::NineTen => (Some(9.0), None),
        };
        Some(BucketBounds { min, below })
    }
}

fn vote_noun(count: i64) -> &'static str {
    if count == 1 {
        "vote"
    } else {
        "votes"
    }
}

/// Long form used on the home page: `"8.50 / 10 · 2 votes"`.
pub fn format_overall(avg: Option<f64>, count: i64) -> String {
    if count <= 0 {
        return "No votes yet".to_string();
    }
    format!(
        "{:.2} / 10 · {count} {}",
        avg.unwrap_or(0.0),
        vote_noun(count)
    )
}

/// Compact form used in tables and the map panel: `"8.50/10 (2 votes)"`.
pub fn format_overall_compact(avg: Option<f64>, count: i64) -> String {
    if count <= 0 {
        return "—/10 (0 votes)".to_string();
    }
    format!(
        "{:.2}/10 ({count} {})",
        avg.unwrap_or(0.0),
        vote_noun(count)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_is_neutral_whatever_the_average() {
        for avg in [None, Some(-3.0), Some(0.0), Some(5.0), Some(9.5), Some(42.0)] {
            assert_eq!(RatingBucket::classify(avg, 0), RatingBucket::None);
        }
    }

    #[test]
    fn negative_count_is_neutral() {
        assert_eq!(RatingBucket::classify(Some(8.0), -1), RatingBucket::None);
    }

    #[test]
    fn band_boundaries_belong_to_the_upper_band() {
        assert_eq!(RatingBucket::classify(Some(9.0), 1), RatingBucket::NineTen);
        assert_eq!(RatingBucket::classify(Some(8.999), 1), RatingBucket::SevenEight);
        assert_eq!(RatingBucket::classify(Some(7.0), 3), RatingBucket::SevenEight);
        assert_eq!(RatingBucket::classify(Some(6.99), 3), RatingBucket::FiveSix);
        assert_eq!(RatingBucket::classify(Some(5.0), 3), RatingBucket::FiveSix);
        assert_eq!(RatingBucket::classify(Some(3.0), 3), RatingBucket::ThreeFour);
        assert_eq!(RatingBucket::classify(Some(2.99), 3), RatingBucket::OneTwo);
        assert_eq!(RatingBucket::classify(Some(1.0), 3), RatingBucket::OneTwo);
    }

    #[test]
    fn missing_average_with_votes_is_lowest_band() {
        assert_eq!(RatingBucket::classify(None, 2), RatingBucket::OneTwo);
    }

    #[test]
    fn out_of_range_averages_clamp_to_edge_bands() {
        assert_eq!(RatingBucket::classify(Some(11.0), 1), RatingBucket::NineTen);
        assert_eq!(RatingBucket::classify(Some(-1.0), 1), RatingBucket::OneTwo);
    }

    #[test]
    fn css_classes() {
        assert_eq!(RatingBucket::None.css_class(), "rating-none");
        assert_eq!(RatingBucket::NineTen.css_class(), "rating-9-10");
        assert_eq!(RatingBucket::ThreeFour.css_class(), "rating-3-4");
    }

    #[test]
    fn parse_key_accepts_filter_keys_only() {
        for bucket in FILTER_BUCKETS {
            let key = bucket.key().unwrap();
            assert_eq!(RatingBucket::parse_key(key), Some(bucket));
        }
        assert_eq!(RatingBucket::parse_key(""), None);
        assert_eq!(RatingBucket::parse_key("none"), None);
        assert_eq!(RatingBucket::parse_key("8-9"), None);
    }

    #[test]
    fn bounds_agree_with_classification() {
        let samples = [1.0, 2.5, 2.999, 3.0, 4.5, 5.0, 6.9, 7.0, 8.5, 8.999, 9.0, 10.0];
        for avg in samples {
            let owner = RatingBucket::classify(Some(avg), 1);
            for bucket in FILTER_BUCKETS {
                let b = bucket.bounds().unwrap();
                let inside = b.min.map_or(true, |m| avg >= m) && b.below.map_or(true, |u| avg < u);
                assert_eq!(inside, bucket == owner, "avg {avg} bucket {bucket:?}");
            }
        }
        assert!(RatingBucket::None.bounds().is_none());
    }

    #[test]
    fn overall_long_form() {
        assert_eq!(format_overall(Some(9.0), 0), "No votes yet");
        assert_eq!(format_overall(Some(8.5), 1), "8.50 / 10 · 1 vote");
        assert_eq!(format_overall(Some(7.333), 3), "7.33 / 10 · 3 votes");
    }

    #[test]
    fn overall_compact_form() {
        assert_eq!(format_overall_compact(None, 0), "—/10 (0 votes)");
        assert_eq!(format_overall_compact(Some(6.0), 1), "6.00/10 (1 vote)");
        assert_eq!(format_overall_compact(Some(9.25), 4), "9.25/10 (4 votes)");
    }
}
