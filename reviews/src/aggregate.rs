//! Rating aggregate arithmetic.
//!
//! A movie's average is kept as an exact number of hundredths. Rounding is
//! half-up on the exact rational mean, so `4.335` can never arise from
//! floating point drift: the mean `sum / count` is scaled by 100 and rounded
//! with integer arithmetic.

use crate::models::Rating;
use serde::{Serialize, Serializer};
use std::fmt;

/// Average rating with two decimal places, stored as hundredths.
///
/// Always within `1.00..=5.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AverageRating(u16);

impl AverageRating {
    /// Wrap a value in hundredths, e.g. `433` for `4.33`.
    ///
    /// Returns `None` outside `100..=500`.
    #[must_use]
    pub const fn from_hundredths(hundredths: u16) -> Option<Self> {
        if hundredths >= 100 && hundredths <= 500 {
            Some(Self(hundredths))
        } else {
            None
        }
    }

    /// Value in hundredths.
    #[must_use]
    pub const fn hundredths(self) -> u16 {
        self.0
    }

    /// Value as a float, for JSON.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for AverageRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for AverageRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// Derived aggregate stored on a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Mean rating rounded to two decimals, `None` without reviews.
    pub average_rating: Option<AverageRating>,
    /// Number of reviews.
    pub review_count: u64,
}

impl RatingSummary {
    /// Summary of a movie without reviews.
    pub const EMPTY: Self = Self {
        average_rating: None,
        review_count: 0,
    };

    /// Build from the sum and count of ratings.
    ///
    /// `sum` must be the sum of `count` ratings in `1..=5`; other inputs yield
    /// `None` so a corrupt row can be reported instead of stored.
    #[must_use]
    pub fn from_totals(sum: u64, count: u64) -> Option<Self> {
        if count == 0 {
            return (sum == 0).then_some(Self::EMPTY);
        }
        if sum < count || sum > count.saturating_mul(5) {
            return None;
        }
        let hundredths = round_half_up(sum.checked_mul(100)?, count);
        let average = AverageRating::from_hundredths(u16::try_from(hundredths).ok()?)?;
        Some(Self {
            average_rating: Some(average),
            review_count: count,
        })
    }
}

/// Summarize a set of ratings.
///
/// # Examples
///
/// ```
/// use cinereview_reviews::aggregate::summarize;
/// use cinereview_reviews::models::Rating;
///
/// let ratings = [4, 4, 5].map(|r| Rating::new(r).unwrap());
/// let summary = summarize(ratings);
/// assert_eq!(summary.review_count, 3);
/// assert_eq!(summary.average_rating.unwrap().to_string(), "4.33");
///
/// assert_eq!(summarize([]).average_rating, None);
/// ```
#[must_use]
pub fn summarize(ratings: impl IntoIterator<Item = Rating>) -> RatingSummary {
    let (sum, count) = ratings
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), r| (sum + u64::from(r.get()), count + 1));

    // Every rating is in 1..=5, so the totals are always in range.
    RatingSummary::from_totals(sum, count).unwrap_or(RatingSummary::EMPTY)
}

/// `numerator / denominator` rounded half-up. `denominator` must be non-zero.
const fn round_half_up(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}
