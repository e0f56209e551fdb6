//! Catalog and review records.

use crate::aggregate::{AverageRating, RatingSummary};
use crate::error::{ReviewError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use cinereview_core::{MovieId, ReviewId, UserId};
use serde::{Deserialize, Serialize};

/// Longest accepted movie title, in characters.
pub const MAX_TITLE_LEN: usize = 100;

/// Star rating, an integer in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating.
    pub const MIN: u8 = 1;
    /// Highest rating.
    pub const MAX: u8 = 5;

    /// Validate an integer rating.
    ///
    /// # Errors
    ///
    /// `ReviewError::Validation` outside `1..=5`.
    pub fn new(value: i64) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or_else(Self::out_of_range)
    }

    /// Validate a rating received as JSON. Only integral numbers are
    /// accepted; `4.5`, `"4"` and `null` are rejected.
    ///
    /// # Errors
    ///
    /// `ReviewError::Validation` for non-integers or values outside `1..=5`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        value
            .as_i64()
            .ok_or_else(Self::out_of_range)
            .and_then(Self::new)
    }

    /// The rating value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    fn out_of_range() -> ReviewError {
        ReviewError::validation("rating must be an integer between 1 and 5")
    }
}

/// Validate review content: required and not blank. Returns the trimmed text.
///
/// # Errors
///
/// `ReviewError::Validation` when missing or blank.
pub fn validate_content(content: Option<&str>) -> Result<String> {
    match content.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_owned()),
        _ => Err(ReviewError::validation("content is required")),
    }
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    /// Identifier.
    pub id: MovieId,
    /// Title, unique within the catalog.
    pub title: String,
    /// Poster image reference.
    pub poster_path: Option<String>,
    /// Genre tags, comma separated.
    pub genre: Option<String>,
    /// Tagline.
    pub tagline: Option<String>,
    /// Release date.
    pub release_date: Option<NaiveDate>,
    /// Derived mean rating. Written only by the rating aggregator.
    pub average_rating: Option<AverageRating>,
    /// Derived review count. Written only by the rating aggregator.
    pub review_count: u64,
}

impl Movie {
    /// The movie's current aggregate.
    #[must_use]
    pub const fn rating(&self) -> RatingSummary {
        RatingSummary {
            average_rating: self.average_rating,
            review_count: self.review_count,
        }
    }

    /// Short form embedded in review listings.
    #[must_use]
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
        }
    }
}

/// Movie record produced by catalog ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    /// Title.
    pub title: String,
    /// Poster image reference.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Genre tags.
    #[serde(default)]
    pub genre: Option<String>,
    /// Tagline.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

impl NewMovie {
    /// Movie with only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            poster_path: None,
            genre: None,
            tagline: None,
            release_date: None,
        }
    }

    /// Check the title is present and at most 100 characters.
    ///
    /// # Errors
    ///
    /// `ReviewError::Validation` otherwise.
    pub fn validate(&self) -> Result<()> {
        let length = self.title.trim().chars().count();
        if length == 0 {
            return Err(ReviewError::validation("title is required"));
        }
        if length > MAX_TITLE_LEN {
            return Err(ReviewError::validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Movie fields embedded in a user's own review listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    /// Identifier.
    pub id: MovieId,
    /// Title.
    pub title: String,
    /// Poster image reference.
    pub poster_path: Option<String>,
}

/// A user's review of a movie.
///
/// `movie_id` and `author_id` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Identifier.
    pub id: ReviewId,
    /// Reviewed movie.
    pub movie_id: MovieId,
    /// Author.
    pub author_id: UserId,
    /// Non-blank text.
    pub content: String,
    /// Star rating.
    pub rating: Rating,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Validated review about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Reviewed movie.
    pub movie_id: MovieId,
    /// Author.
    pub author_id: UserId,
    /// Non-blank text.
    pub content: String,
    /// Star rating.
    pub rating: Rating,
    /// Creation time, also the initial modification time.
    pub created_at: DateTime<Utc>,
}

/// Validated edit of an existing review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewChange {
    /// New text.
    pub content: String,
    /// New rating.
    pub rating: Rating,
    /// Modification time.
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated review fields as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReviewInput {
    /// Review text.
    #[serde(default)]
    pub content: Option<String>,
    /// Rating, any JSON value.
    #[serde(default)]
    pub rating: Option<serde_json::Value>,
}

impl ReviewInput {
    /// Input with the given content and integer rating.
    #[must_use]
    pub fn new(content: impl Into<String>, rating: i64) -> Self {
        Self {
            content: Some(content.into()),
            rating: Some(serde_json::Value::from(rating)),
        }
    }

    /// Parse a raw request body. An empty body yields an input with every
    /// field missing.
    ///
    /// # Errors
    ///
    /// `ReviewError::Validation` if the body is not a JSON object of the
    /// expected shape.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ReviewError::validation(format!("invalid review body: {e}")))
    }

    /// Validate into trimmed content and a rating.
    ///
    /// # Errors
    ///
    /// `ReviewError::Validation` if content is blank or the rating is not an
    /// integer in `1..=5`.
    pub fn validate(&self) -> Result<(String, Rating)> {
        let content = validate_content(self.content.as_deref())?;
        let rating = self
            .rating
            .as_ref()
            .ok_or_else(|| ReviewError::validation("rating is required"))
            .and_then(Rating::from_json)?;
        Ok((content, rating))
    }
}

/// Which reviews to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    /// Only reviews of this movie.
    pub movie_id: Option<MovieId>,
    /// Only reviews by this author.
    pub author_id: Option<UserId>,
}

impl ReviewFilter {
    /// Reviews of one movie.
    #[must_use]
    pub const fn for_movie(movie_id: MovieId) -> Self {
        Self {
            movie_id: Some(movie_id),
            author_id: None,
        }
    }

    /// Reviews by one author.
    #[must_use]
    pub const fn by_author(author_id: UserId) -> Self {
        Self {
            movie_id: None,
            author_id: Some(author_id),
        }
    }

    /// Whether `review` passes the filter.
    #[must_use]
    pub fn matches(&self, review: &Review) -> bool {
        self.movie_id.is_none_or(|id| id == review.movie_id)
            && self.author_id.is_none_or(|id| id == review.author_id)
    }
}

/// A committed review mutation and the movie aggregate it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCommit {
    /// The review as stored (or as it was, for deletions).
    pub review: Review,
    /// The movie's aggregate after the mutation.
    pub rating: RatingSummary,
}
