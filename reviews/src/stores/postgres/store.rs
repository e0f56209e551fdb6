//! PostgreSQL catalog and review store.
//!
//! Every review mutation is one transaction:
//!
//! 1. `SELECT ... FROM movies WHERE id = $1 FOR UPDATE` serializes writers of
//!    the same movie; other movies are unaffected
//! 2. the review row is written
//! 3. the movie's reviews are re-read inside the transaction and the
//!    aggregate is written back
//! 4. commit
//!
//! Any error drops the transaction, which rolls everything back.
//!
//! `average_rating` is `NUMERIC(3,2)`; it is written from and read back as
//! an integer number of hundredths so no floating point is involved.
//!
//! # Example
//!
//! ```no_run
//! use cinereview_reviews::stores::postgres::PostgresReviewStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/cinereview").await?;
//! let store = PostgresReviewStore::new(pool);
//! # Ok(())
//! # }
//! ```

use crate::aggregate::{AverageRating, RatingSummary};
use crate::error::{ReviewError, Result};
use crate::models::{
    Movie, MovieSummary, NewMovie, NewReview, Rating, Review, ReviewChange, ReviewCommit,
    ReviewFilter,
};
use crate::providers::{CatalogRepository, ReviewGuard, ReviewRepository};
use cinereview_core::{MovieId, Page, PageRequest, ReviewId, UserId};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

const MOVIE_COLUMNS: &str = r"
    id, title, poster_path, genre, tagline, release_date,
    (average_rating * 100)::int4 AS average_hundredths,
    review_count
";

const REVIEW_COLUMNS: &str = "id, movie_id, author_id, content, rating, created_at, updated_at";

/// PostgreSQL catalog and review store.
#[derive(Clone)]
pub struct PostgresReviewStore {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresReviewStore {
    /// Create a new PostgreSQL store.
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: &sqlx::Error) -> ReviewError {
    ReviewError::DatabaseError(format!("{context}: {e}"))
}

fn decode<T>(result: std::result::Result<T, sqlx::Error>) -> Result<T> {
    result.map_err(|e| db_error("Failed to decode row", &e))
}

fn to_u64(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| ReviewError::DatabaseError(format!("negative count {value}")))
}

fn movie_from_row(row: &PgRow) -> Result<Movie> {
    let average_rating = decode(row.try_get::<Option<i32>, _>("average_hundredths"))?
        .map(|hundredths| {
            u16::try_from(hundredths)
                .ok()
                .and_then(AverageRating::from_hundredths)
                .ok_or_else(|| {
                    ReviewError::DatabaseError(format!("stored average {hundredths} out of range"))
                })
        })
        .transpose()?;

    Ok(Movie {
        id: MovieId::new(decode(row.try_get("id"))?),
        title: decode(row.try_get("title"))?,
        poster_path: decode(row.try_get("poster_path"))?,
        genre: decode(row.try_get("genre"))?,
        tagline: decode(row.try_get("tagline"))?,
        release_date: decode(row.try_get("release_date"))?,
        average_rating,
        review_count: to_u64(decode(row.try_get("review_count"))?)?,
    })
}

fn review_from_row(row: &PgRow) -> Result<Review> {
    let rating: i16 = decode(row.try_get("rating"))?;
    Ok(Review {
        id: ReviewId::new(decode(row.try_get("id"))?),
        movie_id: MovieId::new(decode(row.try_get("movie_id"))?),
        author_id: UserId::new(decode(row.try_get("author_id"))?),
        content: decode(row.try_get("content"))?,
        rating: Rating::new(i64::from(rating))
            .map_err(|_| ReviewError::DatabaseError(format!("stored rating {rating} out of range")))?,
        created_at: decode(row.try_get("created_at"))?,
        updated_at: decode(row.try_get("updated_at"))?,
    })
}

fn limit_offset(page: PageRequest) -> Result<(i64, i64)> {
    let offset = i64::try_from(page.offset()).map_err(|_| ReviewError::validation("page is too large"))?;
    Ok((i64::from(page.limit()), offset))
}

/// Escape `LIKE` wildcards in user input.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Lock the movie row for the rest of the transaction. Returns `false` if
/// the movie does not exist.
async fn lock_movie(conn: &mut PgConnection, movie_id: MovieId) -> Result<bool> {
    let row = sqlx::query("SELECT id FROM movies WHERE id = $1 FOR UPDATE")
        .bind(movie_id.get())
        .fetch_optional(conn)
        .await
        .map_err(|e| db_error("Failed to lock movie", &e))?;
    Ok(row.is_some())
}

/// Lock and return a review, if it exists.
async fn lock_review(conn: &mut PgConnection, review_id: ReviewId) -> Result<Option<Review>> {
    sqlx::query(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1 FOR UPDATE"
    ))
    .bind(review_id.get())
    .fetch_optional(conn)
    .await
    .map_err(|e| db_error("Failed to get review", &e))?
    .as_ref()
    .map(review_from_row)
    .transpose()
}

/// Movie the review belongs to. Reviews never move between movies, so this
/// can be read before taking the movie lock.
async fn movie_of(conn: &mut PgConnection, review_id: ReviewId) -> Result<MovieId> {
    let row = sqlx::query("SELECT movie_id FROM reviews WHERE id = $1")
        .bind(review_id.get())
        .fetch_optional(conn)
        .await
        .map_err(|e| db_error("Failed to get review", &e))?
        .ok_or(ReviewError::NotFound("Review"))?;
    Ok(MovieId::new(decode(row.try_get("movie_id"))?))
}

/// Recompute the aggregate from the reviews visible in this transaction and
/// store it on the movie. Caller holds the movie lock.
async fn refresh_aggregate(conn: &mut PgConnection, movie_id: MovieId) -> Result<RatingSummary> {
    let row = sqlx::query(
        r"
        SELECT COALESCE(SUM(rating), 0)::int8 AS rating_sum,
               COUNT(*)::int8 AS rating_count
        FROM reviews
        WHERE movie_id = $1
        ",
    )
    .bind(movie_id.get())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to read ratings", &e))?;

    let sum = to_u64(decode(row.try_get("rating_sum"))?)?;
    let count = to_u64(decode(row.try_get("rating_count"))?)?;
    let summary = RatingSummary::from_totals(sum, count).ok_or_else(|| {
        ReviewError::DatabaseError(format!("ratings of movie {movie_id} out of range"))
    })?;

    let hundredths = summary.average_rating.map(|a| i32::from(a.hundredths()));
    let review_count =
        i64::try_from(summary.review_count).map_err(|_| ReviewError::InternalError)?;

    sqlx::query(
        r"
        UPDATE movies
        SET average_rating = ($2::int4)::numeric / 100,
            review_count = $3
        WHERE id = $1
        ",
    )
    .bind(movie_id.get())
    .bind(hundredths)
    .bind(review_count)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to store aggregate", &e))?;

    Ok(summary)
}

impl PostgresReviewStore {
    async fn begin(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", &e))
    }

    async fn count(&self, query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>) -> Result<u64> {
        let row = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count rows", &e))?;
        to_u64(decode(row.try_get("total"))?)
    }
}

async fn commit(tx: sqlx::Transaction<'static, sqlx::Postgres>) -> Result<()> {
    tx.commit()
        .await
        .map_err(|e| db_error("Failed to commit transaction", &e))
}

impl CatalogRepository for PostgresReviewStore {
    async fn insert_movie(&self, movie: NewMovie) -> Result<Option<Movie>> {
        movie.validate()?;

        sqlx::query(&format!(
            r"
            INSERT INTO movies (title, poster_path, genre, tagline, release_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (title) DO NOTHING
            RETURNING {MOVIE_COLUMNS}
            "
        ))
        .bind(movie.title.trim())
        .bind(&movie.poster_path)
        .bind(&movie.genre)
        .bind(&movie.tagline)
        .bind(movie.release_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert movie", &e))?
        .as_ref()
        .map(movie_from_row)
        .transpose()
    }

    async fn get_movie(&self, movie_id: MovieId) -> Result<Option<Movie>> {
        sqlx::query(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"))
            .bind(movie_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get movie", &e))?
            .as_ref()
            .map(movie_from_row)
            .transpose()
    }

    async fn list_movies(&self, search: Option<&str>, page: PageRequest) -> Result<Page<Movie>> {
        let pattern = search.map(like_pattern);
        let (limit, offset) = limit_offset(page)?;

        let rows = sqlx::query(&format!(
            r"
            SELECT {MOVIE_COLUMNS}
            FROM movies
            WHERE $1::text IS NULL OR title ILIKE $1
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list movies", &e))?;

        let total = self
            .count(
                sqlx::query(
                    "SELECT COUNT(*)::int8 AS total FROM movies WHERE $1::text IS NULL OR title ILIKE $1",
                )
                .bind(pattern.clone()),
            )
            .await?;

        let movies = rows.iter().map(movie_from_row).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(movies, total, page))
    }

    async fn get_movie_summaries(&self, movie_ids: &[MovieId]) -> Result<Vec<MovieSummary>> {
        let ids: Vec<i64> = movie_ids.iter().map(|id| id.get()).collect();

        let rows = sqlx::query("SELECT id, title, poster_path FROM movies WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get movies", &e))?;

        rows.iter()
            .map(|row| {
                Ok(MovieSummary {
                    id: MovieId::new(decode(row.try_get("id"))?),
                    title: decode(row.try_get("title"))?,
                    poster_path: decode(row.try_get("poster_path"))?,
                })
            })
            .collect()
    }

    async fn movie_ids(&self) -> Result<Vec<MovieId>> {
        let rows = sqlx::query("SELECT id FROM movies ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list movie ids", &e))?;

        rows.iter()
            .map(|row| Ok(MovieId::new(decode(row.try_get("id"))?)))
            .collect()
    }
}

impl ReviewRepository for PostgresReviewStore {
    async fn insert_review(&self, review: NewReview) -> Result<ReviewCommit> {
        let mut tx = self.begin().await?;

        if !lock_movie(&mut tx, review.movie_id).await? {
            return Err(ReviewError::NotFound("Movie"));
        }

        let row = sqlx::query(&format!(
            r"
            INSERT INTO reviews (movie_id, author_id, content, rating, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(review.movie_id.get())
        .bind(review.author_id.get())
        .bind(&review.content)
        .bind(i16::from(review.rating.get()))
        .bind(review.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert review", &e))?;
        let stored = review_from_row(&row)?;

        let rating = refresh_aggregate(&mut tx, stored.movie_id).await?;
        commit(tx).await?;

        Ok(ReviewCommit {
            review: stored,
            rating,
        })
    }

    async fn update_review<G: ReviewGuard>(
        &self,
        review_id: ReviewId,
        change: ReviewChange,
        guard: G,
    ) -> Result<ReviewCommit> {
        let mut tx = self.begin().await?;

        let movie_id = movie_of(&mut tx, review_id).await?;
        lock_movie(&mut tx, movie_id).await?;
        let current = lock_review(&mut tx, review_id)
            .await?
            .ok_or(ReviewError::NotFound("Review"))?;
        guard(&current)?;

        let row = sqlx::query(&format!(
            r"
            UPDATE reviews
            SET content = $2, rating = $3, updated_at = $4
            WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(review_id.get())
        .bind(&change.content)
        .bind(i16::from(change.rating.get()))
        .bind(change.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update review", &e))?;
        let updated = review_from_row(&row)?;

        let rating = refresh_aggregate(&mut tx, movie_id).await?;
        commit(tx).await?;

        Ok(ReviewCommit {
            review: updated,
            rating,
        })
    }

    async fn delete_review<G: ReviewGuard>(
        &self,
        review_id: ReviewId,
        guard: G,
    ) -> Result<ReviewCommit> {
        let mut tx = self.begin().await?;

        let movie_id = movie_of(&mut tx, review_id).await?;
        lock_movie(&mut tx, movie_id).await?;
        let current = lock_review(&mut tx, review_id)
            .await?
            .ok_or(ReviewError::NotFound("Review"))?;
        guard(&current)?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete review", &e))?;

        let rating = refresh_aggregate(&mut tx, movie_id).await?;
        commit(tx).await?;

        Ok(ReviewCommit {
            review: current,
            rating,
        })
    }

    async fn get_review(&self, review_id: ReviewId) -> Result<Option<Review>> {
        sqlx::query(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
            .bind(review_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get review", &e))?
            .as_ref()
            .map(review_from_row)
            .transpose()
    }

    async fn list_reviews(&self, filter: ReviewFilter, page: PageRequest) -> Result<Page<Review>> {
        let movie_id = filter.movie_id.map(MovieId::get);
        let author_id = filter.author_id.map(UserId::get);
        let (limit, offset) = limit_offset(page)?;

        let rows = sqlx::query(&format!(
            r"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE ($1::int8 IS NULL OR movie_id = $1)
              AND ($2::int8 IS NULL OR author_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(movie_id)
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list reviews", &e))?;

        let total = self
            .count(
                sqlx::query(
                    r"
                    SELECT COUNT(*)::int8 AS total
                    FROM reviews
                    WHERE ($1::int8 IS NULL OR movie_id = $1)
                      AND ($2::int8 IS NULL OR author_id = $2)
                    ",
                )
                .bind(movie_id)
                .bind(author_id),
            )
            .await?;

        let reviews = rows.iter().map(review_from_row).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(reviews, total, page))
    }

    async fn recompute_rating(&self, movie_id: MovieId) -> Result<RatingSummary> {
        let mut tx = self.begin().await?;

        if !lock_movie(&mut tx, movie_id).await? {
            return Err(ReviewError::NotFound("Movie"));
        }
        let rating = refresh_aggregate(&mut tx, movie_id).await?;
        commit(tx).await?;

        Ok(rating)
    }
}
