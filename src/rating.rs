//! Service rating, the last wizard step.
//!
//! Users either rate the technician with 1 to 5 stars and an optional
//! comment, or skip the step.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("Rating must be between {MIN_STARS} and {MAX_STARS} stars, got {0}")]
    StarsOutOfRange(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RatingOutcome {
    Submitted { stars: u8, comment: Option<String> },
    Skipped,
}

impl RatingOutcome {
    /// Stars given, 0 when skipped
    pub fn stars(&self) -> u8 {
        match self {
            RatingOutcome::Submitted { stars, .. } => *stars,
            RatingOutcome::Skipped => 0,
        }
    }

    /// Comment text, empty when skipped or left blank
    pub fn comment(&self) -> &str {
        match self {
            RatingOutcome::Submitted { comment: Some(c), .. } => c,
            _ => "",
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RatingOutcome::Skipped)
    }
}

/// Validate and record a rating. Blank comments are dropped.
pub fn submit_rating(stars: u8, comment: &str) -> Result<RatingOutcome, RatingError> {
    if !(MIN_STARS..=MAX_STARS).contains(&stars) {
        return Err(RatingError::StarsOutOfRange(stars));
    }

    let comment = comment.trim();
    let comment = (!comment.is_empty()).then(|| comment.to_string());

    info!(stars = %stars, has_comment = comment.is_some(), "Service rated");
    Ok(RatingOutcome::Submitted { stars, comment })
}

pub fn skip_rating() -> RatingOutcome {
    info!("Service rating skipped");
    RatingOutcome::Skipped
}
