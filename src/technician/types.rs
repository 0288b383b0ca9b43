// Core types for technicians and their reviews

use serde::{Deserialize, Serialize};

/// A customer review left for a technician
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub user_name: String,
    /// Star rating, 1 to 5
    pub rating: u8,
    pub comment: String,
    /// Date as shown to the user (dd/mm/yyyy)
    pub date: String,
}

impl Review {
    pub fn new(user_name: &str, rating: u8, comment: &str, date: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            rating,
            comment: comment.to_string(),
            date: date.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub id: String,
    pub name: String,
    pub title: String,
    pub experience: String,
    pub bio: String,
    pub total_services_completed: u32,
    pub reviews: Vec<Review>,
}

impl Technician {
    /// Mean of all review ratings, 0 when there are no reviews.
    ///
    /// Always recomputed from `reviews`; never cached.
    pub fn average_rating(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        f64::from(total) / self.reviews.len() as f64
    }

    /// Headline shown on the assignment card, e.g. "4.75 (542+ services)"
    pub fn rating_headline(&self) -> String {
        format!(
            "{} ({}+ services)",
            self.average_rating(),
            self.total_services_completed
        )
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn technician_with_ratings(ratings: &[u8]) -> Technician {
        Technician {
            id: "t-1".to_string(),
            name: "Ana Gómez".to_string(),
            title: "Systems engineer".to_string(),
            experience: "5 years".to_string(),
            bio: String::new(),
            total_services_completed: 10,
            reviews: ratings
                .iter()
                .map(|r| Review::new("client", *r, "ok", "01/01/2024"))
                .collect(),
        }
    }

    #[test]
    fn test_average_rating_is_mean_of_reviews() {
        let tech = technician_with_ratings(&[5, 5, 4, 5]);
        assert_eq!(tech.average_rating(), 4.75);
    }

    #[test]
    fn test_average_rating_without_reviews_is_zero() {
        let tech = technician_with_ratings(&[]);
        assert_eq!(tech.average_rating(), 0.0);
    }

    #[test]
    fn test_average_rating_tracks_review_changes() {
        let mut tech = technician_with_ratings(&[5]);
        assert_eq!(tech.average_rating(), 5.0);
        tech.reviews.push(Review::new("other", 3, "slow", "02/01/2024"));
        assert_eq!(tech.average_rating(), 4.0);
    }

    #[test]
    fn test_rating_headline_and_first_name() {
        let tech = technician_with_ratings(&[5, 5, 4, 5]);
        assert_eq!(tech.rating_headline(), "4.75 (10+ services)");
        assert_eq!(tech.first_name(), "Ana");
    }
}
