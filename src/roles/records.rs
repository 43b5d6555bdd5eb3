//! Members, courses and reviews.

use super::capability::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Eight uppercase hex digits taken from a v4 UUID.
pub(crate) fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id.to_uppercase()
}

/// A student's standing in one course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Percent complete, 0..=100
    pub progress: u8,
    pub test_score: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub registered_at: DateTime<Utc>,
    pub blocked: bool,
    pub enrollments: BTreeMap<String, Enrollment>,
    pub authored: BTreeSet<String>,
}

impl Member {
    pub(crate) fn new(name: String, email: String, role: Role, at: DateTime<Utc>) -> Self {
        Self {
            id: short_id(),
            name,
            email,
            role,
            registered_at: at,
            blocked: false,
            enrollments: BTreeMap::new(),
            authored: BTreeSet::new(),
        }
    }

    pub fn is_enrolled(&self, course: &str) -> bool {
        self.enrollments.contains_key(course)
    }

    pub fn is_author_of(&self, course: &str) -> bool {
        self.authored.contains(course)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTest {
    pub name: String,
    pub max_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub author_id: String,
    pub materials: Vec<Material>,
    pub tests: Vec<CourseTest>,
    pub reviews: Vec<String>,
    pub enrolled: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub course_id: String,
    rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub status: ReviewStatus,
}

impl Review {
    /// Build a pending review; the rating is clamped to 1..=5.
    pub fn new(
        author: &Member,
        course_id: impl Into<String>,
        rating: i32,
        comment: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: short_id(),
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            course_id: course_id.into(),
            rating: rating.clamp(1, 5) as u8,
            comment: comment.into(),
            created_at: at,
            status: ReviewStatus::Pending,
        }
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> Member {
        Member::new("Ann".into(), "ann@example.com".into(), Role::Student, Utc::now())
    }

    #[test]
    fn review_rating_is_clamped() {
        let ann = member();
        assert_eq!(Review::new(&ann, "C1", 9, "great", Utc::now()).rating(), 5);
        assert_eq!(Review::new(&ann, "C1", -3, "bad", Utc::now()).rating(), 1);
        assert_eq!(Review::new(&ann, "C1", 4, "good", Utc::now()).rating(), 4);
    }

    #[test]
    fn new_review_is_pending() {
        let review = Review::new(&member(), "C1", 3, "ok", Utc::now());
        assert_eq!(review.status, ReviewStatus::Pending);
        assert_eq!(review.author_name, "Ann");
    }

    #[test]
    fn ids_are_short_hex() {
        let id = short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
