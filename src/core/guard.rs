//! Named predicates.
//!
//! A guard wraps a pure check together with a short description that is
//! reported when the check fails. Guards are used by the enforcement rules
//! and by machines that want to name their preconditions.

use std::fmt;

/// Pure, named predicate over a value of type `T`.
///
/// # Example
///
/// ```rust
/// use patternworks::core::Guard;
///
/// let positive = Guard::new("amount must be positive", |amount: &i64| *amount > 0);
///
/// assert!(positive.check(&5));
/// assert!(!positive.check(&0));
/// assert_eq!(positive.describe(), "amount must be positive");
/// ```
pub struct Guard<T: ?Sized> {
    description: String,
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: ?Sized> Guard<T> {
    /// Create a guard from a description and a pure predicate.
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Guard {
            description: description.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the predicate.
    pub fn check(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    /// What the guard requires, phrased for an error message.
    pub fn describe(&self) -> &str {
        &self.description
    }
}

impl<T: ?Sized> fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Booth {
        open: bool,
        queue: usize,
    }

    #[test]
    fn guard_passes_matching_values() {
        let open = Guard::new("booth must be open", |b: &Booth| b.open);

        assert!(open.check(&Booth { open: true, queue: 0 }));
        assert!(!open.check(&Booth { open: false, queue: 0 }));
    }

    #[test]
    fn guard_is_deterministic() {
        let short_queue = Guard::new("queue under five", |b: &Booth| b.queue < 5);
        let booth = Booth { open: true, queue: 3 };

        assert_eq!(short_queue.check(&booth), short_queue.check(&booth));
    }

    #[test]
    fn guard_over_unsized_str() {
        let non_blank = Guard::new("text must not be blank", |s: &str| !s.trim().is_empty());

        assert!(non_blank.check("hello"));
        assert!(!non_blank.check("   "));
    }

    #[test]
    fn debug_shows_description() {
        let guard = Guard::new("always", |_: &u8| true);
        assert!(format!("{guard:?}").contains("always"));
    }
}
