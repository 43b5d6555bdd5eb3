//! Validation-based enforcement for guarded transitions.
//!
//! Rules collect every violation in one pass using stillwater's
//! `Validation` instead of stopping at the first failure. The machine that
//! owns the rules decides what a failure means through its
//! [`ViolationStrategy`].
//!
//! # Example
//!
//! ```rust
//! use patternworks::enforcement::{EnforcementBuilder, EnforcementRules, ViolationStrategy};
//! use std::time::Duration;
//!
//! # use patternworks::core::State;
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! # enum Stage { Waiting, Paid }
//! # impl State for Stage {
//! #     fn name(&self) -> &str { "Stage" }
//! # }
//!
//! let rules: EnforcementRules<Stage> = EnforcementBuilder::new()
//!     .deadline(Duration::from_secs(300))
//!     .on_violation(ViolationStrategy::Abort)
//!     .build();
//! ```

pub mod builder;
pub mod context;
pub mod rules;
pub mod violations;

pub use builder::EnforcementBuilder;
pub use context::TransitionContext;
pub use rules::{EnforcementRules, Verdict};
pub use violations::{ViolationError, ViolationStrategy};
