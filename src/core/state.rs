//! The `State` trait shared by every machine in the crate.
//!
//! Stages are plain values. The behavior attached to a stage lives in the
//! machine's handler objects; this trait only answers questions about where
//! a machine currently is.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for machine stages.
///
/// All methods are pure. A stage names a position in a state machine and
/// says whether the machine can still move from it.
///
/// # Required Traits
///
/// - `Clone`: stages are copied into the transition history
/// - `PartialEq`: tests and guards compare stages
/// - `Debug`: stages show up in diagnostics
/// - `Serialize` + `Deserialize`: histories can be exported as JSON
///
/// # Example
///
/// ```rust
/// use patternworks::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Turnstile {
///     Locked,
///     Unlocked,
///     Broken,
/// }
///
/// impl State for Turnstile {
///     fn name(&self) -> &str {
///         match self {
///             Self::Locked => "Locked",
///             Self::Unlocked => "Unlocked",
///             Self::Broken => "Broken",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
/// }
///
/// assert!(!Turnstile::Locked.is_final());
/// assert!(Turnstile::Broken.is_error());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Display name of the stage.
    fn name(&self) -> &str;

    /// Whether the machine is finished once it reaches this stage.
    ///
    /// Defaults to `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Whether this stage represents a failed or abandoned session.
    ///
    /// Defaults to `false`.
    fn is_error(&self) -> bool {
        false
    }
}
