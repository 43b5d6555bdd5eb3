//! Macros for declaring machine stages.

/// Generate a stage enum together with its `State` implementation.
///
/// Stage names are the variant names. Variants listed under `final:` end
/// the session; variants under `error:` mark an abandoned one.
///
/// # Example
///
/// ```
/// use patternworks::state_enum;
/// use patternworks::core::State;
///
/// state_enum! {
///     pub enum ParcelStage {
///         Packed,
///         InTransit,
///         Delivered,
///         Lost,
///     }
///     final: [Delivered, Lost]
///     error: [Lost]
/// }
///
/// assert_eq!(ParcelStage::InTransit.name(), "InTransit");
/// assert!(ParcelStage::Lost.is_error());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
        $(error: [$($error:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            fn is_error(&self) -> bool {
                match self {
                    $($(Self::$error => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }
    };
}
