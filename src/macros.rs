//! Macros for registry enumerations.

use thiserror::Error;

/// Error returned when a string does not name a variant of a registry enum.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Invalid {kind} value '{value}'. Possible values: {domain:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub domain: Vec<&'static str>,
}

/// Generate a closed registry enumeration with its full value domain.
///
/// Each variant is paired with its canonical upper-case name. The macro
/// derives ordering, hashing and serde (as `SCREAMING_SNAKE_CASE`, so the
/// names must follow that convention), and implements `Display`, exact-match
/// `FromStr`, an `ALL` constant listing the domain, and
/// [`ScheduleValue`](crate::core::ScheduleValue).
///
/// # Example
///
/// ```
/// use tld_timetable::registry_enum;
///
/// registry_enum! {
///     pub enum Launch {
///         Sunrise => "SUNRISE",
///         Landrush => "LANDRUSH",
///     }
/// }
///
/// assert_eq!(Launch::ALL.len(), 2);
/// assert_eq!("SUNRISE".parse::<Launch>(), Ok(Launch::Sunrise));
/// assert!("sunrise".parse::<Launch>().is_err());
/// ```
#[macro_export]
macro_rules! registry_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every value of the enumeration, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),*
                }
            }

            /// Names of every value, in declaration order.
            pub fn domain() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.name()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name() == s)
                    .ok_or_else(|| $crate::ParseEnumError {
                        kind: stringify!($name),
                        value: s.to_string(),
                        domain: Self::domain(),
                    })
            }
        }

        impl $crate::core::ScheduleValue for $name {}
    };
}
