//! Macro for implementing Display and FromStr for option enums
//!
//! Configuration knobs that are spelled as strings (in TOML, JSON or
//! environment variables) share one Display/FromStr implementation. Parsing is
//! case-insensitive and output is always the canonical lowercase spelling.
//!
//! # Example
//!
//! ```rust
//! use calsync_domain::impl_domain_option_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Backend {
//!     Postgres,
//!     Sqlite,
//! }
//!
//! impl_domain_option_conversions!(Backend {
//!     Postgres => "postgres",
//!     Sqlite => "sqlite",
//! });
//!
//! assert_eq!("SQLite".parse::<Backend>().unwrap(), Backend::Sqlite);
//! ```

/// Implements Display and FromStr traits for option enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
#[macro_export]
macro_rules! impl_domain_option_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
