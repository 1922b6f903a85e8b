//! Shared primitive types used across the entire pipeline.

/// The numeric customer/user identifier shared by all three relations.
/// Accounts carry it with a `C` prefix (`C00042`); activity and support
/// rows carry the bare number.
pub type UserId = i64;
