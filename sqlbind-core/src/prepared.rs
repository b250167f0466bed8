use std::fmt::Display;

/// Driver-side prepared statement handle.
///
/// Owned by exactly one [`crate::Statement`] and released through
/// [`crate::Connection::close`].
pub trait Prepared: Display {
    /// The SQL the handle was prepared from.
    fn sql(&self) -> &str;
}
