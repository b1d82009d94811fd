//! Session-related types.
//!
//! The only state the site keeps in a session is the admin privilege flag.

/// Session keys for authentication data.
pub mod keys {
    /// Key for the admin privilege flag (`bool`).
    pub const IS_ADMIN: &str = "is_admin";
}
