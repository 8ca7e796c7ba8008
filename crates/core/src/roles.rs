//! Well-known role names carried in access-token claims.

/// Full access, including course authoring and reordering.
pub const ROLE_ADMIN: &str = "admin";

/// Regular community member (read-only access to course content).
pub const ROLE_MEMBER: &str = "member";
