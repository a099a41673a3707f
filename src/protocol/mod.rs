/// Generic activity struct with typed common fields
pub mod activity;
/// Normalization of the `@context` field
pub mod context;
/// Serde deserialization functions which help to receive differently shaped data
pub mod helpers;
/// Actor representation used for delivery
pub mod person;
pub mod tombstone;
