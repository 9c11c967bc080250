//! Shared types for the gym management backend
//!
//! Common types used by the server and API clients: request/response DTOs,
//! the response envelope, and domain enumerations.

pub mod client;
pub mod response;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Domain enum re-exports (for convenient access)
pub use types::{
    ClassCategory, Difficulty, MembershipPlan, MembershipStatus, PaymentMethod, PaymentStatus,
    Role, Weekday, WorkoutCategory,
};

pub use response::{ApiResponse, ListResponse};
