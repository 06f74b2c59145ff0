//! Barangay Core: domain models, error taxonomy, role policy and the
//! collaborator traits (persistence, identity provider) the onboarding
//! services are generic over.

pub mod error;
pub mod identity;
pub mod models;
pub mod policy;
pub mod repository;

pub use error::{BarangayError, BarangayResult};
