//! Domain models for barangay onboarding and access control.

pub mod account;
pub mod invitation;
pub mod principal;
pub mod role;
pub mod tenant;
