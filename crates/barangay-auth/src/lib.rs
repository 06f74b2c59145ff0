//! Barangay Auth: identity provider, invitation ledger, tenant
//! resolution, session resolution and the onboarding flow.

pub mod bootstrap;
pub mod code;
pub mod config;
pub mod error;
pub mod identity;
pub mod invitation;
pub mod members;
pub mod onboarding;
pub mod password;
pub mod session;
pub mod tenant;
pub mod token;

pub use bootstrap::{BootstrapConfig, ensure_superadmin};
pub use config::{AuthConfig, InvitationConfig};
pub use error::AuthError;
pub use identity::LocalIdentityProvider;
pub use invitation::InvitationLedger;
pub use members::MemberDirectory;
pub use onboarding::{AccountDetails, OnboardingFlow, OnboardingStep};
pub use session::{SessionContext, SessionGateway};
pub use tenant::TenantResolver;
pub use token::AccessTokenClaims;
