//! Seller identity, session context, and the verification gate.

pub mod domain;
pub mod session;
pub mod verification;


pub use domain::{SellerId, SessionUser, VerificationStatus};
pub use session::{IdentityError, IdentityProvider, SessionContext};
pub use verification::{
    AuthorizationError, BlockingNotice, GateDecision, VerificationGate, VerificationView,
};
