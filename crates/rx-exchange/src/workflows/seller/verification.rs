use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::domain::{SellerId, VerificationStatus};
use super::session::{IdentityError, IdentityProvider, SessionContext};

/// Explanation rendered instead of the wizard when entry is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingNotice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VerificationStatus>,
    pub title: String,
    pub explanation: String,
}

impl BlockingNotice {
    fn signed_out() -> Self {
        Self {
            status: None,
            title: "Sign in required".to_string(),
            explanation: "Sign in with a verified pharmacist account to register medicines."
                .to_string(),
        }
    }

    fn for_status(status: VerificationStatus) -> Self {
        Self {
            status: Some(status),
            title: status.title().to_string(),
            explanation: status.description().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Permitted { seller_id: SellerId },
    Blocked(BlockingNotice),
}

impl GateDecision {
    pub fn is_permitted(&self) -> bool {
        matches!(self, GateDecision::Permitted { .. })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthorizationError {
    #[error("sign in to register listings")]
    SignedOut,
    #[error("seller {seller_id} cannot register listings while verification is {status}")]
    NotVerified {
        seller_id: SellerId,
        status: VerificationStatus,
    },
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Serializable gate state for a seller.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationView {
    pub seller_id: SellerId,
    pub status: VerificationStatus,
    pub title: &'static str,
    pub description: &'static str,
    pub can_register_listings: bool,
    pub can_request_verification: bool,
}

/// Reads the seller's verification status and permits wizard entry only when
/// it is `verified`. Always reads the identity collaborator, never the status
/// cached in the session.
#[derive(Clone)]
pub struct VerificationGate {
    identity: Arc<dyn IdentityProvider>,
}

impl VerificationGate {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    pub async fn evaluate(&self, session: &SessionContext) -> Result<GateDecision, IdentityError> {
        match session.seller_id() {
            Some(seller_id) => self.evaluate_seller(seller_id).await,
            None => Ok(GateDecision::Blocked(BlockingNotice::signed_out())),
        }
    }

    pub async fn evaluate_seller(&self, seller_id: &SellerId) -> Result<GateDecision, IdentityError> {
        let status = self.identity.verification_status(seller_id).await?;
        debug!(%seller_id, %status, "evaluated verification gate");
        if status.is_verified() {
            Ok(GateDecision::Permitted {
                seller_id: seller_id.clone(),
            })
        } else {
            Ok(GateDecision::Blocked(BlockingNotice::for_status(status)))
        }
    }

    pub async fn authorize(&self, session: &SessionContext) -> Result<SellerId, AuthorizationError> {
        let seller_id = session.seller_id().ok_or(AuthorizationError::SignedOut)?;
        let status = self.identity.verification_status(seller_id).await?;
        if status.is_verified() {
            Ok(seller_id.clone())
        } else {
            Err(AuthorizationError::NotVerified {
                seller_id: seller_id.clone(),
                status,
            })
        }
    }

    pub async fn view(&self, seller_id: &SellerId) -> Result<VerificationView, IdentityError> {
        let status = self.identity.verification_status(seller_id).await?;
        Ok(VerificationView {
            seller_id: seller_id.clone(),
            status,
            title: status.title(),
            description: status.description(),
            can_register_listings: status.is_verified(),
            can_request_verification: status.can_request_verification(),
        })
    }
}

impl std::fmt::Debug for VerificationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationGate").finish_non_exhaustive()
    }
}
