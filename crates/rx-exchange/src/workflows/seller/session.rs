use async_trait::async_trait;

use super::domain::{SellerId, SessionUser, VerificationStatus};

/// Identity/session collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<SessionUser>, IdentityError>;
    async fn verification_status(
        &self,
        user_id: &SellerId,
    ) -> Result<VerificationStatus, IdentityError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Explicit per-session context handed to the gate and the wizard.
///
/// Populated by [`SessionContext::establish`], re-read by
/// [`SessionContext::refresh`], and cleared by [`SessionContext::sign_out`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<SessionUser>,
    verification_status: Option<VerificationStatus>,
}

impl SessionContext {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub async fn establish(identity: &dyn IdentityProvider) -> Result<Self, IdentityError> {
        let mut session = Self::signed_out();
        session.refresh(identity).await?;
        Ok(session)
    }

    pub async fn refresh(&mut self, identity: &dyn IdentityProvider) -> Result<(), IdentityError> {
        let user = identity.current_user().await?;
        let verification_status = match &user {
            Some(user) => Some(identity.verification_status(&user.id).await?),
            None => None,
        };
        self.user = user;
        self.verification_status = verification_status;
        Ok(())
    }

    pub fn sign_out(&mut self) {
        self.user = None;
        self.verification_status = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn seller_id(&self) -> Option<&SellerId> {
        self.user.as_ref().map(|user| &user.id)
    }

    /// Status cached at establishment; a missing profile reads as unverified.
    pub fn verification_status(&self) -> VerificationStatus {
        self.verification_status.unwrap_or_default()
    }
}
