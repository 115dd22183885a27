use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the seller account (the identity provider's user id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerId(pub String);

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed-in account as reported by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: SellerId,
    pub email: String,
}

/// Pharmacist credential review state. Transitions happen outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "Verification required",
            VerificationStatus::Pending => "Verification under review",
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Rejected => "Verification rejected",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            VerificationStatus::Unverified => {
                "Pharmacist verification is required before you can list or trade medicines."
            }
            VerificationStatus::Pending => {
                "Your verification documents were submitted. Please wait for the review to finish."
            }
            VerificationStatus::Verified => {
                "Your pharmacist verification is complete. All trading features are available."
            }
            VerificationStatus::Rejected => {
                "Your verification was rejected. Check your documents and submit them again."
            }
        }
    }

    pub const fn is_verified(self) -> bool {
        matches!(self, VerificationStatus::Verified)
    }

    /// Whether the seller may file a (new) verification request.
    pub const fn can_request_verification(self) -> bool {
        matches!(
            self,
            VerificationStatus::Unverified | VerificationStatus::Rejected
        )
    }

    /// Transitions driven by the verification-request flow and the moderator.
    pub const fn can_transition_to(self, next: VerificationStatus) -> bool {
        matches!(
            (self, next),
            (
                VerificationStatus::Unverified | VerificationStatus::Rejected,
                VerificationStatus::Pending
            ) | (
                VerificationStatus::Pending,
                VerificationStatus::Verified | VerificationStatus::Rejected
            )
        )
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
