// Public user projection
//
// The only user shape that ever leaves the API. Password hashes, one-time
// tokens and session tokens are never part of it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Role;

/// User as seen by the account owner and by the browser session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub email_verified: bool,
    /// A payout account is linked with the payment provider
    pub has_payment_account: bool,
    /// The payment provider has cleared the linked account for payouts
    pub payouts_enabled: bool,
}

/// Body of login, registration and refresh responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionPayload {
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_uses_camel_case() {
        let profile = UserProfile {
            id: Uuid::nil(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            role: Role::Client,
            email_verified: true,
            has_payment_account: false,
            payouts_enabled: false,
        };

        let json = serde_json::to_value(SessionPayload { user: profile }).unwrap();
        assert_eq!(json["user"]["emailVerified"], true);
        assert_eq!(json["user"]["hasPaymentAccount"], false);
        assert_eq!(json["user"]["role"], "CLIENT");
    }
}
