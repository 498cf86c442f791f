//! User profile domain types.
//!
//! These are application-level records assembled from an identity session
//! plus the stored `profiles` row; they are separate from the wire types in
//! [`crate::identity`].

use serde::{Deserialize, Serialize};

use luxe_core::{AddressId, MembershipTier, ProductId, UserId};

use crate::identity::{ProfileRecord, SessionUser};

/// Display name used until the user sets one.
pub const DEFAULT_DISPLAY_NAME: &str = "New User";

/// The signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Empty when the identity service has no email on record.
    pub email: String,
    /// Avatar image URL.
    pub avatar: Option<String>,
    pub membership_tier: MembershipTier,
    pub loyalty_points: u64,
    /// Wishlist stored on the profile.
    pub wishlist: Vec<ProductId>,
    pub addresses: Vec<Address>,
}

impl User {
    /// Assemble a user from the session and its profile row.
    ///
    /// Wishlist and addresses live in separate tables that aren't fetched at
    /// sign-in, so they start empty.
    #[must_use]
    pub fn from_profile(session_user: &SessionUser, record: ProfileRecord) -> Self {
        Self {
            id: record.id,
            name: record
                .full_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            email: session_user.email.clone().unwrap_or_default(),
            avatar: record.avatar_url,
            membership_tier: record.membership_tier,
            loyalty_points: record.loyalty_points.unwrap_or(0),
            wishlist: Vec::new(),
            addresses: Vec::new(),
        }
    }
}

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub name: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}
