//! Signed-in user marker.

use serde::{Deserialize, Serialize};

/// The current user, as mirrored from the account service.
///
/// Stored as a single value in the substrate; cleared on logout, possibly
/// from another tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            bio: String::new(),
        }
    }
}
