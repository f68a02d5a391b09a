//! # Domain Identifiers
//!
//! Newtype wrappers for the string identifiers the ledger handles, so a
//! wallet address cannot be passed where a credential id is expected.
//! All three reject empty and whitespace-only input at construction.

use serde::{Deserialize, Deserializer, Serialize};

use crate::digest::ContentDigest;
use crate::error::IdentityError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Construct the identifier, rejecting blank input.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(IdentityError::Empty { kind: $kind });
                }
                Ok(Self(value))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdentityError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::new(s).map_err(serde::de::Error::custom)
            }
        }
    };
}

string_id!(
    /// Identifier of an accredited ledger participant (proposer or replica).
    ParticipantId,
    "participant id"
);

string_id!(
    /// Stable identifier of an academic credential across issuance and revocation.
    CredentialId,
    "credential id"
);

string_id!(
    /// Address of the credential holder's wallet.
    WalletAddress,
    "wallet address"
);

impl WalletAddress {
    /// Address rendered as the bare lowercase hex of `digest`.
    pub fn from_digest(digest: &ContentDigest) -> Self {
        Self(digest.to_hex())
    }
}
