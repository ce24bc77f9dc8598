//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing an `OrderId` where a `PaymentId` is expected.
//! All IDs are UUID v7, so ordering by ID follows creation order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

typed_id!(CustomerId, "Unique identifier for a customer.");
typed_id!(OrderId, "Unique identifier for a customer order (invoice).");
typed_id!(OrderRollId, "Unique identifier for a produced roll.");
typed_id!(PaymentId, "Unique identifier for a customer payment.");
typed_id!(AllocationId, "Unique identifier for a payment allocation.");
typed_id!(ReceiptId, "Unique identifier for a material receipt.");
typed_id!(RawMaterialTxnId, "Unique identifier for a raw-material transaction.");
typed_id!(LedgerEntryId, "Unique identifier for a material ledger entry.");
typed_id!(SupplierPaymentId, "Unique identifier for a supplier payment.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = OrderId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
    }

    #[test]
    fn test_typed_id_display_and_parse() {
        let id = CustomerId::new();
        let parsed = CustomerId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert!(PaymentId::from_str("not-a-uuid").is_err());
    }
}
