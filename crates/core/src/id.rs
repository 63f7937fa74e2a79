//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $t:ident) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in
            /// tests for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s).map_err(|e| {
                    DomainError::invalid_input(format!(concat!(stringify!($t), ": {}"), e))
                })?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_id!(
    /// Identifier of a catalog article.
    ArticleId
);
uuid_id!(
    /// Identifier of a physical location (building/department).
    LocationId
);
uuid_id!(
    /// Identifier of a vehicle (alternative service-order target).
    VehicleId
);
uuid_id!(
    /// Identifier of a purchase provider.
    ProviderId
);
uuid_id!(
    /// Identifier of one traceable physical unit of an identifiable article.
    IdentifiedItemId
);
uuid_id!(
    /// Identifier of a purchase order.
    PurchaseOrderId
);
uuid_id!(
    /// Identifier of a purchase order line.
    PurchaseLineId
);
uuid_id!(
    /// Identifier of a service order.
    ServiceOrderId
);
uuid_id!(
    /// Identifier of a bulk article line on a service order.
    ArticleLineId
);
uuid_id!(
    /// Identifier of an identified-item assignment on a service order.
    ItemAssignmentId
);
uuid_id!(
    /// Identifier of a leftover.
    LeftoverId
);
uuid_id!(
    /// Identifier of a leftover usage (provenance record).
    LeftoverUsageId
);
uuid_id!(
    /// Identifier of a loan.
    LoanId
);
uuid_id!(
    /// Identifier of a loan line.
    LoanLineId
);
uuid_id!(
    /// Identifier of a movement ledger entry.
    EntryId
);
uuid_id!(
    /// Reference into the external category directory.
    CategoryId
);
uuid_id!(
    /// Reference into the external brand directory.
    BrandId
);
uuid_id!(
    /// Reference into the external measurement-unit directory.
    UnitId
);
uuid_id!(
    /// Reference into the external tender directory.
    TenderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_from_str() {
        let id = ArticleId::new();
        let parsed: ArticleId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_malformed_input() {
        let err = "not-a-uuid".parse::<LocationId>().unwrap_err();
        match err {
            DomainError::InvalidInput(msg) => assert!(msg.contains("LocationId")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }
}
