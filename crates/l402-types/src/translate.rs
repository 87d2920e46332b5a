//! Translation between wire records ([`crate::proto`]) and the domain model.
//!
//! Each entity has exactly one field table, declared with `field_mapping!`.
//! The macro generates both `From` directions from that table, so every field
//! travels both ways and `from_wire(to_wire(x)) == x` holds by construction.
//! Renamed fields (`type` ↔ `kind`) are handled by the serde attributes of the
//! wire record; structural differences (the payment request payload) by
//! [`Translate`] impls on the field types.
//!
//! Translation performs no validation: decoded values are what the server
//! said. The only failure is a structurally broken record, reported by
//! [`decode_wire`].
//!
//! ```
//! use l402_types::{Offer, WireFormat};
//!
//! let offer = Offer::new("o1", 1, "USD", "One Cent Offer", "A 1 cent offer").unwrap();
//! let wire = offer.to_wire();
//! assert_eq!(wire.offer_id, "o1");
//! assert_eq!(Offer::from_wire(wire), offer);
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::offer::{Offer, OfferBundle};
use crate::payment::{LightningPayment, PaymentDetails, PaymentRecord, PaymentRequest, PaymentStatus};
use crate::proto::{
    L402OffersData, OfferData, PayLightningRequest, PaymentDetailsData, PaymentResponseData,
    PaymentStatusData,
};

/// A domain entity with a wire-format counterpart.
pub trait WireFormat: Sized + Clone {
    /// The wire record this entity is exchanged as.
    type Wire: Serialize + DeserializeOwned + From<Self> + Into<Self>;

    fn to_wire(&self) -> Self::Wire {
        self.clone().into()
    }

    fn from_wire(wire: Self::Wire) -> Self {
        wire.into()
    }
}

/// Decodes a JSON wire record into its domain entity.
///
/// Unknown fields are ignored. Fails only when a required field is missing or
/// has the wrong JSON type.
pub fn decode_wire<E: WireFormat>(bytes: &[u8]) -> Result<E, serde_json::Error> {
    serde_json::from_slice::<E::Wire>(bytes).map(E::from_wire)
}

/// Encodes a domain entity as its JSON wire record.
pub fn encode_wire<E: WireFormat>(entity: &E) -> Result<Value, serde_json::Error> {
    serde_json::to_value(entity.to_wire())
}

/// Field-level conversion used by the mapping tables.
///
/// Identical field types pass through unchanged.
pub trait Translate<T> {
    fn translate(self) -> T;
}

impl<T> Translate<T> for T {
    fn translate(self) -> T {
        self
    }
}

impl Translate<Vec<Offer>> for Vec<OfferData> {
    fn translate(self) -> Vec<Offer> {
        self.into_iter().map(Offer::from).collect()
    }
}

impl Translate<Vec<OfferData>> for Vec<Offer> {
    fn translate(self) -> Vec<OfferData> {
        self.into_iter().map(OfferData::from).collect()
    }
}

impl Translate<PaymentRequest> for Map<String, Value> {
    fn translate(self) -> PaymentRequest {
        PaymentRequest::from(self)
    }
}

impl Translate<Map<String, Value>> for PaymentRequest {
    fn translate(self) -> Map<String, Value> {
        self.into()
    }
}

macro_rules! field_mapping {
    ($domain:ident <=> $wire:ident { $($field:ident),+ $(,)? }) => {
        impl From<$wire> for $domain {
            fn from(wire: $wire) -> Self {
                Self {
                    $($field: Translate::translate(wire.$field),)+
                }
            }
        }

        impl From<$domain> for $wire {
            fn from(domain: $domain) -> Self {
                Self {
                    $($field: Translate::translate(domain.$field),)+
                }
            }
        }

        impl WireFormat for $domain {
            type Wire = $wire;
        }
    };
}

field_mapping!(Offer <=> OfferData {
    offer_id,
    amount,
    currency,
    description,
    title,
    payment_methods,
    kind,
});

field_mapping!(OfferBundle <=> L402OffersData {
    offers,
    payment_context_token,
    payment_request_url,
    version,
});

field_mapping!(PaymentDetails <=> PaymentDetailsData {
    expires_at,
    offer_id,
    payment_request,
    version,
});

field_mapping!(PaymentStatus <=> PaymentStatusData {
    status,
    paid_at,
    amount,
    currency,
    offer_id,
    payment_context_token,
});

field_mapping!(PaymentRecord <=> PaymentResponseData {
    id,
    status,
    created_at,
    payment_method,
    amount,
    currency,
    description,
    invoice,
    is_test,
    payment_context_token,
    payment_request_url,
    preimage,
    title,
    kind,
});

field_mapping!(LightningPayment <=> PayLightningRequest {
    invoice,
    amount,
    currency,
    description,
});
