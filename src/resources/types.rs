//! Records owned by the backend services.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString, VariantNames};

use crate::pipeline::Service;

/// Server-assigned identifier. Backends use integers or GUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    /// Numeric identity.
    Int(i64),
    /// Textual identity (GUID, slug).
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{}", id),
            ResourceId::Text(id) => f.write_str(id),
        }
    }
}

impl FromStr for ResourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i64>() {
            Ok(id) => ResourceId::Int(id),
            Err(_) => ResourceId::Text(s.to_string()),
        })
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

/// A record type served by one backend collection.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + fmt::Debug {
    /// Owning service.
    const SERVICE: Service;
    /// Collection path segment below the service base, e.g. `Components`.
    const COLLECTION: &'static str;
    /// Singular noun for messages.
    const LABEL: &'static str;

    /// Server-assigned identity, absent before creation.
    fn id(&self) -> Option<&ResourceId>;
}

/// Inventory component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Server-assigned identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price.
    #[serde(default, alias = "unitPrice", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Units in stock.
    #[serde(default, alias = "quantity")]
    pub available_stock: i64,
    /// Fields this client does not model, passed back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Component {
    const SERVICE: Service = Service::Inventory;
    const COLLECTION: &'static str = "Components";
    const LABEL: &'static str = "component";

    fn id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }
}

/// Quotation lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantNames, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum QuotationStatus {
    /// Being prepared.
    #[default]
    Draft,
    /// Sent to the customer.
    Sent,
    /// Customer accepted.
    Accepted,
    /// Customer rejected.
    Rejected,
}

/// Price quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    /// Server-assigned identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    /// Customer display name.
    pub customer_name: String,
    /// Line items, opaque to this client.
    #[serde(default)]
    pub items: Vec<Value>,
    /// Quoted total.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Lifecycle status.
    #[serde(default)]
    pub status: QuotationStatus,
    /// Fields this client does not model, passed back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Quotation {
    const SERVICE: Service = Service::Quotation;
    const COLLECTION: &'static str = "Quotations";
    const LABEL: &'static str = "quotation";

    fn id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }
}

/// Order lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantNames, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum OrderStatus {
    /// Received, not started.
    #[default]
    Pending,
    /// Being fulfilled.
    Processing,
    /// Fulfilled.
    Completed,
    /// Withdrawn.
    Cancelled,
}

/// Customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Server-assigned identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    /// Customer reference.
    pub customer_id: String,
    /// Placement timestamp, set by the order service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    /// Order total.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Lifecycle status.
    #[serde(default)]
    pub status: OrderStatus,
    /// Fields this client does not model, passed back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Order {
    const SERVICE: Service = Service::Order;
    const COLLECTION: &'static str = "Orders";
    const LABEL: &'static str = "order";

    fn id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }
}
