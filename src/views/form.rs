//! Create and edit forms.
//!
//! Forms hold raw text as typed by the operator. `build` validates it and
//! produces the record to send; when editing, the fetched record is passed as
//! `base` so its identity and unmodelled fields are carried over.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Map;

use crate::error::ValidationError;
use crate::resources::{
    Component, Order, OrderStatus, Quotation, QuotationStatus, Resource, ResourceClient, ResourceId,
};

use super::list::capitalize;
use super::notice::Notice;

/// A form that edits one record type.
pub trait RecordForm {
    /// Record produced by the form.
    type Record: Resource;

    /// Prefill from an existing record.
    fn from_record(record: &Self::Record) -> Self;

    /// Validate and build the record.
    fn build(&self, base: Option<&Self::Record>) -> Result<Self::Record, ValidationError>;
}

/// Inventory component form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentForm {
    /// Name (required).
    pub name: String,
    /// Description (optional).
    pub description: String,
    /// Unit price.
    pub price: String,
    /// Units in stock.
    pub available_stock: String,
}

impl RecordForm for ComponentForm {
    type Record = Component;

    fn from_record(record: &Component) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            price: record.price.to_string(),
            available_stock: record.available_stock.to_string(),
        }
    }

    fn build(&self, base: Option<&Component>) -> Result<Component, ValidationError> {
        let name = required("name", &self.name)?;
        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Component {
            id: base.and_then(|b| b.id.clone()),
            name,
            description,
            price: parse_amount("price", &self.price)?,
            available_stock: parse_count("availableStock", &self.available_stock)?,
            extra: base.map(|b| b.extra.clone()).unwrap_or_default(),
        })
    }
}

/// Quotation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotationForm {
    /// Customer name (required).
    pub customer_name: String,
    /// Quoted total.
    pub total_amount: String,
    /// Status; blank means Draft.
    pub status: String,
}

impl RecordForm for QuotationForm {
    type Record = Quotation;

    fn from_record(record: &Quotation) -> Self {
        Self {
            customer_name: record.customer_name.clone(),
            total_amount: record.total_amount.to_string(),
            status: record.status.to_string(),
        }
    }

    fn build(&self, base: Option<&Quotation>) -> Result<Quotation, ValidationError> {
        Ok(Quotation {
            id: base.and_then(|b| b.id.clone()),
            customer_name: required("customerName", &self.customer_name)?,
            items: base.map(|b| b.items.clone()).unwrap_or_default(),
            total_amount: parse_amount("totalAmount", &self.total_amount)?,
            status: parse_choice::<QuotationStatus>("status", &self.status)?,
            extra: base.map(|b| b.extra.clone()).unwrap_or_else(Map::new),
        })
    }
}

/// Order form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    /// Customer reference (required).
    pub customer_id: String,
    /// Order total.
    pub total_amount: String,
    /// Status; blank means Pending.
    pub status: String,
}

impl RecordForm for OrderForm {
    type Record = Order;

    fn from_record(record: &Order) -> Self {
        Self {
            customer_id: record.customer_id.clone(),
            total_amount: record.total_amount.to_string(),
            status: record.status.to_string(),
        }
    }

    fn build(&self, base: Option<&Order>) -> Result<Order, ValidationError> {
        Ok(Order {
            id: base.and_then(|b| b.id.clone()),
            customer_id: required("customerId", &self.customer_id)?,
            order_date: base.and_then(|b| b.order_date.clone()),
            total_amount: parse_amount("totalAmount", &self.total_amount)?,
            status: parse_choice::<OrderStatus>("status", &self.status)?,
            extra: base.map(|b| b.extra.clone()).unwrap_or_default(),
        })
    }
}

/// Validate `form` and create the record.
pub async fn submit_create<F: RecordForm>(client: &ResourceClient<F::Record>, form: &F) -> Notice {
    let label = <F::Record as Resource>::LABEL;
    let record = match form.build(None) {
        Ok(record) => record,
        Err(invalid) => return Notice::error(format!("Invalid {}: {}", label, invalid)),
    };

    match client.create(&record).await {
        Ok(_) => Notice::success(format!("{} added successfully!", capitalize(label))),
        Err(err) => Notice::from_api_error("adding", label, &err),
    }
}

/// Validate `form` against the fetched `base` and replace record `id`.
pub async fn submit_update<F: RecordForm>(
    client: &ResourceClient<F::Record>,
    id: &ResourceId,
    base: &F::Record,
    form: &F,
) -> Notice {
    let label = <F::Record as Resource>::LABEL;
    let record = match form.build(Some(base)) {
        Ok(record) => record,
        Err(invalid) => return Notice::error(format!("Invalid {}: {}", label, invalid)),
    };

    match client.replace(id, &record).await {
        Ok(()) => Notice::success(format!("{} updated successfully!", capitalize(label))),
        Err(err) => Notice::from_api_error("updating", label, &err),
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

fn parse_amount(field: &'static str, value: &str) -> Result<Decimal, ValidationError> {
    let trimmed = value.trim().trim_start_matches('$');
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    let amount = Decimal::from_str(trimmed).map_err(|_| ValidationError::NotANumber {
        field,
        value: value.to_string(),
    })?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::Negative { field });
    }
    Ok(amount)
}

fn parse_count(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    let count: i64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: value.to_string(),
    })?;
    if count < 0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(count)
}

fn parse_choice<T: FromStr + Default>(field: &'static str, value: &str) -> Result<T, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    T::from_str(trimmed).map_err(|_| ValidationError::InvalidChoice {
        field,
        value: value.to_string(),
    })
}
