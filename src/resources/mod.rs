//! Backend records and their CRUD clients.

pub mod client;
pub mod types;

pub use client::ResourceClient;
pub use types::{
    Component, Order, OrderStatus, Quotation, QuotationStatus, Resource, ResourceId,
};

use crate::config::Config;
use crate::error::AdminError;
use crate::pipeline::{ApiClient, Service, ServiceEndpoint};

/// One client per backend collection, sharing a single pipeline.
#[derive(Debug, Clone)]
pub struct Backends {
    /// Inventory components.
    pub components: ResourceClient<Component>,
    /// Price quotations.
    pub quotations: ResourceClient<Quotation>,
    /// Customer orders.
    pub orders: ResourceClient<Order>,
}

impl Backends {
    /// Build every client from config.
    pub fn new(config: &Config, api: ApiClient) -> Result<Self, AdminError> {
        Ok(Self {
            components: ResourceClient::new(
                api.clone(),
                ServiceEndpoint::parse(Service::Inventory, &config.inventory_service_url)?,
            )?,
            quotations: ResourceClient::new(
                api.clone(),
                ServiceEndpoint::parse(Service::Quotation, &config.quotation_service_url)?,
            )?,
            orders: ResourceClient::new(
                api,
                ServiceEndpoint::parse(Service::Order, &config.order_service_url)?,
            )?,
        })
    }
}
