//! Typed CRUD client for one backend collection.

use std::marker::PhantomData;

use reqwest::StatusCode;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{AdminError, ApiResult};
use crate::pipeline::{ApiClient, ServiceEndpoint};

use super::types::{Resource, ResourceId};

/// Statuses a create call accepts.
const CREATE_ACCEPTED: [StatusCode; 2] = [StatusCode::CREATED, StatusCode::OK];
/// Statuses replace and delete calls accept.
const MUTATE_ACCEPTED: [StatusCode; 2] = [StatusCode::NO_CONTENT, StatusCode::OK];

/// CRUD operations on the collection of `R`.
#[derive(Debug, Clone)]
pub struct ResourceClient<R: Resource> {
    api: ApiClient,
    endpoint: ServiceEndpoint,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourceClient<R> {
    /// Create a client for `R` at `endpoint`.
    pub fn new(api: ApiClient, endpoint: ServiceEndpoint) -> Result<Self, AdminError> {
        if endpoint.service() != R::SERVICE {
            return Err(AdminError::InvalidConfig(format!(
                "{} records live on the {} service, not {}",
                R::LABEL,
                R::SERVICE,
                endpoint.service()
            )));
        }
        Ok(Self {
            api,
            endpoint,
            _marker: PhantomData,
        })
    }

    /// Get the endpoint this client talks to.
    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    fn collection_url(&self) -> ApiResult<Url> {
        self.endpoint.url(&[R::COLLECTION])
    }

    fn record_url(&self, id: &ResourceId) -> ApiResult<Url> {
        self.endpoint.url(&[R::COLLECTION, &id.to_string()])
    }

    /// Fetch every record.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn list(&self) -> ApiResult<Vec<R>> {
        let url = self.collection_url()?;
        let records: Vec<R> = self.api.get(R::SERVICE, url).await?.json()?;
        debug!(count = records.len(), "Fetched records");
        Ok(records)
    }

    /// Fetch one record. A missing record is `ApiError::NotFound`.
    #[instrument(skip(self), fields(collection = R::COLLECTION, id = %id))]
    pub async fn get(&self, id: &ResourceId) -> ApiResult<R> {
        let url = self.record_url(id)?;
        self.api.get(R::SERVICE, url).await?.json()
    }

    /// Create a record. Returns the server's copy when the response has a
    /// body.
    #[instrument(skip(self, record), fields(collection = R::COLLECTION))]
    pub async fn create(&self, record: &R) -> ApiResult<Option<R>> {
        let url = self.collection_url()?;
        let response = self
            .api
            .post(R::SERVICE, url, record)
            .await?
            .expect_status(&CREATE_ACCEPTED)?;
        let created: Option<R> = response.json_opt()?;
        info!(
            id = ?created.as_ref().and_then(|r| r.id()),
            "Created {}",
            R::LABEL
        );
        Ok(created)
    }

    /// Replace a record.
    #[instrument(skip(self, record), fields(collection = R::COLLECTION, id = %id))]
    pub async fn replace(&self, id: &ResourceId, record: &R) -> ApiResult<()> {
        let url = self.record_url(id)?;
        self.api
            .put(R::SERVICE, url, record)
            .await?
            .expect_status(&MUTATE_ACCEPTED)?;
        info!("Updated {}", R::LABEL);
        Ok(())
    }

    /// Delete a record.
    #[instrument(skip(self), fields(collection = R::COLLECTION, id = %id))]
    pub async fn delete(&self, id: &ResourceId) -> ApiResult<()> {
        let url = self.record_url(id)?;
        self.api
            .delete(R::SERVICE, url)
            .await?
            .expect_status(&MUTATE_ACCEPTED)?;
        info!("Deleted {}", R::LABEL);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnauthorizedPolicy;
    use crate::pipeline::Service;
    use crate::resources::types::{Component, Order};
    use crate::session::Session;

    fn api() -> ApiClient {
        ApiClient::with_http(
            reqwest::Client::new(),
            Session::in_memory(),
            UnauthorizedPolicy::ClearCredential,
        )
    }

    #[test]
    fn urls_land_under_collection() {
        let endpoint = ServiceEndpoint::parse(Service::Inventory, "https://localhost:7250/api").unwrap();
        let client = ResourceClient::<Component>::new(api(), endpoint).unwrap();

        assert_eq!(
            client.collection_url().unwrap().as_str(),
            "https://localhost:7250/api/Components"
        );
        assert_eq!(
            client.record_url(&ResourceId::Int(5)).unwrap().as_str(),
            "https://localhost:7250/api/Components/5"
        );
    }

    #[test]
    fn endpoint_must_match_service() {
        let endpoint = ServiceEndpoint::parse(Service::Inventory, "https://localhost:7250/api").unwrap();
        assert!(ResourceClient::<Order>::new(api(), endpoint).is_err());
    }
}
