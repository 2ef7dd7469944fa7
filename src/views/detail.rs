//! Single-record screens.

use crate::error::{ApiError, ApiResult};
use crate::resources::{Resource, ResourceClient, ResourceId};

/// What a detail screen shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState<R> {
    /// Request in flight.
    Loading,
    /// Record available.
    Loaded(R),
    /// The service answered 404.
    NotFound,
    /// Any other classified failure.
    Failed(ApiError),
}

/// A detail screen for one record.
#[derive(Debug, Clone)]
pub struct DetailView<R: Resource> {
    id: ResourceId,
    state: DetailState<R>,
}

impl<R: Resource> DetailView<R> {
    /// Create a view for `id` in the loading state.
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            state: DetailState::Loading,
        }
    }

    /// Fetch the record and apply the result.
    pub async fn load(client: &ResourceClient<R>, id: ResourceId) -> Self {
        let result = client.get(&id).await;
        let mut view = Self::new(id);
        view.apply_fetch(result);
        view
    }

    /// Apply a fetch result.
    pub fn apply_fetch(&mut self, result: ApiResult<R>) {
        self.state = match result {
            Ok(record) => DetailState::Loaded(record),
            Err(ApiError::NotFound { .. }) => DetailState::NotFound,
            Err(err) => DetailState::Failed(err),
        };
    }

    /// Get the requested identifier.
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Get the view state.
    pub fn state(&self) -> &DetailState<R> {
        &self.state
    }

    /// Get the record if loaded.
    pub fn record(&self) -> Option<&R> {
        match &self.state {
            DetailState::Loaded(record) => Some(record),
            _ => None,
        }
    }

    /// Take the record out of the view.
    pub fn into_record(self) -> Option<R> {
        match self.state {
            DetailState::Loaded(record) => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Quotation;
    use reqwest::StatusCode;

    #[test]
    fn not_found_is_its_own_state() {
        let mut view = DetailView::<Quotation>::new(ResourceId::Int(9));
        view.apply_fetch(Err(ApiError::NotFound {
            message: "Not Found".to_string(),
        }));
        assert_eq!(view.state(), &DetailState::NotFound);
    }

    #[test]
    fn other_failures_are_kept() {
        let mut view = DetailView::<Quotation>::new(ResourceId::Int(9));
        let err = ApiError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_string(),
        };
        view.apply_fetch(Err(err.clone()));
        assert_eq!(view.state(), &DetailState::Failed(err));
        assert!(view.record().is_none());
    }
}
