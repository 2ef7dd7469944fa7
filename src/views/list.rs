//! Collection screens with delete.

use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::resources::{Resource, ResourceClient, ResourceId};

use super::notice::Notice;

/// Load state shared by list and edit screens.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    /// Request in flight.
    Loading,
    /// Data available.
    Loaded(T),
    /// Request failed; the view shows the classified error.
    Failed(ApiError),
}

/// A list screen for one record type.
#[derive(Debug, Clone)]
pub struct ListView<R: Resource> {
    state: LoadState<Vec<R>>,
    notice: Option<Notice>,
}

impl<R: Resource> Default for ListView<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ListView<R> {
    /// Create a view in the loading state.
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            notice: None,
        }
    }

    /// Fetch the collection and apply the result.
    pub async fn load(client: &ResourceClient<R>) -> Self {
        let mut view = Self::new();
        view.apply_fetch(client.list().await);
        view
    }

    /// Apply a fetch result. A successful fetch clears any notice.
    pub fn apply_fetch(&mut self, result: ApiResult<Vec<R>>) {
        match result {
            Ok(records) => {
                self.state = LoadState::Loaded(records);
                self.notice = None;
            }
            Err(err) => self.state = LoadState::Failed(err),
        }
    }

    /// Get the load state.
    pub fn state(&self) -> &LoadState<Vec<R>> {
        &self.state
    }

    /// Get the loaded records.
    pub fn records(&self) -> Option<&[R]> {
        match &self.state {
            LoadState::Loaded(records) => Some(records),
            _ => None,
        }
    }

    /// Get the current notice.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Drop a record from the local copy. Returns whether it was present.
    pub fn remove(&mut self, id: &ResourceId) -> bool {
        let LoadState::Loaded(records) = &mut self.state else {
            return false;
        };
        let before = records.len();
        records.retain(|record| record.id() != Some(id));
        before != records.len()
    }

    /// Apply the result of deleting `id`.
    ///
    /// On success the record is removed locally without refetching the
    /// collection.
    pub fn apply_delete(&mut self, id: &ResourceId, result: ApiResult<()>) {
        match result {
            Ok(()) => {
                let removed = self.remove(id);
                debug!(%id, removed, "Applied delete to list");
                self.notice = Some(Notice::success(format!(
                    "{} deleted successfully!",
                    capitalize(R::LABEL)
                )));
            }
            Err(err) => {
                self.notice = Some(Notice::from_api_error("deleting", R::LABEL, &err));
            }
        }
    }

    /// Delete a record through `client` and apply the result.
    pub async fn delete(&mut self, client: &ResourceClient<R>, id: &ResourceId) {
        let result = client.delete(id).await;
        self.apply_delete(id, result);
    }
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
