use crate::error::ApiError;

/// Lifecycle of a cache key once it exists: `Pending` while a fetch is
/// outstanding, then `Ready` or `Errored` until the next fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Pending,
    Ready,
    Errored,
}

/// Point-in-time view of one cache key, typed for the caller.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    /// A fetch for the current generation is in flight. Can be true while
    /// `status` is `Ready` after an optimistic write.
    pub is_fetching: bool,
}

impl<T> QuerySnapshot<T> {
    pub(crate) fn pending() -> Self {
        Self {
            status: QueryStatus::Pending,
            data: None,
            error: None,
            is_fetching: false,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Ready
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Errored
    }
}
