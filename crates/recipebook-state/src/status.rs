use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use recipebook_access::{AccessError, AccessResult};
use recipebook_types::Timestamp;

use crate::error::{StateError, StateResult};

/// Identifies one state-store request for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The state-store operation a request is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    FetchAll,
    Add,
    Update,
    Remove,
    FetchFavorites,
    AddFavorite,
    RemoveFavorite,
}

impl Operation {
    /// Human-readable prefix for failure messages.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::FetchAll => "failed to load recipes",
            Self::Add => "failed to add recipe",
            Self::Update => "failed to update recipe",
            Self::Remove => "failed to delete recipe",
            Self::FetchFavorites => "failed to load favorites",
            Self::AddFavorite => "failed to add favorite",
            Self::RemoveFavorite => "failed to remove favorite",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RequestStatus {
    Loading,
    Succeeded,
    Failed { message: String },
    /// The caller dropped the request before it settled.
    Cancelled,
}

impl RequestStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: RequestId,
    pub operation: Operation,
    pub status: RequestStatus,
    pub started_at: Timestamp,
    pub settled_at: Option<Timestamp>,
}

/// Settled records kept by [`RequestTracker::new`].
pub const DEFAULT_SETTLED_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct TrackerInner {
    next_id: u64,
    requests: BTreeMap<RequestId, RequestRecord>,
    /// Settled ids in settlement order; the back is `last_settled`.
    settled: VecDeque<RequestId>,
    loading: usize,
    last_settled: Option<RequestId>,
}

/// Maps each request to its status.
///
/// `is_loading` and `last_error` derive the old single-slot view from the
/// map for callers that only want one indicator. In-flight requests are
/// always kept; settled ones beyond the capacity are forgotten oldest
/// first.
#[derive(Debug)]
pub struct RequestTracker {
    inner: Mutex<TrackerInner>,
    settled_capacity: usize,
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SETTLED_CAPACITY)
    }
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `settled_capacity` settled records (at least one).
    pub fn with_capacity(settled_capacity: usize) -> Self {
        Self {
            inner: Mutex::default(),
            settled_capacity: settled_capacity.max(1),
        }
    }

    /// Register a new in-flight request.
    ///
    /// The returned guard settles the request when consumed; dropping it
    /// unsettled marks the request [`RequestStatus::Cancelled`].
    pub fn begin(&self, operation: Operation) -> RequestGuard<'_> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = RequestId(inner.next_id);
        inner.requests.insert(
            id,
            RequestRecord {
                id,
                operation,
                status: RequestStatus::Loading,
                started_at: Utc::now(),
                settled_at: None,
            },
        );
        inner.loading += 1;
        debug!(request = %id, ?operation, "request started");
        RequestGuard {
            tracker: self,
            id,
            operation,
            settled: false,
        }
    }

    /// `true` while any request is in flight.
    pub fn is_loading(&self) -> bool {
        self.lock().loading > 0
    }

    /// Number of records currently held, in flight or settled.
    pub fn len(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Failure message of the most recently settled request, if it failed.
    pub fn last_error(&self) -> Option<String> {
        let inner = self.lock();
        let id = inner.last_settled?;
        match &inner.requests.get(&id)?.status {
            RequestStatus::Failed { message } => Some(message.clone()),
            _ => None,
        }
    }

    pub fn status(&self, id: RequestId) -> Option<RequestStatus> {
        self.lock().requests.get(&id).map(|r| r.status.clone())
    }

    /// All tracked requests, oldest first.
    pub fn snapshot(&self) -> Vec<RequestRecord> {
        self.lock().requests.values().cloned().collect()
    }

    /// Forget every settled request. In-flight requests are kept, and so is
    /// the last settled one so `last_error` stays meaningful.
    pub fn clear_settled(&self) {
        let mut inner = self.lock();
        let keep = inner.last_settled;
        inner
            .requests
            .retain(|id, r| !r.status.is_settled() || Some(*id) == keep);
        inner.settled.retain(|id| Some(*id) == keep);
    }

    fn settle(&self, id: RequestId, status: RequestStatus) {
        let mut inner = self.lock();
        let Some(record) = inner.requests.get_mut(&id) else {
            return;
        };
        if record.status.is_settled() {
            return;
        }
        debug!(request = %id, ?status, "request settled");
        record.status = status;
        record.settled_at = Some(Utc::now());
        inner.loading = inner.loading.saturating_sub(1);
        inner.last_settled = Some(id);
        inner.settled.push_back(id);
        while inner.settled.len() > self.settled_capacity {
            if let Some(oldest) = inner.settled.pop_front() {
                inner.requests.remove(&oldest);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An in-flight request. Settle it with [`RequestGuard::settle`].
#[must_use = "dropping a request guard cancels the request"]
#[derive(Debug)]
pub struct RequestGuard<'a> {
    tracker: &'a RequestTracker,
    id: RequestId,
    operation: Operation,
    settled: bool,
}

impl RequestGuard<'_> {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Record the outcome of `result` and hand it back, tagging a failure
    /// with this request's id.
    pub fn settle<T>(mut self, result: AccessResult<T>) -> StateResult<T> {
        self.settled = true;
        match result {
            Ok(value) => {
                self.tracker.settle(self.id, RequestStatus::Succeeded);
                Ok(value)
            }
            Err(source) => {
                let message = failure_message(self.operation, &source);
                self.tracker.settle(self.id, RequestStatus::Failed { message });
                Err(StateError {
                    request: self.id,
                    source,
                })
            }
        }
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.settle(self.id, RequestStatus::Cancelled);
        }
    }
}

fn failure_message(operation: Operation, error: &AccessError) -> String {
    format!("{}: {error}", operation.failure_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_assigns_increasing_ids() {
        let tracker = RequestTracker::new();
        let a = tracker.begin(Operation::FetchAll);
        let b = tracker.begin(Operation::Add);
        assert!(b.id() > a.id());
        assert!(tracker.is_loading());
        let _ = a.settle(Ok(()));
        assert!(tracker.is_loading());
        let _ = b.settle(Ok(()));
        assert!(!tracker.is_loading());
    }

    #[test]
    fn failure_is_recorded_and_returned() {
        let tracker = RequestTracker::new();
        let guard = tracker.begin(Operation::Remove);
        let id = guard.id();
        let err = guard
            .settle::<()>(Err(AccessError::RecipeNotFound("r1".into())))
            .unwrap_err();
        assert_eq!(err.request, id);
        assert!(err.is_not_found());
        assert_eq!(
            tracker.last_error().as_deref(),
            Some("failed to delete recipe: recipe not found: r1")
        );
        assert!(matches!(tracker.status(id), Some(RequestStatus::Failed { .. })));
    }

    #[test]
    fn last_error_follows_latest_settlement() {
        let tracker = RequestTracker::new();
        let failing = tracker.begin(Operation::FetchAll);
        let ok = tracker.begin(Operation::Add);
        let _ = failing.settle::<()>(Err(AccessError::RecipeNotFound("x".into())));
        assert!(tracker.last_error().is_some());
        let _ = ok.settle(Ok(()));
        assert!(tracker.last_error().is_none());
    }

    #[test]
    fn dropped_guard_is_cancelled() {
        let tracker = RequestTracker::new();
        let id = {
            let guard = tracker.begin(Operation::Update);
            guard.id()
        };
        assert_eq!(tracker.status(id), Some(RequestStatus::Cancelled));
        assert!(!tracker.is_loading());
    }

    #[test]
    fn clear_settled_keeps_in_flight_and_latest() {
        let tracker = RequestTracker::new();
        let _ = tracker.begin(Operation::Add).settle(Ok(()));
        let last = tracker.begin(Operation::Add);
        let last_id = last.id();
        let _ = last.settle(Ok(()));
        let pending = tracker.begin(Operation::FetchAll);

        tracker.clear_settled();
        let ids: Vec<RequestId> = tracker.snapshot().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![last_id, pending.id()]);
        let _ = pending.settle(Ok(()));
    }

    #[test]
    fn settled_records_are_bounded() {
        let tracker = RequestTracker::with_capacity(8);
        let pending = tracker.begin(Operation::FetchAll);
        for _ in 0..10_000 {
            let _ = tracker.begin(Operation::Add).settle(Ok(()));
        }
        assert_eq!(tracker.len(), 9);
        assert!(tracker.is_loading());
        assert_eq!(tracker.status(pending.id()), Some(RequestStatus::Loading));

        let failing = tracker.begin(Operation::Remove);
        let _ = failing.settle::<()>(Err(AccessError::RecipeNotFound("r1".into())));
        assert!(tracker.last_error().is_some());

        let _ = pending.settle(Ok(()));
        assert!(!tracker.is_loading());
        assert_eq!(tracker.len(), 8);
        let ids: Vec<u64> = tracker.snapshot().iter().map(|r| r.id.as_u64()).collect();
        assert_eq!(ids.last(), Some(&10_002));
    }

    #[test]
    fn records_serialize_for_status_pages() {
        let tracker = RequestTracker::new();
        let _ = tracker.begin(Operation::FetchAll).settle(Ok(()));
        let json = serde_json::to_value(tracker.snapshot()).unwrap();
        assert_eq!(json[0]["operation"], "fetchAll");
        assert_eq!(json[0]["status"]["state"], "succeeded");
        assert_eq!(json[0]["id"], 1);
    }
}
