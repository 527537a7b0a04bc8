//! Owns the single in-flight fetch of a widget.
//!
//! Every call to [`RequestController::fetch`] mints a new [`FetchToken`]. The
//! previous request, if still running, is cancelled and its task aborted, so
//! the HTTP future is dropped and the connection closed. Completions are
//! delivered as [`WidgetEvent::FetchCompleted`] and must be checked with
//! [`RequestController::finish`] before they touch visible state; a response
//! whose token is no longer current is discarded.

use std::sync::Arc;
use std::time::Duration;

use rapid_async_utils::CancelErr;
use rapid_async_utils::OrCancelExt;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::debug;
use tracing::trace;

use crate::error::SelectError;
use crate::event::WidgetEvent;
use crate::event::WidgetEventSender;
use crate::transport::OptionsTransport;
use crate::transport::PageLoader;
use crate::types::Query;

/// Identifies one fetch. Tokens from the same controller are strictly
/// increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchToken(u64);

impl FetchToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

struct InFlightRequest {
    token: FetchToken,
    query: Query,
    cancellation_token: CancellationToken,
    _handle: AbortOnDropHandle<()>,
}

pub struct RequestController {
    transport: Arc<dyn OptionsTransport>,
    loader: PageLoader,
    timeout: Option<Duration>,
    tx: WidgetEventSender,
    generation: u64,
    current: Option<FetchToken>,
    in_flight: Option<InFlightRequest>,
}

impl RequestController {
    pub fn new(
        transport: Arc<dyn OptionsTransport>,
        loader: PageLoader,
        tx: WidgetEventSender,
    ) -> Self {
        Self {
            transport,
            loader,
            timeout: None,
            tx,
            generation: 0,
            current: None,
            in_flight: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn loader_mut(&mut self) -> &mut PageLoader {
        &mut self.loader
    }

    /// Start fetching `query`, superseding whatever was running.
    ///
    /// Asking again for the query that is already in flight keeps the running
    /// request and returns its token, so repeated look-ahead triggers do not
    /// restart the same page.
    pub fn fetch(&mut self, query: Query) -> FetchToken {
        if let Some(in_flight) = &self.in_flight
            && in_flight.query == query
        {
            trace!(key = %query.cache_key(), "fetch already in flight");
            return in_flight.token;
        }

        self.cancel();
        self.generation += 1;
        let token = FetchToken(self.generation);
        self.current = Some(token);

        let cancellation_token = CancellationToken::new();
        let handle = Self::spawn_fetch(
            token,
            query.clone(),
            Arc::clone(&self.transport),
            self.loader.clone(),
            self.timeout,
            self.tx.clone(),
            cancellation_token.child_token(),
        );
        debug!(generation = token.0, key = %query.cache_key(), "fetch started");
        self.in_flight = Some(InFlightRequest {
            token,
            query,
            cancellation_token,
            _handle: AbortOnDropHandle::new(handle),
        });
        token
    }

    fn spawn_fetch(
        token: FetchToken,
        query: Query,
        transport: Arc<dyn OptionsTransport>,
        loader: PageLoader,
        timeout: Option<Duration>,
        tx: WidgetEventSender,
        cancellation_token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let load = async {
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, loader.load(transport.as_ref(), &query))
                        .await
                        .unwrap_or_else(|_| {
                            Err(SelectError::Transport(format!(
                                "request timed out after {limit:?}"
                            )))
                        }),
                    None => loader.load(transport.as_ref(), &query).await,
                }
            };

            match load.or_cancel(&cancellation_token).await {
                Ok(result) => tx.send(WidgetEvent::FetchCompleted {
                    token,
                    query,
                    result,
                }),
                Err(CancelErr::Cancelled) => {
                    trace!(generation = token.0, "fetch cancelled");
                }
            }
        })
    }

    /// Cancel the in-flight request, if any. Its response will never be
    /// delivered, and a late one would fail [`finish`](Self::finish).
    pub fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            trace!(generation = in_flight.token.0, "cancelling in-flight fetch");
            in_flight.cancellation_token.cancel();
        }
        self.current = None;
    }

    pub fn is_current(&self, token: FetchToken) -> bool {
        self.current == Some(token)
    }

    /// Record that `token` delivered its response. Returns `false` for stale
    /// tokens, whose responses must be dropped.
    pub fn finish(&mut self, token: FetchToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        if self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.token == token)
        {
            self.in_flight = None;
        }
        true
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight_query(&self) -> Option<&Query> {
        self.in_flight.as_ref().map(|in_flight| &in_flight.query)
    }
}
