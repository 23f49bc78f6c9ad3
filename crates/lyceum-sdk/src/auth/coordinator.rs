//! Refresh-or-wait protocol for requests rejected with 401
//!
//! The first request that sees a 401 while the coordinator is idle becomes the
//! leader: it flips the state to refreshing and starts exactly one refresh.
//! Every other request that sees a 401 while the refresh is outstanding is
//! queued as a [`PendingRequest`] and suspended on a one-shot channel. When the
//! refresh settles the queue is drained in registration order: replayed with
//! the new token on success, rejected with [`ApiError::AuthExpired`] on failure.
//!
//! The refresh and the replays run on a spawned task, so a caller that gives
//! up waiting cannot leave the coordinator stuck in the refreshing state.
//! A logout (or a new login) while the refresh is outstanding discards its
//! result: the queue is rejected and the store keeps what the user last did.

use super::credential_store::CredentialStore;
use super::events::{SessionEvent, SessionEvents};
use super::refresh::RefreshTransport;
use super::types::AuthError;
use crate::error::{ApiError, ErrorResponse, Result};
use crate::transport::{attach_credential, ApiRequest, ApiResponse, Transport};
use futures::future::{join_all, FutureExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// A request waiting for the outcome of the in-flight refresh
struct PendingRequest {
    request: ApiRequest,
    responder: oneshot::Sender<Result<ApiResponse>>,
}

struct CoordinatorState {
    phase: RefreshState,
    pending: VecDeque<PendingRequest>,
}

struct Inner {
    state: Mutex<CoordinatorState>,
    store: Arc<CredentialStore>,
    refresher: Arc<dyn RefreshTransport>,
    transport: Arc<dyn Transport>,
    events: Arc<SessionEvents>,
    refresh_path: String,
}

/// Decision taken under the lock after a 401
enum Recovery {
    Wait(oneshot::Receiver<Result<ApiResponse>>),
    /// Someone already installed a newer token, replay right away
    ReplayNow(ApiRequest),
    /// The session was cleared while the request was in flight
    SessionVoid,
}

#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("RefreshCoordinator")
            .field("state", &state.phase)
            .field("pending", &state.pending.len())
            .field("refresh_path", &self.inner.refresh_path)
            .finish()
    }
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<CredentialStore>,
        transport: Arc<dyn Transport>,
        refresher: Arc<dyn RefreshTransport>,
        events: Arc<SessionEvents>,
        refresh_path: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CoordinatorState {
                    phase: RefreshState::Idle,
                    pending: VecDeque::new(),
                }),
                store,
                refresher,
                transport,
                events,
                refresh_path: refresh_path.into(),
            }),
        }
    }

    pub fn state(&self) -> RefreshState {
        self.inner.state.lock().phase
    }

    /// Number of requests waiting on the in-flight refresh
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Send `request` with the current token, recovering once from a 401
    ///
    /// Non-401 responses, transport errors and 401s from the refresh endpoint
    /// itself are returned untouched.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let token = self.inner.store.get();
        let outgoing = attach_credential(&request, token.as_deref())?;
        let response = self.inner.transport.send(outgoing).await?;

        if !response.is_unauthorized() || self.inner.is_refresh_call(&request) {
            return Ok(response);
        }

        debug!(method = %request.method, path = %request.path, "Access token rejected");
        self.recover(request, token).await
    }

    async fn recover(&self, request: ApiRequest, sent_token: Option<String>) -> Result<ApiResponse> {
        let decision = {
            let mut state = self.inner.state.lock();
            match state.phase {
                RefreshState::Refreshing => {
                    let (responder, receiver) = oneshot::channel();
                    state.pending.push_back(PendingRequest { request, responder });
                    info!(queued = state.pending.len(), "Refresh in flight, queueing request");
                    Recovery::Wait(receiver)
                }
                RefreshState::Idle => {
                    let current = self.inner.store.get();
                    match (current, sent_token) {
                        (Some(current), sent) if sent.as_deref() != Some(current.as_str()) => {
                            // a refresh completed after this request went out
                            Recovery::ReplayNow(request)
                        }
                        (None, Some(_)) => Recovery::SessionVoid,
                        _ => {
                            let (responder, receiver) = oneshot::channel();
                            state.phase = RefreshState::Refreshing;
                            state.pending.push_back(PendingRequest { request, responder });
                            tokio::spawn(Arc::clone(&self.inner).settle());
                            Recovery::Wait(receiver)
                        }
                    }
                }
            }
        };

        match decision {
            Recovery::Wait(receiver) => receiver.await.unwrap_or_else(|_| {
                Err(ApiError::AuthExpired {
                    message: "token refresh was abandoned before completing".into(),
                })
            }),
            Recovery::ReplayNow(request) => self.inner.replay(&request).await,
            Recovery::SessionVoid => Err(ApiError::AuthExpired {
                message: "session was cleared while the request was in flight".into(),
            }),
        }
    }
}

impl Inner {
    fn is_refresh_call(&self, request: &ApiRequest) -> bool {
        request.path.contains(self.refresh_path.as_str())
    }

    /// Run the single refresh and drain the queue with its outcome
    async fn settle(self: Arc<Self>) {
        info!("Refreshing access token");
        // a logout or a new login while the refresh is out invalidates its result
        let generation = self.store.generation();
        let refresh_token = self.store.refresh_token();

        let outcome = AssertUnwindSafe(self.refresher.refresh(refresh_token.as_deref()))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(AuthError::InvalidResponse(
                    "refresh transport panicked".into(),
                ))
            })
            .and_then(|tokens| match tokens.access_token {
                Some(access_token) if !access_token.is_empty() => {
                    Ok((access_token, tokens.refresh_token))
                }
                _ => Err(AuthError::MissingAccessToken),
            });

        match outcome {
            Ok((access_token, refresh_token)) => {
                // the new token must be visible before new arrivals see Idle
                match self
                    .store
                    .update_access_token_at(generation, access_token, refresh_token)
                {
                    Ok(true) => {}
                    Ok(false) => {
                        self.abandon("session ended while the token was being refreshed");
                        return;
                    }
                    Err(e) => warn!("Refreshed token could not be persisted: {}", e),
                }
                let pending = self.finish();
                info!(replaying = pending.len(), "Token refresh succeeded");
                self.events.emit(SessionEvent::Refreshed);

                let replays = pending.into_iter().map(|entry| {
                    let inner = Arc::clone(&self);
                    async move {
                        let result = inner.replay(&entry.request).await;
                        // caller may have stopped waiting
                        let _ = entry.responder.send(result);
                    }
                });
                // polled in order, so replays are initiated in FIFO order
                join_all(replays).await;
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Token refresh failed: {}", reason);
                match self.store.clear_at(generation) {
                    Ok(true) => {}
                    Ok(false) => {
                        self.abandon(&reason);
                        return;
                    }
                    Err(err) => warn!("Failed to clear persisted session: {}", err),
                }
                let pending = self.finish();
                // listeners learn about it before any caller resumes
                self.events.emit(SessionEvent::Expired {
                    reason: reason.clone(),
                });
                info!(rejected = pending.len(), "Rejecting queued requests");
                for entry in pending {
                    let _ = entry.responder.send(Err(ApiError::AuthExpired {
                        message: reason.clone(),
                    }));
                }
            }
        }
    }

    /// Reject the queue without touching the store
    ///
    /// Used when the session the refresh was started for no longer exists;
    /// whatever the store holds now belongs to a later login or logout.
    fn abandon(&self, reason: &str) {
        let pending = self.finish();
        info!(rejected = pending.len(), "Discarding refresh result: {}", reason);
        for entry in pending {
            let _ = entry.responder.send(Err(ApiError::AuthExpired {
                message: reason.to_string(),
            }));
        }
    }

    /// Back to idle, handing over everything that queued up meanwhile
    fn finish(&self) -> VecDeque<PendingRequest> {
        let mut state = self.state.lock();
        state.phase = RefreshState::Idle;
        std::mem::take(&mut state.pending)
    }

    /// Re-issue a request once with the current token; a second 401 is final
    async fn replay(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let token = self.store.get();
        let outgoing = attach_credential(request, token.as_deref())?;
        let response = self.transport.send(outgoing).await?;

        if response.is_unauthorized() {
            warn!(method = %request.method, path = %request.path, "Request rejected again after refresh");
            return Err(ApiError::RetryExhausted {
                message: ErrorResponse::message_from(response.status, &response.text()),
            });
        }
        Ok(response)
    }
}
