//! # Identity Resolver Service
//!
//! Runs the identity fallback chain:
//!
//! ```text
//! persisted session ──(absent/expired)──► device fingerprint ──(failure)──► Unresolved
//!        │                                    │
//!        ▼                                    ▼
//!  Authenticated(token)            local binding? ──no──► backend bind + persist
//!                                             │
//!                                             ▼
//!                                   Anonymous(fingerprint)
//! ```
//!
//! ## Serialization
//!
//! `resolve()` and `promote()` take the same async mutex for their whole
//! duration, so a resolve never observes a half-finished merge.
//!
//! ## Forward-only state
//!
//! Once this resolver has produced a resolved identity it never replaces it
//! with a lower layer. A later failure is alerted and the current state is
//! kept. An authenticated process whose session lapses does not consult the
//! device layer at all.
//!
//! ## Escalation
//!
//! Consecutive failures are counted through the `FailureLedger` port, so a
//! device that fails once per launch escalates to `HIGH` on a later launch.

use async_trait::async_trait;
use shared_bus::AlertPublisher;
use shared_types::{
    DeviceFingerprint, IdentityResolutionFailure, IdentityState, SecurityAlert, Session, Severity,
};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::domain::{derive_fingerprint, AnonymousBinding, ExpiredSessionPolicy, IdentityConfig};
use crate::error::{BackendError, PromotionError};
use crate::ports::{
    BindingStore, Clock, DeviceAttributeSource, FailureLedger, IdentityApi, IdentityBackend,
    MergeCoordinator, SessionStore,
};

/// Alert source tag for everything this service publishes.
const ALERT_SOURCE: &str = "identity-resolver";

/// Collaborators of the identity resolver.
#[derive(Clone)]
pub struct IdentityDependencies {
    pub sessions: Arc<dyn SessionStore>,
    pub bindings: Arc<dyn BindingStore>,
    pub attributes: Arc<dyn DeviceAttributeSource>,
    pub backend: Arc<dyn IdentityBackend>,
    pub merger: Arc<dyn MergeCoordinator>,
    pub failures: Arc<dyn FailureLedger>,
    pub clock: Arc<dyn Clock>,
}

struct ResolverState {
    current: IdentityState,
    consecutive_failures: u32,
}

/// Identity Resolver
///
/// Owns the identity state for the lifetime of the process.
pub struct IdentityResolver {
    deps: IdentityDependencies,
    alerts: Arc<dyn AlertPublisher>,
    config: IdentityConfig,
    state: Mutex<ResolverState>,
    updates: watch::Sender<IdentityState>,
}

impl IdentityResolver {
    pub fn new(
        deps: IdentityDependencies,
        alerts: Arc<dyn AlertPublisher>,
        config: IdentityConfig,
    ) -> Self {
        let (updates, _) = watch::channel(IdentityState::Unresolved);
        Self {
            deps,
            alerts,
            config,
            state: Mutex::new(ResolverState {
                current: IdentityState::Unresolved,
                consecutive_failures: 0,
            }),
            updates,
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    fn alert(&self, severity: Severity, message: impl Into<String>) {
        self.alerts
            .publish(SecurityAlert::new(severity, ALERT_SOURCE, message));
    }

    /// Layer 1: a persisted session.
    ///
    /// `Ok(None)` means "no usable session". `authenticated` is whether this
    /// process already runs under a session.
    fn session_layer(
        &self,
        authenticated: bool,
    ) -> Result<Option<IdentityState>, IdentityResolutionFailure> {
        let session = match self.deps.sessions.load() {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(error = %e, "[IdentityResolver] Session store unreadable, using device identity");
                return Ok(None);
            }
        };

        if !session.is_expired_at(self.deps.clock.now()) {
            return Ok(Some(IdentityState::Authenticated(session.token)));
        }

        match self.config.expired_session_policy {
            ExpiredSessionPolicy::FallBackToDevice if authenticated => Ok(None),
            ExpiredSessionPolicy::FallBackToDevice => {
                info!(
                    expired_at = %session.expires_at,
                    "[IdentityResolver] Session expired, falling back to device identity"
                );
                self.alert(
                    Severity::Low,
                    "Session expired; continuing with device identity until re-authentication",
                );
                Ok(None)
            }
            ExpiredSessionPolicy::RequireReauthentication => {
                Err(IdentityResolutionFailure::ReauthenticationRequired)
            }
        }
    }

    /// Layer 2: the device fingerprint and its backend binding.
    async fn device_layer(&self) -> Result<IdentityState, IdentityResolutionFailure> {
        let attributes = self
            .deps
            .attributes
            .attributes()
            .map_err(|e| IdentityResolutionFailure::AttributesUnavailable(e.to_string()))?;
        let fingerprint = derive_fingerprint(&attributes)
            .map_err(|e| IdentityResolutionFailure::AttributesUnavailable(e.to_string()))?;

        match self.deps.bindings.load() {
            Ok(Some(binding)) if binding.fingerprint == fingerprint => {
                debug!(
                    fingerprint = fingerprint.short(),
                    identity_id = %binding.identity_id,
                    "[IdentityResolver] Reusing persisted device binding"
                );
                return Ok(IdentityState::Anonymous(fingerprint));
            }
            Ok(Some(stale)) => {
                info!(
                    previous = stale.fingerprint.short(),
                    fingerprint = fingerprint.short(),
                    "[IdentityResolver] Persisted binding belongs to another fingerprint, rebinding"
                );
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "[IdentityResolver] Binding store unreadable, asking backend");
            }
        }

        self.bind(fingerprint).await
    }

    async fn bind(&self, fingerprint: DeviceFingerprint) -> Result<IdentityState, IdentityResolutionFailure> {
        let identity_id = self
            .deps
            .backend
            .bind_device(&fingerprint)
            .await
            .map_err(|e| match e {
                BackendError::Unreachable(msg) => IdentityResolutionFailure::BackendUnreachable(msg),
                BackendError::Rejected(msg) => IdentityResolutionFailure::BackendRejected(msg),
            })?;

        let binding = AnonymousBinding::new(fingerprint.clone(), identity_id, self.deps.clock.now());
        self.deps
            .bindings
            .save(&binding)
            .map_err(|e| IdentityResolutionFailure::Store(e.to_string()))?;

        info!(
            fingerprint = fingerprint.short(),
            identity_id = %binding.identity_id,
            "[IdentityResolver] Device bound to anonymous identity"
        );
        Ok(IdentityState::Anonymous(fingerprint))
    }

    async fn run_chain(
        &self,
        current: &IdentityState,
    ) -> Result<IdentityState, IdentityResolutionFailure> {
        let authenticated = current.is_authenticated();
        if let Some(session) = self.session_layer(authenticated)? {
            return Ok(session);
        }

        if authenticated {
            warn!("[IdentityResolver] Session lapsed while authenticated, keeping current identity");
            self.alert(
                Severity::Low,
                "Authenticated session lapsed; re-authentication required",
            );
            return Ok(current.clone());
        }

        self.device_layer().await
    }

    fn publish_state(&self, state: &IdentityState) {
        self.updates.send_replace(state.clone());
    }

    /// Failures recorded before this one, in this process or a previous launch.
    fn recorded_failures(&self, state: &ResolverState) -> u32 {
        match self.deps.failures.load() {
            Ok(persisted) => persisted.max(state.consecutive_failures),
            Err(e) => {
                warn!(error = %e, "[IdentityResolver] Failure ledger unreadable, using in-process count");
                state.consecutive_failures
            }
        }
    }

    fn record_failures(&self, state: &mut ResolverState, consecutive_failures: u32) {
        state.consecutive_failures = consecutive_failures;
        if let Err(e) = self.deps.failures.save(consecutive_failures) {
            warn!(error = %e, "[IdentityResolver] Failed to persist failure count");
        }
    }

    /// Record a failed chain run and publish the matching alert.
    fn on_failure(&self, state: &mut ResolverState, failure: &IdentityResolutionFailure) {
        let attempt = self.recorded_failures(state).saturating_add(1);
        self.record_failures(state, attempt);
        let severity = if state.consecutive_failures >= self.config.escalate_after_failures {
            Severity::High
        } else {
            Severity::Low
        };

        warn!(
            attempt = state.consecutive_failures,
            severity = %severity,
            error = %failure,
            "[IdentityResolver] Identity resolution failed"
        );
        self.alert(
            severity,
            format!(
                "Identity resolution failed (attempt {}): {}",
                state.consecutive_failures, failure
            ),
        );
    }

    /// Apply a successful chain result, honoring forward-only transitions.
    fn on_success(&self, state: &mut ResolverState, next: IdentityState) -> IdentityState {
        self.record_failures(state, 0);

        if state.current == next {
            return next;
        }

        if state.current.can_transition_to(&next) {
            info!(
                from = state.current.label(),
                to = next.label(),
                "[IdentityResolver] Identity resolved"
            );
            state.current = next;
            self.publish_state(&state.current);
            return state.current.clone();
        }

        match (&state.current, &next) {
            (IdentityState::Anonymous(previous), IdentityState::Anonymous(observed)) => {
                warn!(
                    previous = previous.short(),
                    observed = observed.short(),
                    "[IdentityResolver] Device fingerprint changed mid-process, keeping current identity"
                );
                self.alert(
                    Severity::High,
                    "Device fingerprint changed while the client was running",
                );
            }
            _ => {
                warn!(
                    from = state.current.label(),
                    to = next.label(),
                    "[IdentityResolver] Refusing backward identity transition"
                );
            }
        }
        state.current.clone()
    }
}

#[async_trait]
impl IdentityApi for IdentityResolver {
    async fn resolve(&self) -> IdentityState {
        let mut state = self.state.lock().await;

        let current = state.current.clone();
        match self.run_chain(&current).await {
            Ok(next) => self.on_success(&mut state, next),
            Err(failure) => {
                self.on_failure(&mut state, &failure);
                // Unresolved only replaces Unresolved.
                state.current.clone()
            }
        }
    }

    async fn promote(&self, session: Session) -> Result<IdentityState, PromotionError> {
        let mut state = self.state.lock().await;

        if session.is_expired_at(self.deps.clock.now()) {
            return Err(PromotionError::ExpiredSession);
        }

        if let IdentityState::Anonymous(fingerprint) = &state.current {
            info!(
                fingerprint = fingerprint.short(),
                "[IdentityResolver] Carrying anonymous identity over to account"
            );
            self.deps.merger.merge(fingerprint, &session).await?;
        }

        self.deps.sessions.save(&session)?;

        state.current = IdentityState::Authenticated(session.token);
        self.record_failures(&mut state, 0);
        self.publish_state(&state.current);
        info!("[IdentityResolver] Promoted to authenticated identity");

        Ok(state.current.clone())
    }

    fn current(&self) -> IdentityState {
        self.updates.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<IdentityState> {
        self.updates.subscribe()
    }
}
