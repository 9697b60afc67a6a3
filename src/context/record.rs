//! The per-service-type context record.
//!
//! # Responsibilities
//! - Hold the connection state and the reason it was last changed
//! - Hold the ordered candidate queue and the permanent failure budget
//! - Gate readiness on user request AND dependency satisfaction
//! - Store non-owning handles (active connection, scheduled retry)
//!
//! # Design Decisions
//! - Passive record: setters are total and never reject input
//! - No internal locking; the owner provides exclusion (see `registry`)
//! - Every setter emits a `tracing` event carrying the log tag

use serde::{Deserialize, Serialize};
use crate::context::{
    candidate::{CandidateConfig, CandidateQueue},
    handle::{ConnectionId, RetryToken, ServiceType},
    pending::PendingAction,
    policy::ContractPolicy,
    reason,
    state::ConnectionState,
};

/// Bookkeeping for one logical data connection.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    service_type: ServiceType,
    log_tag: String,
    state: ConnectionState,
    pending_action: PendingAction,
    candidates: CandidateQueue,
    /// Zero means every candidate in the last queue failed permanently.
    failure_budget: usize,
    active_candidate: Option<CandidateConfig>,
    active_connection: Option<ConnectionId>,
    reason: String,
    scheduled_retry: Option<RetryToken>,
    /// User or application asked for this service type.
    enabled: bool,
    /// Externally computed prerequisites hold.
    dependency_met: bool,
    policy: ContractPolicy,
}

impl ConnectionContext {
    /// Create an idle context for `service_type`.
    pub fn new(service_type: impl Into<ServiceType>, log_tag: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            log_tag: log_tag.into(),
            state: ConnectionState::Idle,
            pending_action: PendingAction::None,
            candidates: CandidateQueue::new(),
            failure_budget: 0,
            active_candidate: None,
            active_connection: None,
            reason: reason::DEFAULT.to_string(),
            scheduled_retry: None,
            enabled: false,
            dependency_met: true,
            policy: ContractPolicy::default(),
        }
    }

    /// Override how contract violations are reported.
    pub fn with_policy(mut self, policy: ContractPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn service_type(&self) -> &ServiceType {
        &self.service_type
    }

    pub fn log_tag(&self) -> &str {
        &self.log_tag
    }

    pub fn policy(&self) -> ContractPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ContractPolicy) {
        self.policy = policy;
    }

    // --- State ---

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Overwrite the connection state. Entering `Failed` drops every
    /// remaining candidate so the next enable cycle starts from scratch.
    pub fn set_state(&mut self, next: ConnectionState) {
        let previous = self.state;
        tracing::debug!(
            log_tag = %self.log_tag,
            service_type = %self.service_type,
            previous = %previous,
            next = %next,
            "setState"
        );

        if !previous.can_transition_to(next) {
            self.contract_violation(&format!(
                "illegal transition {} -> {} for type {}",
                previous, next, self.service_type
            ));
        }

        self.state = next;

        if next == ConnectionState::Failed {
            self.candidates.clear();
        }
    }

    // --- Reason ---

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::debug!(
            log_tag = %self.log_tag,
            service_type = %self.service_type,
            state = %self.state,
            reason = %reason,
            "set reason"
        );
        self.reason = reason;
    }

    // --- Candidates ---

    /// Replace the queue and reset the failure budget to its length.
    pub fn set_candidates(&mut self, list: Vec<CandidateConfig>) {
        self.candidates = CandidateQueue::from(list);
        self.failure_budget = self.candidates.len();
        tracing::debug!(
            log_tag = %self.log_tag,
            service_type = %self.service_type,
            count = self.failure_budget,
            "set candidates"
        );
    }

    /// Remaining candidates in trial order.
    pub fn candidates(&self) -> &CandidateQueue {
        &self.candidates
    }

    pub fn peek_next_candidate(&self) -> Option<&CandidateConfig> {
        self.candidates.peek()
    }

    /// Drop the front candidate. Empty queue is a no-op.
    pub fn dequeue_candidate(&mut self) -> Option<CandidateConfig> {
        self.candidates.pop()
    }

    pub fn failure_budget(&self) -> usize {
        self.failure_budget
    }

    /// Record that one candidate failed permanently.
    pub fn decrement_failure_budget(&mut self) {
        match self.failure_budget.checked_sub(1) {
            Some(left) => self.failure_budget = left,
            None => self.contract_violation(&format!(
                "failure budget already exhausted for type {}",
                self.service_type
            )),
        }
    }

    /// True once every candidate from the last `set_candidates` failed
    /// permanently.
    pub fn candidates_exhausted(&self) -> bool {
        self.failure_budget == 0
    }

    pub fn active_candidate(&self) -> Option<&CandidateConfig> {
        self.active_candidate.as_ref()
    }

    pub fn set_active_candidate(&mut self, candidate: Option<CandidateConfig>) {
        self.active_candidate = candidate;
    }

    // --- Connection ---

    pub fn active_connection(&self) -> Option<ConnectionId> {
        self.active_connection
    }

    pub fn set_active_connection(&mut self, connection: Option<ConnectionId>) {
        self.active_connection = connection;
    }

    // --- Readiness ---

    /// Requested and dependencies met.
    pub fn is_ready(&self) -> bool {
        self.enabled && self.dependency_met
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        tracing::debug!(
            log_tag = %self.log_tag,
            service_type = %self.service_type,
            enabled,
            previous = self.enabled,
            "set enabled"
        );
        self.enabled = enabled;
    }

    pub fn dependency_met(&self) -> bool {
        self.dependency_met
    }

    pub fn set_dependency_met(&mut self, met: bool) {
        tracing::debug!(
            log_tag = %self.log_tag,
            service_type = %self.service_type,
            met,
            previous = self.dependency_met,
            "set dependency met"
        );
        self.dependency_met = met;
    }

    // --- Deferred work ---

    pub fn pending_action(&self) -> PendingAction {
        self.pending_action
    }

    pub fn set_pending_action(&mut self, action: PendingAction) {
        self.pending_action = action;
    }

    pub fn scheduled_retry_token(&self) -> Option<RetryToken> {
        self.scheduled_retry
    }

    pub fn set_scheduled_retry_token(&mut self, token: Option<RetryToken>) {
        tracing::debug!(
            log_tag = %self.log_tag,
            service_type = %self.service_type,
            token = ?token,
            "set scheduled retry"
        );
        self.scheduled_retry = token;
    }

    /// Remove and return the stored token so the caller can cancel it.
    pub fn take_scheduled_retry_token(&mut self) -> Option<RetryToken> {
        self.scheduled_retry.take()
    }

    /// Copy of every field, for diagnostics.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            service_type: self.service_type.clone(),
            log_tag: self.log_tag.clone(),
            state: self.state,
            pending_action: self.pending_action,
            reason: self.reason.clone(),
            enabled: self.enabled,
            dependency_met: self.dependency_met,
            ready: self.is_ready(),
            failure_budget: self.failure_budget,
            candidates: self.candidates.iter().cloned().collect(),
            active_candidate: self.active_candidate.clone(),
            active_connection: self.active_connection,
            scheduled_retry: self.scheduled_retry,
        }
    }

    fn contract_violation(&self, message: &str) {
        match self.policy {
            ContractPolicy::Assert => panic!("[{}] {}", self.log_tag, message),
            ContractPolicy::Warn => tracing::warn!(
                log_tag = %self.log_tag,
                service_type = %self.service_type,
                "caller contract violated: {}",
                message
            ),
        }
    }
}

/// Serializable view of a `ConnectionContext`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub service_type: ServiceType,
    pub log_tag: String,
    pub state: ConnectionState,
    pub pending_action: PendingAction,
    pub reason: String,
    pub enabled: bool,
    pub dependency_met: bool,
    pub ready: bool,
    pub failure_budget: usize,
    pub candidates: Vec<CandidateConfig>,
    pub active_candidate: Option<CandidateConfig>,
    pub active_connection: Option<ConnectionId>,
    pub scheduled_retry: Option<RetryToken>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionState::*;

    fn abc() -> Vec<CandidateConfig> {
        vec![
            CandidateConfig::new(1, "a", &["default"]),
            CandidateConfig::new(2, "b", &["default"]),
            CandidateConfig::new(3, "c", &["*"]),
        ]
    }

    fn ids(ctx: &ConnectionContext) -> Vec<u32> {
        ctx.candidates().iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_construction_defaults() {
        let ctx = ConnectionContext::new("default", "DCT");
        assert_eq!(ctx.service_type().as_str(), "default");
        assert_eq!(ctx.log_tag(), "DCT");
        assert_eq!(ctx.state(), Idle);
        assert_eq!(ctx.reason(), reason::DATA_ENABLED);
        assert_eq!(ctx.pending_action(), PendingAction::None);
        assert!(!ctx.is_enabled());
        assert!(ctx.dependency_met());
        assert!(ctx.candidates().is_empty());
        assert_eq!(ctx.failure_budget(), 0);
        assert!(ctx.active_candidate().is_none());
        assert!(ctx.active_connection().is_none());
        assert!(ctx.scheduled_retry_token().is_none());
    }

    #[test]
    fn test_candidate_exhaustion_scenario() {
        let mut ctx = ConnectionContext::new("default", "DCT");
        ctx.set_candidates(abc());
        assert_eq!(ctx.failure_budget(), 3);

        ctx.set_state(Connecting);
        ctx.decrement_failure_budget();
        ctx.decrement_failure_budget();
        assert_eq!(ctx.failure_budget(), 1);
        assert_eq!(ids(&ctx), vec![1, 2, 3]);

        ctx.dequeue_candidate();
        ctx.dequeue_candidate();
        assert_eq!(ids(&ctx), vec![3]);

        ctx.set_state(Failed);
        assert!(ctx.candidates().is_empty());
    }

    #[test]
    fn test_budget_reaches_zero_after_len_decrements() {
        for n in 0..5u32 {
            let list: Vec<_> = (0..n).map(|i| CandidateConfig::new(i, "x", &["*"])).collect();
            let mut ctx = ConnectionContext::new("default", "DCT");
            ctx.set_candidates(list);
            for _ in 0..n {
                ctx.decrement_failure_budget();
            }
            assert_eq!(ctx.failure_budget(), 0);
            assert!(ctx.candidates_exhausted());
        }
    }

    #[test]
    fn test_set_candidates_resets_budget() {
        let mut ctx = ConnectionContext::new("default", "DCT");
        ctx.set_candidates(abc());
        ctx.decrement_failure_budget();
        ctx.set_candidates(vec![CandidateConfig::new(9, "z", &["*"])]);
        assert_eq!(ctx.failure_budget(), 1);
        assert_eq!(ids(&ctx), vec![9]);

        ctx.set_candidates(Vec::new());
        assert_eq!(ctx.failure_budget(), 0);
        assert!(ctx.peek_next_candidate().is_none());
    }

    #[test]
    fn test_failed_clears_queue_from_every_state() {
        // Legal route from Idle to each state.
        let routes: [(ConnectionState, &[ConnectionState]); 7] = [
            (Idle, &[]),
            (Connecting, &[Connecting]),
            (Scanning, &[Scanning]),
            (Connected, &[Connecting, Connected]),
            (Disconnecting, &[Connecting, Connected, Disconnecting]),
            (Failed, &[Connecting, Failed]),
            (Retrying, &[Connecting, Retrying]),
        ];

        for (from, route) in routes {
            let mut ctx = ConnectionContext::new("default", "DCT");
            assert_eq!(ctx.policy(), ContractPolicy::default());
            for step in route {
                ctx.set_state(*step);
            }
            assert_eq!(ctx.state(), from);

            ctx.set_candidates(abc());
            ctx.set_state(Failed);
            assert_eq!(ctx.state(), Failed);
            assert!(ctx.candidates().is_empty(), "from {}", from);
        }
    }

    #[test]
    fn test_failed_keeps_budget_and_active_candidate() {
        let mut ctx = ConnectionContext::new("default", "DCT");
        ctx.set_candidates(abc());
        ctx.set_active_candidate(ctx.peek_next_candidate().cloned());
        ctx.set_state(Connecting);
        ctx.set_state(Failed);
        assert_eq!(ctx.failure_budget(), 3);
        assert_eq!(ctx.active_candidate().map(|c| c.id), Some(1));
    }

    #[test]
    fn test_readiness_truth_table() {
        for (enabled, met) in [(false, false), (false, true), (true, false), (true, true)] {
            let mut ctx = ConnectionContext::new("mms", "DCT");
            ctx.set_enabled(enabled);
            ctx.set_dependency_met(met);
            assert_eq!(ctx.is_ready(), enabled && met, "enabled={} met={}", enabled, met);
        }
    }

    #[test]
    fn test_readiness_scenario() {
        let mut ctx = ConnectionContext::new("default", "DCT");
        ctx.set_enabled(true);
        assert!(ctx.is_ready());
        ctx.set_dependency_met(false);
        assert!(!ctx.is_ready());
    }

    #[test]
    fn test_dequeue_empty_is_noop() {
        let mut ctx = ConnectionContext::new("default", "DCT");
        assert!(ctx.dequeue_candidate().is_none());
        assert!(ctx.dequeue_candidate().is_none());
        assert!(ctx.candidates().is_empty());
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let mut ctx = ConnectionContext::new("default", "DCT");
        ctx.set_candidates(abc());
        for _ in 0..5 {
            assert_eq!(ctx.peek_next_candidate().map(|c| c.id), Some(1));
        }
        assert_eq!(ids(&ctx), vec![1, 2, 3]);
    }

    #[test]
    fn test_pending_action_sticks_until_reset() {
        let mut ctx = ConnectionContext::new("default", "DCT");
        ctx.set_pending_action(PendingAction::Reconnect);
        ctx.set_state(Connecting);
        ctx.set_reason(reason::NETWORK_LOST);
        assert_eq!(ctx.pending_action(), PendingAction::Reconnect);
        assert_eq!(ctx.pending_action(), PendingAction::Reconnect);
        ctx.set_pending_action(PendingAction::None);
        assert_eq!(ctx.pending_action(), PendingAction::None);
    }

    #[test]
    fn test_retry_token_take() {
        let mut ctx = ConnectionContext::new("default", "DCT");
        let token = RetryToken::new();
        ctx.set_scheduled_retry_token(Some(token));
        assert_eq!(ctx.scheduled_retry_token(), Some(token));
        assert_eq!(ctx.take_scheduled_retry_token(), Some(token));
        assert!(ctx.scheduled_retry_token().is_none());
        assert!(ctx.take_scheduled_retry_token().is_none());
    }

    #[test]
    fn test_active_connection_handle() {
        let mut ctx = ConnectionContext::new("default", "DCT");
        let conn = ConnectionId::new();
        ctx.set_active_connection(Some(conn));
        assert_eq!(ctx.active_connection(), Some(conn));
        ctx.set_active_connection(None);
        assert!(ctx.active_connection().is_none());
    }

    #[test]
    #[should_panic(expected = "failure budget already exhausted")]
    fn test_over_decrement_panics_under_assert() {
        let mut ctx = ConnectionContext::new("default", "DCT").with_policy(ContractPolicy::Assert);
        ctx.set_candidates(vec![CandidateConfig::new(1, "a", &["*"])]);
        ctx.decrement_failure_budget();
        ctx.decrement_failure_budget();
    }

    #[test]
    fn test_over_decrement_clamps_under_warn() {
        let mut ctx = ConnectionContext::new("default", "DCT").with_policy(ContractPolicy::Warn);
        ctx.decrement_failure_budget();
        assert_eq!(ctx.failure_budget(), 0);
    }

    #[test]
    #[should_panic(expected = "illegal transition IDLE -> CONNECTED")]
    fn test_illegal_transition_panics_under_assert() {
        let mut ctx = ConnectionContext::new("default", "DCT").with_policy(ContractPolicy::Assert);
        ctx.set_state(Connected);
    }

    #[test]
    fn test_illegal_transition_applied_under_warn() {
        let mut ctx = ConnectionContext::new("default", "DCT").with_policy(ContractPolicy::Warn);
        ctx.set_state(Connected);
        assert_eq!(ctx.state(), Connected);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut ctx = ConnectionContext::new("supl", "DCT");
        ctx.set_candidates(abc());
        ctx.set_enabled(true);
        ctx.set_scheduled_retry_token(Some(RetryToken::new()));

        let snap = ctx.snapshot();
        assert!(snap.ready);
        assert_eq!(snap.failure_budget, 3);

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"state\":\"IDLE\""));
        assert!(json.contains("\"pending_action\":\"none\""));
        let decoded: ContextSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snap);
    }
}
