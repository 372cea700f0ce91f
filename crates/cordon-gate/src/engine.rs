//! The gate engine.
//!
//! One synchronous entry point per tool-invocation attempt: parse,
//! classify, consult session and approval state, decide, audit. The engine
//! never blocks waiting for a human - an ask decision returns immediately
//! and the orchestrator re-invokes later with an approval token.

use cordon_approval::{ApprovalGate, ApprovalScope, ApprovalToken};
use cordon_audit::{AuditKind, AuditLog, EventOutcome, GateReport};
use cordon_config::{DecisionKind, DecisionPolicy, GateConfig};
use cordon_core::{Decision, EventId, SessionId, Tier};
use cordon_rules::{Classifier, CommandClassification};
use cordon_session::{SessionError, SessionStore, WorkflowPhase};
use tracing::{debug, warn};

use crate::error::{GateError, GateResult};
use crate::request::{GateDecision, ToolRequest};
use crate::validator::DelegationPolicy;

/// Rule id recorded when parsing failed and the gate refused fail-closed.
pub const RULE_PARSE_FAIL_CLOSED: &str = "parse.fail-closed";
/// Rule id recorded when a stale session was refused.
pub const RULE_SESSION_STALE: &str = "session.stale";
/// Rule id recorded for validated delegation requests.
pub const RULE_DELEGATION_OK: &str = "delegation.validated";
/// Rule id recorded for rejected delegation requests.
pub const RULE_DELEGATION_REJECTED: &str = "delegation.rejected";

/// The command-security gate.
///
/// Owns the classifier, the per-session workflow store, the approval gate,
/// and the audit log. Invoked synchronously once per tool-invocation
/// attempt; safe to share across concurrently active sessions.
pub struct CommandGate {
    classifier: Classifier,
    sessions: SessionStore,
    approvals: ApprovalGate,
    audit: AuditLog,
    decisions: DecisionPolicy,
    delegation: DelegationPolicy,
    gc_window_secs: i64,
    report_window_days: u32,
}

impl CommandGate {
    /// Build a gate from configuration, opening the audit log directory.
    ///
    /// # Errors
    ///
    /// Returns an audit error if the log directory cannot be opened.
    pub fn new(config: GateConfig) -> GateResult<Self> {
        let audit = AuditLog::open(&config.audit.dir)?;
        Ok(Self {
            classifier: Classifier::new(config.rules),
            sessions: SessionStore::new(config.session.policy),
            approvals: ApprovalGate::new(config.approval.token_ttl_secs),
            audit,
            decisions: config.decisions,
            delegation: DelegationPolicy::default(),
            gc_window_secs: config.session.gc_window_secs,
            report_window_days: config.audit.report_window_days,
        })
    }

    /// Evaluate one tool-invocation request.
    ///
    /// # Errors
    ///
    /// Returns a [`GateError`] only for infrastructure failures (audit io,
    /// poisoned locks). Refusals are [`Decision::Deny`] values, not errors;
    /// callers must treat errors as fail-closed all the same.
    pub fn evaluate(&self, request: &ToolRequest) -> GateResult<GateDecision> {
        self.sessions.get_or_create(&request.session_id)?;

        // Stale or error-capped sessions cannot resume; a fresh session id
        // must be used.
        if let Err(SessionError::Stale { reason }) =
            self.sessions.check_resumable(&request.session_id)
        {
            let decision = Decision::Deny {
                reason: format!("session cannot resume: {reason}"),
            };
            let event = self.audit_evaluation(request, &[], None, RULE_SESSION_STALE, &decision)?;
            return Ok(self.decided(request, decision, None, None, event));
        }
        self.sessions.touch(&request.session_id)?;

        if self.delegation.is_delegation(request) {
            return self.evaluate_delegation(request);
        }

        let subs = match cordon_shell::parse(&request.command) {
            Ok(subs) => subs,
            Err(e) => {
                self.sessions.record_error(&request.session_id)?;
                let decision = Decision::Deny {
                    reason: format!("unparseable command ({e}); refusing fail-closed"),
                };
                let event =
                    self.audit_evaluation(request, &[], None, RULE_PARSE_FAIL_CLOSED, &decision)?;
                return Ok(self.decided(request, decision, None, None, event));
            },
        };

        let rendered: Vec<String> = subs.iter().map(cordon_core::AtomicSubCommand::rendered).collect();
        let classification = self.classifier.classify(&subs);
        let scope = rendered
            .get(classification.worst_index)
            .cloned()
            .unwrap_or_else(|| request.command.clone());
        let (rule_id, justification) = match classification.worst() {
            Some(worst) => (worst.rule_id.clone(), worst.reason.clone()),
            None => (
                cordon_rules::RULE_DEFAULT_UNCLASSIFIED.to_string(),
                "empty classification".to_string(),
            ),
        };

        // A deny-action block rule has no approval path.
        if let Some(reason) = classification.deny_reason.clone() {
            let decision = Decision::Deny { reason };
            let event = self.audit_evaluation(
                request,
                &rendered,
                Some(&classification),
                &rule_id,
                &decision,
            )?;
            return Ok(self.decided(
                request,
                decision,
                Some(classification.tier),
                Some(classification),
                event,
            ));
        }

        match self.decisions.for_tier(classification.tier) {
            DecisionKind::Allow => {
                let decision = Decision::Allow;
                let event = self.audit_evaluation(
                    request,
                    &rendered,
                    Some(&classification),
                    &rule_id,
                    &decision,
                )?;
                Ok(self.decided(
                    request,
                    decision,
                    Some(classification.tier),
                    Some(classification),
                    event,
                ))
            },
            DecisionKind::Ask => {
                self.evaluate_ask(request, &rendered, classification, &scope, &rule_id, &justification)
            },
        }
    }

    /// The ask path: honor a valid token, otherwise hold for approval.
    #[allow(clippy::too_many_arguments)]
    fn evaluate_ask(
        &self,
        request: &ToolRequest,
        rendered: &[String],
        classification: CommandClassification,
        scope: &str,
        rule_id: &str,
        justification: &str,
    ) -> GateResult<GateDecision> {
        if let Some(token_id) = &request.approval_token {
            match self.approvals.consume(&request.session_id, token_id, scope) {
                Ok(token) => {
                    match self
                        .sessions
                        .transition(&request.session_id, WorkflowPhase::ApprovedExecuting)
                    {
                        Ok(()) => {
                            debug!(
                                session = %request.session_id,
                                token = %token.id,
                                "approved execution"
                            );
                            let decision = Decision::Allow;
                            let event = self.audit_evaluation(
                                request,
                                rendered,
                                Some(&classification),
                                rule_id,
                                &decision,
                            )?;
                            return Ok(self.decided(
                                request,
                                decision,
                                Some(classification.tier),
                                Some(classification),
                                event,
                            ));
                        },
                        Err(e) => {
                            // Token was consumed but the session is not in a
                            // phase that can execute; fail closed to ask.
                            self.audit.append(
                                &request.session_id,
                                AuditKind::SessionAnomaly {
                                    details: format!(
                                        "token {token_id} consumed but session cannot execute: {e}"
                                    ),
                                },
                            )?;
                        },
                    }
                },
                Err(e) => {
                    // A mismatched, consumed, superseded, or expired token is
                    // treated as if no token were presented at all.
                    warn!(
                        session = %request.session_id,
                        token = %token_id,
                        error = %e,
                        "approval token rejected"
                    );
                    self.audit.append(
                        &request.session_id,
                        AuditKind::SessionAnomaly {
                            details: format!("approval token rejected: {e}"),
                        },
                    )?;
                },
            }
        }

        self.ensure_pending(&request.session_id)?;
        let scope_owned = scope.to_string();
        self.sessions.with_session(&request.session_id, |s| {
            s.pending_scope = Some(scope_owned);
            Ok(())
        })?;

        let mut justification = format!("{justification}; approval scope: '{scope}'");
        if classification.is_compound_bypass_attempt {
            justification.push_str("; compound operators hide the flagged sub-command");
        }
        let decision = Decision::Ask {
            scope: scope.to_string(),
            justification,
        };
        let event =
            self.audit_evaluation(request, rendered, Some(&classification), rule_id, &decision)?;
        self.audit.append(
            &request.session_id,
            AuditKind::ApprovalRequested {
                scope: scope.to_string(),
            },
        )?;
        Ok(self.decided(
            request,
            decision,
            Some(classification.tier),
            Some(classification),
            event,
        ))
    }

    /// Validate a delegation-style request instead of classifying it.
    fn evaluate_delegation(&self, request: &ToolRequest) -> GateResult<GateDecision> {
        match self.delegation.rejection(request) {
            Some(reason) => {
                let decision = Decision::Deny { reason };
                let event = self.audit_evaluation(
                    request,
                    &[],
                    None,
                    RULE_DELEGATION_REJECTED,
                    &decision,
                )?;
                Ok(self.decided(request, decision, None, None, event))
            },
            None => {
                let decision = Decision::Allow;
                let event =
                    self.audit_evaluation(request, &[], None, RULE_DELEGATION_OK, &decision)?;
                Ok(self.decided(request, decision, None, None, event))
            },
        }
    }

    /// Record a human approval or denial for the session's pending scope.
    ///
    /// Approval issues a token bound exactly to the pending scope; the
    /// retried request must carry it. Denial returns the session to
    /// `INVESTIGATING`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidRequest`] if nothing is pending for the
    /// session, or underlying approval/session/audit errors.
    pub fn record_approval(
        &self,
        session_id: &SessionId,
        approved: bool,
        reason: Option<String>,
    ) -> GateResult<Option<ApprovalToken>> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| GateError::InvalidRequest(format!("unknown session {session_id}")))?;
        let scope = session.pending_scope.clone().ok_or_else(|| {
            GateError::InvalidRequest(format!("session {session_id} has nothing pending"))
        })?;

        if approved {
            let token = self
                .approvals
                .issue(&session, ApprovalScope::exact(scope.clone()))?;
            self.audit.append(
                session_id,
                AuditKind::ApprovalGranted {
                    scope,
                    token: token.id.clone(),
                },
            )?;
            Ok(Some(token))
        } else {
            self.audit
                .append(session_id, AuditKind::ApprovalDenied { scope, reason })?;
            self.sessions
                .transition(session_id, WorkflowPhase::Investigating)?;
            Ok(None)
        }
    }

    /// Completion callback: append the outcome half for an evaluated
    /// command. The original event is never mutated.
    ///
    /// # Errors
    ///
    /// Returns session or audit errors.
    pub fn record_outcome(
        &self,
        session_id: &SessionId,
        event_id: EventId,
        outcome: EventOutcome,
        duration_ms: u64,
    ) -> GateResult<()> {
        if !outcome.is_success() {
            self.sessions.record_error(session_id)?;
        }
        self.audit
            .record_completion(session_id, event_id, outcome, duration_ms)?;
        Ok(())
    }

    /// Drive an explicit workflow transition (e.g. `COMPLETE`,
    /// `NEEDS_INPUT`) on behalf of the orchestrator.
    ///
    /// # Errors
    ///
    /// Out-of-order transitions are rejected, audited as anomalies, and
    /// returned as errors; the session keeps its prior phase.
    pub fn advance(&self, session_id: &SessionId, phase: WorkflowPhase) -> GateResult<()> {
        match self.sessions.transition(session_id, phase) {
            Ok(()) => Ok(()),
            Err(e) => {
                if matches!(e, SessionError::InvalidTransition { .. }) {
                    self.audit.append(
                        session_id,
                        AuditKind::SessionAnomaly {
                            details: e.to_string(),
                        },
                    )?;
                }
                Err(e.into())
            },
        }
    }

    /// A snapshot of a session's workflow state.
    #[must_use]
    pub fn session(&self, session_id: &SessionId) -> Option<cordon_session::AgentSession> {
        self.sessions.get(session_id)
    }

    /// Aggregate metrics over the configured rolling window.
    ///
    /// # Errors
    ///
    /// Returns audit errors from streaming the partitions.
    pub fn report(&self) -> GateResult<GateReport> {
        Ok(GateReport::over_window(&self.audit, self.report_window_days)?)
    }

    /// Garbage-collect stale sessions and dead tokens.
    ///
    /// Returns `(sessions_removed, tokens_removed)`.
    pub fn sweep(&self) -> (usize, usize) {
        (
            self.sessions.sweep_stale(self.gc_window_secs),
            self.approvals.cleanup(),
        )
    }

    /// Move the session into `PENDING_APPROVAL` from wherever it legally
    /// can; a session already pending just stays there (the new scope
    /// replaces the old, invalidating the prior token on next issuance).
    fn ensure_pending(&self, session_id: &SessionId) -> GateResult<()> {
        let phase = self
            .sessions
            .get(session_id)
            .map(|s| s.phase)
            .unwrap_or(WorkflowPhase::Investigating);
        match phase {
            WorkflowPhase::PendingApproval => Ok(()),
            WorkflowPhase::Investigating => {
                self.sessions
                    .transition(session_id, WorkflowPhase::PendingApproval)?;
                Ok(())
            },
            WorkflowPhase::ApprovedExecuting | WorkflowPhase::NeedsInput => {
                self.sessions
                    .transition(session_id, WorkflowPhase::Investigating)?;
                self.sessions
                    .transition(session_id, WorkflowPhase::PendingApproval)?;
                Ok(())
            },
            WorkflowPhase::Complete | WorkflowPhase::Blocked => Err(GateError::InvalidRequest(
                format!("session {session_id} is terminal ({phase})"),
            )),
        }
    }

    /// Append the `CommandEvaluated` audit event for this request.
    fn audit_evaluation(
        &self,
        request: &ToolRequest,
        rendered: &[String],
        classification: Option<&CommandClassification>,
        rule_id: &str,
        decision: &Decision,
    ) -> GateResult<EventId> {
        let (tier, category, compound_bypass) = match classification {
            Some(c) => (
                Some(c.tier),
                c.worst().and_then(|w| w.category).map(|c| c.to_string()),
                c.is_compound_bypass_attempt,
            ),
            None => (None, None, false),
        };
        let event = self.audit.append(
            &request.session_id,
            AuditKind::CommandEvaluated {
                tool: request.tool.clone(),
                raw_command: request.command.clone(),
                sub_commands: rendered.to_vec(),
                tier,
                rule_id: Some(rule_id.to_string()),
                category,
                compound_bypass,
                decision: decision.clone(),
            },
        )?;
        Ok(event.id)
    }

    /// Assemble the outbound decision with the post-evaluation phase.
    fn decided(
        &self,
        request: &ToolRequest,
        decision: Decision,
        tier: Option<Tier>,
        classification: Option<CommandClassification>,
        event_id: EventId,
    ) -> GateDecision {
        let phase = self
            .sessions
            .get(&request.session_id)
            .map_or(WorkflowPhase::Investigating, |s| s.phase);
        GateDecision {
            decision,
            tier,
            classification,
            event_id,
            phase,
        }
    }
}

impl std::fmt::Debug for CommandGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGate")
            .field("report_window_days", &self.report_window_days)
            .finish_non_exhaustive()
    }
}
