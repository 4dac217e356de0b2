//! Unit tests for the one-time-code state machine.
//!
//! The decision functions are pure over a snapshot and a clock, so every
//! lifecycle property is covered here with synthetic timestamps and a
//! small in-memory stand-in for the credential store's conditional writes.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pressdesk::auth::hash_code;
use pressdesk::models::OtpSnapshot;
use pressdesk::services::{issue_decision, verify_decision, IssueDecision, VerifyDecision};
use rstest::rstest;

const COOLDOWN_SECS: i64 = 30;
const TTL_MINUTES: i64 = 5;
const MAX_ATTEMPTS: i32 = 5;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
}

fn idle() -> OtpSnapshot {
    OtpSnapshot {
        code_hash: None,
        expires_at: None,
        sent_at: None,
        attempts: 0,
    }
}

/// Stand-in for the persisted credential: applies the writes the service
/// performs for each decision.
struct Store {
    snapshot: OtpSnapshot,
}

impl Store {
    fn new() -> Self {
        Self { snapshot: idle() }
    }

    /// RequestOTP against the store; returns the plaintext code when one
    /// was issued.
    fn request(&mut self, code: &str, now: DateTime<Utc>) -> Result<String, ()> {
        match issue_decision(&self.snapshot, now, COOLDOWN_SECS) {
            IssueDecision::Throttled { .. } => Err(()),
            IssueDecision::Issue => {
                self.snapshot = OtpSnapshot {
                    code_hash: Some(hash_code(code)),
                    expires_at: Some(now + Duration::minutes(TTL_MINUTES)),
                    sent_at: Some(now),
                    attempts: 0,
                };
                Ok(code.to_string())
            }
        }
    }

    /// VerifyOTP against the store, applying counter increments and the
    /// consume-on-success clearing.
    fn verify(&mut self, submitted: &str, now: DateTime<Utc>) -> VerifyDecision {
        let decision = verify_decision(&self.snapshot, &hash_code(submitted), now, MAX_ATTEMPTS);
        match decision {
            VerifyDecision::Mismatch => self.snapshot.attempts += 1,
            VerifyDecision::Match => {
                self.snapshot.code_hash = None;
                self.snapshot.expires_at = None;
                self.snapshot.attempts = 0;
            }
            _ => {}
        }
        decision
    }
}

// =============================================================================
// Issue decisions
// =============================================================================

#[test]
fn test_first_request_issues() {
    assert_eq!(
        issue_decision(&idle(), t0(), COOLDOWN_SECS),
        IssueDecision::Issue
    );
}

#[rstest]
#[case(1, false)]
#[case(10, false)]
#[case(29, false)]
#[case(30, true)]
#[case(31, true)]
#[case(600, true)]
fn test_cooldown_boundaries(#[case] elapsed_secs: i64, #[case] allowed: bool) {
    let mut snapshot = idle();
    snapshot.sent_at = Some(t0());

    let decision = issue_decision(&snapshot, t0() + Duration::seconds(elapsed_secs), COOLDOWN_SECS);

    if allowed {
        assert_eq!(decision, IssueDecision::Issue);
    } else {
        assert!(matches!(decision, IssueDecision::Throttled { .. }));
    }
}

#[test]
fn test_throttled_reports_remaining_wait() {
    let mut snapshot = idle();
    snapshot.sent_at = Some(t0());

    match issue_decision(&snapshot, t0() + Duration::seconds(10), COOLDOWN_SECS) {
        IssueDecision::Throttled { retry_after_secs } => assert_eq!(retry_after_secs, 20),
        other => panic!("expected throttle, got {:?}", other),
    }
}

#[test]
fn test_throttled_request_mutates_nothing() {
    let mut store = Store::new();
    store.request("111111", t0()).unwrap();
    let before_sent_at = store.snapshot.sent_at;
    let before_hash = store.snapshot.code_hash.clone();

    assert!(store.request("222222", t0() + Duration::seconds(10)).is_err());

    assert_eq!(store.snapshot.sent_at, before_sent_at);
    assert_eq!(store.snapshot.code_hash, before_hash);
}

// =============================================================================
// Verify decisions
// =============================================================================

#[test]
fn test_verify_without_pending_code() {
    assert_eq!(
        verify_decision(&idle(), &hash_code("123456"), t0(), MAX_ATTEMPTS),
        VerifyDecision::NoPending
    );
}

#[rstest]
#[case(0, false)]
#[case(4, false)]
#[case(5, true)]
#[case(6, true)]
fn test_lockout_threshold(#[case] attempts: i32, #[case] locked: bool) {
    let mut store = Store::new();
    let code = store.request("734952", t0()).unwrap();
    store.snapshot.attempts = attempts;

    let decision = store.verify(&code, t0() + Duration::seconds(5));

    if locked {
        assert_eq!(decision, VerifyDecision::LockedOut);
    } else {
        assert_eq!(decision, VerifyDecision::Match);
    }
}

#[test]
fn test_expiry_boundary_is_inclusive() {
    let mut store = Store::new();
    let code = store.request("734952", t0()).unwrap();
    let expiry = t0() + Duration::minutes(TTL_MINUTES);

    // Exactly at the expiry instant the code is dead
    assert_eq!(store.verify(&code, expiry), VerifyDecision::Expired);
    // One second earlier it still works
    assert_eq!(
        store.verify(&code, expiry - Duration::seconds(1)),
        VerifyDecision::Match
    );
}

#[test]
fn test_expired_code_fails_even_when_correct_and_counts_nothing() {
    let mut store = Store::new();
    let code = store.request("734952", t0()).unwrap();
    let late = t0() + Duration::minutes(TTL_MINUTES) + Duration::seconds(1);

    assert_eq!(store.verify(&code, late), VerifyDecision::Expired);
    assert_eq!(store.snapshot.attempts, 0);
}

#[test]
fn test_lockout_short_circuit_counts_nothing() {
    let mut store = Store::new();
    store.request("734952", t0()).unwrap();
    store.snapshot.attempts = MAX_ATTEMPTS;

    assert_eq!(
        store.verify("000000", t0() + Duration::seconds(1)),
        VerifyDecision::LockedOut
    );
    assert_eq!(store.snapshot.attempts, MAX_ATTEMPTS);
}

#[test]
fn test_lockout_checked_before_expiry() {
    // A locked-out, expired code reports lockout, not expiry
    let mut store = Store::new();
    store.request("734952", t0()).unwrap();
    store.snapshot.attempts = MAX_ATTEMPTS;
    let late = t0() + Duration::minutes(TTL_MINUTES) + Duration::minutes(1);

    assert_eq!(store.verify("734952", late), VerifyDecision::LockedOut);
}

// =============================================================================
// Lifecycle scenarios
// =============================================================================

#[test]
fn test_scenario_wrong_then_right_then_replay() {
    // Request at t=0, wrong code at t=1s, correct at t=2s, replay at t=3s
    let mut store = Store::new();
    let code = store.request("582041", t0()).unwrap();

    assert_eq!(
        store.verify("000000", t0() + Duration::seconds(1)),
        VerifyDecision::Mismatch
    );
    assert_eq!(store.snapshot.attempts, 1);

    assert_eq!(
        store.verify(&code, t0() + Duration::seconds(2)),
        VerifyDecision::Match
    );
    assert_eq!(store.snapshot.code_hash, None);
    assert_eq!(store.snapshot.expires_at, None);
    assert_eq!(store.snapshot.attempts, 0);

    // Consumption is exactly-once: the same code is now rejected
    assert_eq!(
        store.verify(&code, t0() + Duration::seconds(3)),
        VerifyDecision::NoPending
    );
}

#[test]
fn test_scenario_second_request_throttled_first_code_still_valid() {
    let mut store = Store::new();
    let code = store.request("582041", t0()).unwrap();

    assert!(store.request("999999", t0() + Duration::seconds(10)).is_err());

    assert_eq!(
        store.verify(&code, t0() + Duration::seconds(20)),
        VerifyDecision::Match
    );
}

#[test]
fn test_scenario_lockout_requires_fresh_code() {
    let mut store = Store::new();
    let code = store.request("582041", t0()).unwrap();

    for i in 1..=MAX_ATTEMPTS {
        assert_eq!(
            store.verify("000000", t0() + Duration::seconds(i as i64)),
            VerifyDecision::Mismatch
        );
        assert_eq!(store.snapshot.attempts, i);
    }

    // Correct code is refused while locked
    assert_eq!(
        store.verify(&code, t0() + Duration::seconds(10)),
        VerifyDecision::LockedOut
    );

    // A fresh code resets the counter and verifies
    let fresh = store
        .request("176393", t0() + Duration::seconds(COOLDOWN_SECS))
        .unwrap();
    assert_eq!(store.snapshot.attempts, 0);
    assert_eq!(
        store.verify(&fresh, t0() + Duration::seconds(COOLDOWN_SECS + 5)),
        VerifyDecision::Match
    );
}

#[test]
fn test_new_code_invalidates_previous_one() {
    let mut store = Store::new();
    let first = store.request("111111", t0()).unwrap();

    let second_at = t0() + Duration::seconds(COOLDOWN_SECS);
    let second = store.request("222222", second_at).unwrap();

    // The old code now hashes to a mismatch and counts as a failed attempt
    assert_eq!(
        store.verify(&first, second_at + Duration::seconds(1)),
        VerifyDecision::Mismatch
    );
    assert_eq!(store.snapshot.attempts, 1);

    assert_eq!(
        store.verify(&second, second_at + Duration::seconds(2)),
        VerifyDecision::Match
    );
}
