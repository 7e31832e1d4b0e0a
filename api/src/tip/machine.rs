//! State of one Tip User widget: dialog visibility, the amount being typed,
//! the prepared transaction and the submission in flight.
//!
//! The machine performs no I/O. User actions and wallet results go in, and
//! [`TipEffect`]s describing the wallet calls and notices to issue come out.

use std::time::Duration;

use dioxus_logger::tracing::debug;
use web_time::Instant;

use crate::amount::InvalidAmount;
use crate::amount::TipAmount;
use crate::debounce::Debounced;
use crate::notification::Notice;
use crate::wallet::Address;
use crate::wallet::ConnectionStatus;
use crate::wallet::PostId;
use crate::wallet::PrepareError;
use crate::wallet::TipArgs;
use crate::wallet::TxDescriptor;
use crate::wallet::TxError;
use crate::wallet::TxHash;
use crate::wallet::TxOutcome;

/// Quiet period before a typed amount is prepared.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(1000);

pub const TIPPED_MESSAGE: &str = "Poster tipped!";
pub const CONNECT_MESSAGE: &str = "Please connect";
pub const ENTER_AMOUNT_MESSAGE: &str = "Enter an amount";
pub const PREPARING_MESSAGE: &str = "Preparing tip, try again in a moment";
pub const REVERTED_MESSAGE: &str = "Tip transaction reverted";

/// Coarse phase of the current tip attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIs, strum::Display)]
pub enum TipPhase {
    Idle,
    Preparing,
    Ready,
    Submitting,
    Confirming,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
enum Preparation {
    None,
    Pending,
    Ready(TxDescriptor),
    Failed(PrepareError),
    Invalid(InvalidAmount),
}

#[derive(Debug, Clone, PartialEq)]
enum Submission {
    Idle,
    Submitting,
    Confirming(TxHash),
    Succeeded(TxHash),
    Failed(String),
}

/// A preparation call tagged with the input generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareRequest {
    pub generation: u64,
    pub args: TipArgs,
}

/// Work the host must carry out on behalf of the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum TipEffect {
    Prepare(PrepareRequest),
    Submit(TxDescriptor),
    Watch(TxHash),
    Notify(Notice),
}

/// Results of wallet calls, fed back into [`TipMachine::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum TipEvent {
    Prepared {
        generation: u64,
        result: Result<TxDescriptor, PrepareError>,
    },
    Submitted(Result<TxHash, TxError>),
    Settled {
        hash: TxHash,
        result: Result<TxOutcome, TxError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TipMachine {
    recipient: Address,
    post_id: PostId,
    is_open: bool,
    amount: String,
    debounced: Debounced<String>,
    /// Bumped on every amount edit; preparation results from older
    /// generations are dropped.
    generation: u64,
    preparation: Preparation,
    submission: Submission,
}

impl TipMachine {
    pub fn new(recipient: Address, post_id: PostId) -> Self {
        Self {
            recipient,
            post_id,
            is_open: false,
            amount: String::new(),
            debounced: Debounced::new(DEBOUNCE_WINDOW),
            generation: 0,
            preparation: Preparation::None,
            submission: Submission::Idle,
        }
    }

    // --- Getters ---

    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// A transaction is being submitted or awaiting confirmation.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.submission,
            Submission::Submitting | Submission::Confirming(_)
        )
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_busy() {
            "Tipping User..."
        } else {
            "Tip User"
        }
    }

    /// When the typed amount settles, if an edit is waiting.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounced.deadline()
    }

    pub fn prepared(&self) -> Option<&TxDescriptor> {
        match &self.preparation {
            Preparation::Ready(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn phase(&self) -> TipPhase {
        match &self.submission {
            Submission::Submitting => return TipPhase::Submitting,
            Submission::Confirming(_) => return TipPhase::Confirming,
            Submission::Failed(_) => return TipPhase::Failed,
            Submission::Succeeded(_) => return TipPhase::Succeeded,
            Submission::Idle => {}
        }
        match &self.preparation {
            Preparation::Pending => TipPhase::Preparing,
            _ if self.debounced.is_pending() => TipPhase::Preparing,
            Preparation::Ready(_) => TipPhase::Ready,
            _ => TipPhase::Idle,
        }
    }

    // --- Modal ---

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    // --- Input ---

    /// Records a keystroke. Any prepared transaction becomes stale.
    pub fn set_amount(&mut self, raw: impl Into<String>, now: Instant) {
        let raw = raw.into();
        if raw == self.amount {
            return;
        }
        self.amount = raw.clone();
        self.generation += 1;
        self.preparation = Preparation::None;
        self.debounced.update(raw, now);

        if matches!(
            self.submission,
            Submission::Failed(_) | Submission::Succeeded(_)
        ) {
            self.submission = Submission::Idle;
        }
    }

    /// Advances the debounce. Emits a preparation request once a valid amount
    /// has settled.
    pub fn tick(&mut self, now: Instant) -> Vec<TipEffect> {
        let Some(settled) = self.debounced.poll(now).cloned() else {
            return vec![];
        };

        if settled.trim().is_empty() {
            self.preparation = Preparation::None;
            return vec![];
        }

        match settled.parse::<TipAmount>() {
            Ok(amount) => {
                self.preparation = Preparation::Pending;
                debug!(
                    "preparing tip of {} to {} for post {}",
                    amount, self.recipient, self.post_id
                );
                vec![TipEffect::Prepare(PrepareRequest {
                    generation: self.generation,
                    args: TipArgs {
                        recipient: self.recipient,
                        amount,
                        post_id: self.post_id,
                    },
                })]
            }
            Err(invalid) => {
                debug!("amount {:?} rejected: {}", settled, invalid);
                self.preparation = Preparation::Invalid(invalid);
                vec![]
            }
        }
    }

    // --- Submission ---

    /// Handles a click on the submit button.
    pub fn submit(&mut self, connection: ConnectionStatus) -> Vec<TipEffect> {
        if self.is_busy() {
            debug!("submit ignored, a tip is already in flight");
            return vec![];
        }
        if connection.is_disconnected() {
            return vec![TipEffect::Notify(Notice::warning(CONNECT_MESSAGE))];
        }
        if self.amount.trim().is_empty() {
            return vec![TipEffect::Notify(Notice::info(ENTER_AMOUNT_MESSAGE))];
        }

        match &self.preparation {
            Preparation::Ready(tx) => {
                let tx = tx.clone();
                self.submission = Submission::Submitting;
                vec![TipEffect::Submit(tx)]
            }
            Preparation::Failed(err) => vec![TipEffect::Notify(Notice::error(err.reason()))],
            Preparation::Invalid(invalid) => {
                vec![TipEffect::Notify(Notice::error(invalid.to_string()))]
            }
            Preparation::None | Preparation::Pending => {
                vec![TipEffect::Notify(Notice::info(PREPARING_MESSAGE))]
            }
        }
    }

    /// Applies the result of a wallet call.
    pub fn handle(&mut self, event: TipEvent) -> Vec<TipEffect> {
        match event {
            TipEvent::Prepared { generation, result } => {
                if generation != self.generation || self.preparation != Preparation::Pending {
                    debug!("dropping stale preparation for generation {}", generation);
                    return vec![];
                }
                self.preparation = match result {
                    Ok(tx) => Preparation::Ready(tx),
                    Err(err) => {
                        debug!("preparation failed: {}", err.reason());
                        Preparation::Failed(err)
                    }
                };
                vec![]
            }
            TipEvent::Submitted(result) => {
                if self.submission != Submission::Submitting {
                    return vec![];
                }
                match result {
                    Ok(hash) => {
                        self.submission = Submission::Confirming(hash);
                        vec![TipEffect::Watch(hash)]
                    }
                    Err(err) => self.fail(err.short_message),
                }
            }
            TipEvent::Settled { hash, result } => {
                if self.submission != Submission::Confirming(hash) {
                    debug!("ignoring settlement of {}", hash);
                    return vec![];
                }
                match result {
                    Ok(TxOutcome::Confirmed { .. }) => {
                        self.submission = Submission::Succeeded(hash);
                        self.amount.clear();
                        self.debounced.reset();
                        self.generation += 1;
                        self.preparation = Preparation::None;
                        self.is_open = false;
                        vec![TipEffect::Notify(Notice::success(TIPPED_MESSAGE))]
                    }
                    Ok(TxOutcome::Reverted { .. }) => self.fail(REVERTED_MESSAGE.to_string()),
                    Err(err) => self.fail(err.short_message),
                }
            }
        }
    }

    fn fail(&mut self, message: String) -> Vec<TipEffect> {
        self.submission = Submission::Failed(message.clone());
        vec![TipEffect::Notify(Notice::error(message))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::Clock;
    use crate::debounce::ManualClock;
    use crate::notification::Severity;
    use alloy_primitives::Bytes;

    fn machine() -> TipMachine {
        TipMachine::new(Address::repeat_byte(0xa), PostId(42))
    }

    fn connected() -> ConnectionStatus {
        ConnectionStatus::Connected(Address::repeat_byte(0xb))
    }

    fn descriptor() -> TxDescriptor {
        TxDescriptor {
            from: Address::repeat_byte(0xb),
            to: Address::repeat_byte(0xc),
            data: Bytes::new(),
            gas: 21_000,
        }
    }

    /// Types `amount`, lets it settle and returns the preparation request.
    fn settle(m: &mut TipMachine, clock: &ManualClock, amount: &str) -> Vec<TipEffect> {
        m.set_amount(amount, clock.now());
        clock.advance(DEBOUNCE_WINDOW);
        m.tick(clock.now())
    }

    fn ready(m: &mut TipMachine, clock: &ManualClock, amount: &str) {
        let effects = settle(m, clock, amount);
        let [TipEffect::Prepare(req)] = effects.as_slice() else {
            panic!("expected a preparation request, got {:?}", effects);
        };
        m.handle(TipEvent::Prepared {
            generation: req.generation,
            result: Ok(descriptor()),
        });
    }

    fn notices(effects: &[TipEffect]) -> Vec<&Notice> {
        effects
            .iter()
            .filter_map(|e| match e {
                TipEffect::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn starts_closed_and_toggles() {
        let mut m = machine();
        assert!(!m.is_open());
        m.open();
        assert!(m.is_open());
        m.close();
        assert!(!m.is_open());
        assert_eq!(m.phase(), TipPhase::Idle);
    }

    #[test]
    fn settled_amount_issues_preparation() {
        let clock = ManualClock::new();
        let mut m = machine();

        m.set_amount("5", clock.now());
        assert_eq!(m.phase(), TipPhase::Preparing);
        clock.advance(Duration::from_millis(500));
        assert!(m.tick(clock.now()).is_empty());

        clock.advance(Duration::from_millis(500));
        let effects = m.tick(clock.now());
        assert_eq!(
            effects,
            vec![TipEffect::Prepare(PrepareRequest {
                generation: 1,
                args: TipArgs {
                    recipient: Address::repeat_byte(0xa),
                    amount: "5".parse().unwrap(),
                    post_id: PostId(42),
                },
            })]
        );
        assert_eq!(m.phase(), TipPhase::Preparing);
    }

    #[test]
    fn empty_or_invalid_amount_issues_no_preparation() {
        let clock = ManualClock::new();
        let mut m = machine();

        assert!(settle(&mut m, &clock, "5").len() == 1);
        assert!(settle(&mut m, &clock, "").is_empty());
        assert!(settle(&mut m, &clock, "1.5").is_empty());

        let effects = m.submit(connected());
        let notices = notices(&effects);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].severity, Severity::Error);
        assert_eq!(notices[0].message, "Amount must be a whole number of tokens");
    }

    #[test]
    fn amount_edit_makes_descriptor_stale() {
        let clock = ManualClock::new();
        let mut m = machine();
        ready(&mut m, &clock, "5");
        assert_eq!(m.phase(), TipPhase::Ready);

        m.set_amount("7", clock.now());
        assert_eq!(m.prepared(), None);
        assert_eq!(m.phase(), TipPhase::Preparing);

        // Clicking before the new amount settles must not send the old tx.
        let effects = m.submit(connected());
        assert_eq!(
            effects,
            vec![TipEffect::Notify(Notice::info(PREPARING_MESSAGE))]
        );
    }

    #[test]
    fn stale_preparation_results_are_dropped() {
        let clock = ManualClock::new();
        let mut m = machine();

        let effects = settle(&mut m, &clock, "5");
        let [TipEffect::Prepare(old)] = effects.as_slice() else {
            panic!("expected a preparation request");
        };
        let old = old.clone();
        let effects = settle(&mut m, &clock, "6");
        let [TipEffect::Prepare(new)] = effects.as_slice() else {
            panic!("expected a preparation request");
        };
        let new = new.clone();

        m.handle(TipEvent::Prepared {
            generation: old.generation,
            result: Ok(descriptor()),
        });
        assert_eq!(m.prepared(), None);

        m.handle(TipEvent::Prepared {
            generation: new.generation,
            result: Ok(descriptor()),
        });
        assert_eq!(m.prepared(), Some(&descriptor()));
    }

    #[test]
    fn disconnected_submit_warns() {
        let clock = ManualClock::new();
        let mut m = machine();
        ready(&mut m, &clock, "5");

        let effects = m.submit(ConnectionStatus::Disconnected);
        assert_eq!(
            effects,
            vec![TipEffect::Notify(Notice::warning("Please connect"))]
        );
        assert!(!m.is_busy());
    }

    #[test]
    fn empty_amount_submit_prompts() {
        let mut m = machine();
        let effects = m.submit(connected());
        assert_eq!(
            effects,
            vec![TipEffect::Notify(Notice::info("Enter an amount"))]
        );
    }

    #[test]
    fn preparation_failure_surfaces_reason_on_submit() {
        let clock = ManualClock::new();
        let mut m = machine();
        m.open();

        let effects = settle(&mut m, &clock, "5");
        let [TipEffect::Prepare(req)] = effects.as_slice() else {
            panic!("expected a preparation request");
        };
        let generation = req.generation;
        let effects = m.handle(TipEvent::Prepared {
            generation,
            result: Err(PrepareError::with_reason(
                "execution reverted: insufficient funds",
                Some("insufficient funds".to_string()),
            )),
        });
        // Nothing is surfaced while typing.
        assert!(effects.is_empty());

        let effects = m.submit(connected());
        assert_eq!(
            effects,
            vec![TipEffect::Notify(Notice::error("insufficient funds"))]
        );
        assert!(m.is_open());
    }

    #[test]
    fn successful_tip_notifies_once_and_closes() {
        let clock = ManualClock::new();
        let mut m = machine();
        m.open();
        ready(&mut m, &clock, "5");

        assert_eq!(m.submit(connected()), vec![TipEffect::Submit(descriptor())]);
        assert_eq!(m.phase(), TipPhase::Submitting);
        assert_eq!(m.submit_label(), "Tipping User...");

        let hash = TxHash::repeat_byte(0xab);
        let effects = m.handle(TipEvent::Submitted(Ok(hash)));
        assert_eq!(effects, vec![TipEffect::Watch(hash)]);
        assert_eq!(m.phase(), TipPhase::Confirming);
        // The amount is kept until the tip is confirmed.
        assert_eq!(m.amount(), "5");

        let settled = TipEvent::Settled {
            hash,
            result: Ok(TxOutcome::Confirmed { block: 7 }),
        };
        let effects = m.handle(settled.clone());
        assert_eq!(
            effects,
            vec![TipEffect::Notify(Notice::success("Poster tipped!"))]
        );
        assert!(!m.is_open());
        assert_eq!(m.amount(), "");
        assert_eq!(m.phase(), TipPhase::Succeeded);

        assert!(m.handle(settled).is_empty());
    }

    #[test]
    fn submit_while_busy_is_ignored() {
        let clock = ManualClock::new();
        let mut m = machine();
        ready(&mut m, &clock, "5");

        assert_eq!(m.submit(connected()).len(), 1);
        assert!(m.submit(connected()).is_empty());

        m.handle(TipEvent::Submitted(Ok(TxHash::with_last_byte(1))));
        assert!(m.submit(connected()).is_empty());
    }

    #[test]
    fn submission_error_keeps_modal_open_and_allows_retry() {
        let clock = ManualClock::new();
        let mut m = machine();
        m.open();
        ready(&mut m, &clock, "5");

        m.submit(connected());
        let effects = m.handle(TipEvent::Submitted(Err(TxError::new("user rejected"))));
        assert_eq!(effects, vec![TipEffect::Notify(Notice::error("user rejected"))]);
        assert!(m.is_open());
        assert_eq!(m.phase(), TipPhase::Failed);
        assert_eq!(m.amount(), "5");

        assert_eq!(m.submit(connected()), vec![TipEffect::Submit(descriptor())]);
    }

    #[test]
    fn reverted_or_unobserved_tx_fails() {
        let clock = ManualClock::new();
        let mut m = machine();
        ready(&mut m, &clock, "5");
        let hash = TxHash::with_last_byte(2);

        m.submit(connected());
        m.handle(TipEvent::Submitted(Ok(hash.clone())));
        let effects = m.handle(TipEvent::Settled {
            hash: hash.clone(),
            result: Ok(TxOutcome::Reverted { block: 9 }),
        });
        assert_eq!(effects, vec![TipEffect::Notify(Notice::error(REVERTED_MESSAGE))]);
        assert_eq!(m.phase(), TipPhase::Failed);

        m.submit(connected());
        m.handle(TipEvent::Submitted(Ok(hash.clone())));
        let effects = m.handle(TipEvent::Settled {
            hash,
            result: Err(TxError::new("Timed out waiting for confirmation")),
        });
        assert_eq!(notices(&effects)[0].severity, Severity::Error);
    }

    #[test]
    fn settlement_for_unknown_hash_is_ignored() {
        let clock = ManualClock::new();
        let mut m = machine();
        ready(&mut m, &clock, "5");
        m.submit(connected());
        m.handle(TipEvent::Submitted(Ok(TxHash::with_last_byte(1))));

        let effects = m.handle(TipEvent::Settled {
            hash: TxHash::repeat_byte(0xee),
            result: Ok(TxOutcome::Confirmed { block: 1 }),
        });
        assert!(effects.is_empty());
        assert_eq!(m.phase(), TipPhase::Confirming);
    }
}
