//! Carries out [`TipEffect`]s against a [`TipWallet`].

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use dioxus_logger::tracing::info;
use dioxus_logger::tracing::warn;
use web_time::Instant;

use super::machine::TipEffect;
use super::machine::TipEvent;
use crate::debounce::Clock;
use crate::notification::NotificationSink;
use crate::wallet::TipWallet;

/// Runs `effects` to completion.
///
/// Wallet results are handed to `handle`, normally a closure around
/// [`super::TipMachine::handle`], and any effects it returns are queued
/// behind the current ones. Notices go straight to `sink`.
pub async fn drive<W, S, F>(wallet: &W, sink: &mut S, effects: Vec<TipEffect>, mut handle: F)
where
    W: TipWallet,
    S: NotificationSink,
    F: FnMut(TipEvent) -> Vec<TipEffect>,
{
    let mut queue: VecDeque<TipEffect> = effects.into();

    while let Some(effect) = queue.pop_front() {
        let event = match effect {
            TipEffect::Notify(notice) => {
                sink.notify(notice);
                continue;
            }
            TipEffect::Prepare(request) => {
                let result = wallet.prepare_transaction(&request.args).await;
                TipEvent::Prepared {
                    generation: request.generation,
                    result,
                }
            }
            TipEffect::Submit(tx) => {
                let result = wallet.submit_transaction(&tx).await;
                match &result {
                    Ok(hash) => info!("tip submitted: {}", hash),
                    Err(e) => warn!("tip submission failed: {}", e),
                }
                TipEvent::Submitted(result)
            }
            TipEffect::Watch(hash) => {
                let result = wallet.watch_transaction(&hash).await;
                TipEvent::Settled { hash, result }
            }
        };
        queue.extend(handle(event));
    }
}

/// Sleeps until the debounce deadline and ticks, repeating while a deadline
/// is still pending, then drives whatever the settled amount produced.
///
/// Timers may fire early or the amount may change while asleep, so the
/// deadline is re-read after every wake.
pub async fn settle<W, S, C, Z, Fut, D, T, H>(
    wallet: &W,
    sink: &mut S,
    clock: &C,
    mut sleep: Z,
    deadline: D,
    mut tick: T,
    mut handle: H,
) where
    W: TipWallet,
    S: NotificationSink,
    C: Clock,
    Z: FnMut(Duration) -> Fut,
    Fut: Future<Output = ()>,
    D: Fn() -> Option<Instant>,
    T: FnMut(Instant) -> Vec<TipEffect>,
    H: FnMut(TipEvent) -> Vec<TipEffect>,
{
    while let Some(due) = deadline() {
        sleep(due.saturating_duration_since(clock.now())).await;
        let effects = tick(clock.now());
        drive(wallet, sink, effects, &mut handle).await;
    }
}
