use std::time::Duration;

use api::notification::Notice;
use api::notification::NotificationSink;
use api::notification::Severity;
use dioxus::prelude::*;
use dioxus_logger::tracing::info;
use dioxus_logger::tracing::warn;

use crate::compat;

/// A notice on screen, keyed so it can be dismissed.
#[derive(Clone, PartialEq, Debug)]
pub struct Toast {
    pub id: u64,
    pub notice: Notice,
}

/// The app-wide toast queue, provided as a Dioxus context.
#[derive(Clone, Copy)]
pub struct Toaster {
    toasts: Signal<Vec<Toast>>,
    next_id: Signal<u64>,
    lifetime: Duration,
}

impl Toaster {
    /// Toasts currently on screen, oldest first.
    /// Call .read() on this in a component to subscribe to changes.
    pub fn toasts(&self) -> Signal<Vec<Toast>> {
        self.toasts
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.write().retain(|toast| toast.id != id);
    }
}

impl NotificationSink for Toaster {
    /// Shows the notice and schedules its removal after the toast lifetime.
    fn notify(&mut self, notice: Notice) {
        match notice.severity {
            Severity::Error | Severity::Warning => {
                warn!("[{}] {}", notice.severity, notice.message)
            }
            Severity::Success | Severity::Info => {
                info!("[{}] {}", notice.severity, notice.message)
            }
        }

        let id = *self.next_id.peek();
        self.next_id.set(id + 1);
        self.toasts.write().push(Toast { id, notice });

        let mut toaster = *self;
        spawn(async move {
            compat::sleep(toaster.lifetime).await;
            toaster.dismiss(id);
        });
    }
}

/// Creates the toast queue and provides it to all descendants.
pub fn use_toaster_provider(lifetime: Duration) -> Toaster {
    let toasts = use_signal(Vec::new);
    let next_id = use_signal(|| 0);
    use_context_provider(|| Toaster {
        toasts,
        next_id,
        lifetime,
    })
}

pub fn use_toaster() -> Toaster {
    use_context::<Toaster>()
}
