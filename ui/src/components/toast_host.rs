use api::notification::Severity;
use dioxus::prelude::*;

use crate::hooks::use_toaster::use_toaster;

fn accent(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "var(--pico-ins-color)",
        Severity::Error => "var(--pico-del-color)",
        Severity::Warning => "#e8a317",
        Severity::Info => "var(--pico-primary)",
    }
}

/// Renders the toast stack in the top-right corner.
#[component]
pub fn ToastHost() -> Element {
    let mut toaster = use_toaster();
    let toasts = toaster.toasts();

    rsx! {
        div {
            role: "status",
            "aria-live": "polite",
            style: "position: fixed; top: 1rem; right: 1rem; z-index: 2000; display: flex; flex-direction: column; gap: 0.5rem; max-width: 22rem;",
            for toast in toasts.read().iter().cloned() {
                article {
                    key: "{toast.id}",
                    class: "toast toast-{toast.notice.severity}",
                    style: "margin: 0; padding: 0.75rem 1rem; display: flex; align-items: flex-start; gap: 0.75rem; border-left: 4px solid {accent(toast.notice.severity)};",
                    span {
                        style: "flex-grow: 1;",
                        "{toast.notice.message}"
                    }
                    a {
                        href: "#",
                        "aria-label": "Dismiss",
                        style: "text-decoration: none;",
                        onclick: move |evt| {
                            evt.prevent_default();
                            toaster.dismiss(toast.id);
                        },
                        "×"
                    }
                }
            }
        }
    }
}
