//=============================================================================
// File: src/components/tip_user.rs
//=============================================================================
use api::debounce::Clock;
use api::debounce::SystemClock;
use api::tip::drive;
use api::tip::settle;
use api::tip::TipMachine;
use api::wallet::abbreviate;
use api::wallet::Address;
use api::wallet::PostId;
use api::wallet::TipWallet;
use dioxus::prelude::*;

use crate::compat;
use crate::components::pico::Button;
use crate::components::pico::ButtonType;
use crate::components::pico::Modal;
use crate::hooks::use_toaster::use_toaster;
use crate::server_wallet::ServerWallet;

/// A "Tip User" button that opens a dialog for tipping the author of a post.
#[component]
pub fn TipUser(address: Address, post_id: PostId) -> Element {
    let wallet = use_context::<ServerWallet>();
    let mut toaster = use_toaster();
    let mut machine = use_signal(|| TipMachine::new(address, post_id));

    let on_amount_input = move |event: FormEvent| {
        machine.write().set_amount(event.value(), SystemClock.now());

        spawn(async move {
            settle(
                &wallet,
                &mut toaster,
                &SystemClock,
                compat::sleep,
                move || machine.peek().next_deadline(),
                move |now| machine.write().tick(now),
                move |event| machine.write().handle(event),
            )
            .await;
        });
    };

    let on_submit = move |_: MouseEvent| {
        spawn(async move {
            let status = wallet.connection_status().await;
            let effects = machine.write().submit(status);
            drive(&wallet, &mut toaster, effects, move |event| {
                machine.write().handle(event)
            })
            .await;
        });
    };

    let (is_open, amount, is_busy, submit_label) = {
        let m = machine.read();
        (m.is_open(), m.amount().to_string(), m.is_busy(), m.submit_label())
    };

    rsx! {
        Button {
            style: "display: block; width: fit-content; margin: 0 auto;",
            on_click: move |_| machine.write().open(),
            "Tip User"
        }
        Modal {
            is_open,
            title: "Tip User".to_string(),
            on_close: move |_| machine.write().close(),

            p {
                small {
                    "Send SMK to "
                    code { "{abbreviate(&address)}" }
                    " for post #{post_id}. Tips are final once confirmed on-chain."
                }
            }
            label {
                strong { "Amount (in SMK)" }
                input {
                    r#type: "number",
                    name: "tip_amount",
                    min: "0",
                    step: "0.01",
                    inputmode: "decimal",
                    placeholder: "0",
                    value: "{amount}",
                    oninput: on_amount_input,
                }
            }
            Button {
                button_type: ButtonType::Primary,
                style: "width: 100%;",
                disabled: is_busy,
                busy: is_busy,
                on_click: on_submit,
                "{submit_label}"
            }
        }
    }
}
