// The client-side Dioxus application logic.

use dioxus::prelude::*;

mod app_state;
pub mod compat;
mod components;
pub mod hooks;
mod server_wallet;

use api::contract::TipConfig;
use api::wallet::abbreviate;
use app_state::AppState;
use components::pico::Card;
use components::pico::Container;
use components::tip_user::TipUser;
use components::toast_host::ToastHost;
use hooks::use_toaster::use_toaster_provider;
use server_wallet::ServerWallet;

//=============================================================================
// MAIN APPLICATION COMPONENT (Client-side)
//=============================================================================

#[allow(non_snake_case)]
pub fn App() -> Element {
    let css = r#"
    * { box-sizing: border-box; }

    html, body {
        min-height: 100%;
        margin: 0;
        background-color: var(--pico-background-color);
    }

    .app-main-container header {
        padding: 1rem 0;
    }

    .post-author {
        color: var(--pico-muted-color);
        margin-bottom: 1.5rem;
    }
"#;

    rsx! {
        document::Meta {
            name: "viewport",
            content: "width=device-width, initial-scale=1.0",
        }
        document::Stylesheet {
            href: "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.cyan.min.css",
        }
        style {
            "{css}"
        }
        AppBody {}
    }
}

#[component]
fn AppBody() -> Element {
    // this will be processed on server before initial page is delivered.
    let config_future = use_server_future(move || async move { api::tip_config().await })?;

    let body = match &*config_future.read() {
        Some(Ok(config)) => {
            dioxus_logger::tracing::info!("tip config: {:#?}", config);
            rsx! {
                LoadedApp {
                    config: config.clone(),
                }
            }
        }
        Some(Err(e)) => rsx! {
            p {
                "An error occurred: {e}"
            }
        },
        _ => rsx! {
            p {
                "Loading..."
            }
        },
    };
    body
}

/// This component holds the main app logic and only runs when data is ready.
#[component]
fn LoadedApp(config: TipConfig) -> Element {
    use_context_provider(|| AppState::new(config.clone()));
    use_context_provider(|| ServerWallet::new(&config));
    use_toaster_provider(config.toast_lifetime());

    let app_state = use_context::<AppState>();
    let recipient = app_state.config.demo_recipient;
    let post_id = app_state.config.demo_post_id;

    rsx! {
        div {
            class: "app-main-container",
            Container {
                header {
                    h1 { style: "margin: 0;", "Posts" }
                }
                Card {
                    h3 { "Post #{post_id}" }
                    p {
                        class: "post-author",
                        "by "
                        code { "{abbreviate(&recipient)}" }
                    }
                    TipUser {
                        address: recipient,
                        post_id,
                    }
                }
            }
            ToastHost {}
        }
    }
}
