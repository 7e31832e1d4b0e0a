use dioxus::prelude::*;

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");

    #[cfg(feature = "server")]
    dioxus_logger::tracing::info!(
        rpc = %std::env::var("ETH_RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8545".into()),
        "starting tip-user desktop"
    );

    dioxus::launch(TipApp);
}

#[component]
fn TipApp() -> Element {
    ui::App()
}
