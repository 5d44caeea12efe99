use streamy_live_yew::App;

fn main() {
    // Initialize tracing for WASM
    tracing_wasm::set_as_global_default();

    tracing::info!("Starting Streamy live room");

    yew::Renderer::<App>::new().render();
}
