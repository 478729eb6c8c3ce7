//! Toolset Mobile UI
//!
//! Touch-driven pull-to-refresh for Yew applications. The components measure
//! the DOM after each render and hand the geometry to the shared refresh
//! coordinator, which runs on the browser event loop through gloo timers.

pub mod components;
pub mod platform;

use gloo_timers::callback::Timeout;
use toolset_common::HapticStyle;
use yew::prelude::*;

pub use components::{RefreshActivityIndicator, RefreshableScrollView};
pub use platform::{GlooScheduler, WebVibration};

/// Simulated duration of the demo's refresh work
const DEMO_WORK_MS: u32 = 1500;

/// Demo application: a list that gains an entry on every refresh
#[function_component(App)]
pub fn app() -> Html {
    let items = use_state(|| vec!["Item 2".to_string(), "Item 1".to_string()]);
    let refreshing = use_state(|| false);
    let work = use_mut_ref(|| None::<Timeout>);

    let on_refresh = {
        let items = items.clone();
        let refreshing = refreshing.clone();
        Callback::from(move |_: ()| {
            let items = items.clone();
            let refreshing = refreshing.clone();
            *work.borrow_mut() = Some(Timeout::new(DEMO_WORK_MS, move || {
                let mut next = (*items).clone();
                next.insert(0, format!("Item {}", next.len() + 1));
                items.set(next);
                refreshing.set(false);
            }));
        })
    };

    let on_refreshing_change = {
        let refreshing = refreshing.clone();
        Callback::from(move |value: bool| refreshing.set(value))
    };

    html! {
        <div class="mobile-app" style="height: 100vh;">
            <RefreshableScrollView
                on_refresh={on_refresh}
                is_refreshing={*refreshing}
                on_refreshing_change={on_refreshing_change}
                haptic={Some(HapticStyle::Medium)}
            >
                <ul class="item-list">
                    {for items.iter().map(|item| html! { <li class="item">{item}</li> })}
                </ul>
            </RefreshableScrollView>
        </div>
    }
}

/// Entry point for WASM
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_app() {
    yew::Renderer::<App>::new().render();
}
