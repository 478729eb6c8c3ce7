//! Scroll container with pull-to-refresh
//!
//! After every render the container and the content are measured and reported
//! to a layout hub as one pass. The coordinator subscribed to the hub decides
//! when to refresh; this component only turns touches into a drag offset and
//! re-renders while the coordinator's state is still moving.
//!
//! The refreshing flag is shared with the parent in both directions: the
//! component reports the coordinator's writes through `on_refreshing_change`,
//! and the parent's `is_refreshing` prop is written back into the binding.

use gloo_timers::callback::Timeout;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use toolset_common::refresh::config::{DEFAULT_THRESHOLD, DEFAULT_TINT};
use toolset_common::{
    FrameSample, FrameTag, HapticStyle, LayoutHub, LayoutObserver, Rect, RefreshBinding,
    RefreshConfig, RefreshCoordinator, RefreshState,
};
use tracing::{debug, warn};
use web_sys::{Element, TouchEvent};
use yew::prelude::*;

use super::RefreshActivityIndicator;
use crate::platform::{GlooScheduler, WebVibration};

const FRAME_MS: u32 = 16;

#[derive(Properties, PartialEq)]
pub struct RefreshableScrollViewProps {
    #[prop_or_default]
    pub children: Children,
    /// Runs after the trigger delay. The parent owns the refresh work.
    pub on_refresh: Callback<()>,
    /// Bound refreshing flag. The parent mirrors it from
    /// `on_refreshing_change` and clears it when the work is done.
    pub is_refreshing: bool,
    /// Emitted whenever the coordinator changes the refreshing flag
    #[prop_or_default]
    pub on_refreshing_change: Callback<bool>,
    #[prop_or(DEFAULT_THRESHOLD)]
    pub threshold: f64,
    #[prop_or(AttrValue::from(DEFAULT_TINT))]
    pub tint: AttrValue,
    #[prop_or_default]
    pub haptic: Option<HapticStyle>,
}

struct ScrollHost {
    hub: RefCell<LayoutHub>,
    coordinator: Rc<RefCell<RefreshCoordinator>>,
    parent_flag: ParentFlag,
}

impl ScrollHost {
    fn new(
        config: RefreshConfig,
        is_refreshing: bool,
        on_refresh: Rc<RefCell<Callback<()>>>,
    ) -> toolset_common::Result<Self> {
        let coordinator = RefreshCoordinator::new(
            config,
            Rc::new(GlooScheduler::new()),
            RefreshBinding::new(is_refreshing),
            move || on_refresh.borrow().emit(()),
        )?
        .with_haptics(Rc::new(WebVibration));
        let coordinator = Rc::new(RefCell::new(coordinator));

        let mut hub = LayoutHub::new();
        let subscription = hub.subscribe(coordinator.clone());
        debug!(%subscription, "Refresh coordinator mounted");

        Ok(Self {
            hub: RefCell::new(hub),
            coordinator,
            parent_flag: ParentFlag::new(is_refreshing),
        })
    }

    /// Reports the current geometry as one layout pass
    fn layout_pass(&self, container: &NodeRef, content: &NodeRef) {
        let mut hub = self.hub.borrow_mut();
        if let Some(rect) = measure(container) {
            hub.report(FrameSample::new(FrameTag::Fixed, rect));
        }
        if let Some(rect) = measure(content) {
            hub.report(FrameSample::new(FrameTag::Moving, rect));
        }
        hub.commit_pass();
    }
}

/// The refreshing value the parent last saw
struct ParentFlag {
    reported: Cell<bool>,
}

impl ParentFlag {
    fn new(initial: bool) -> Self {
        Self {
            reported: Cell::new(initial),
        }
    }

    /// Applies a value the parent wrote through its prop
    fn write(&self, coordinator: &RefreshCoordinator, value: bool) {
        self.reported.set(value);
        coordinator.binding().set(value);
    }

    /// Polls the binding and returns the flag if the parent has not seen it yet
    fn sync(&self, coordinator: &mut RefreshCoordinator) -> Option<bool> {
        coordinator.poll();
        let refreshing = coordinator.is_refreshing();
        (self.reported.replace(refreshing) != refreshing).then_some(refreshing)
    }
}

fn measure(node: &NodeRef) -> Option<Rect> {
    let Some(element) = node.cast::<Element>() else {
        debug!("Skipping measurement of a detached node");
        return None;
    };
    let bounds = element.get_bounding_client_rect();
    Some(Rect::new(
        bounds.left(),
        bounds.top(),
        bounds.width(),
        bounds.height(),
    ))
}

/// How far the content follows a finger that moved from `start` to `current`
fn drag_distance(start: f64, current: f64, limit: f64) -> f64 {
    (current - start).max(0.0).min(limit)
}

#[function_component(RefreshableScrollView)]
pub fn refreshable_scroll_view(props: &RefreshableScrollViewProps) -> Html {
    let container_ref = use_node_ref();
    let content_ref = use_node_ref();
    let drag = use_state(|| 0.0_f64);
    let touch_start = use_mut_ref(|| None::<f64>);
    let rendered_state = use_mut_ref(|| None::<RefreshState>);
    let frame_timer = use_mut_ref(|| None::<Timeout>);
    let force_update = use_force_update();

    let on_refresh = use_mut_ref(|| props.on_refresh.clone());
    *on_refresh.borrow_mut() = props.on_refresh.clone();

    let config = RefreshConfig {
        threshold: props.threshold,
        tint: props.tint.to_string(),
        haptic: props.haptic,
        ..RefreshConfig::default()
    };

    let host = {
        let on_refresh = on_refresh.clone();
        let is_refreshing = props.is_refreshing;
        use_memo(config.clone(), move |config| {
            match ScrollHost::new(config.clone(), is_refreshing, on_refresh) {
                Ok(host) => Some(host),
                Err(e) => {
                    warn!(error = %e, "Pull to refresh disabled");
                    None
                }
            }
        })
    };

    {
        let host = host.clone();
        use_effect_with(config, move |_| {
            move || {
                if let Some(host) = &*host {
                    host.coordinator.borrow_mut().unmount();
                }
            }
        });
    }

    {
        let host = host.clone();
        use_effect_with(props.is_refreshing, move |refreshing| {
            if let Some(host) = &*host {
                host.parent_flag.write(&host.coordinator.borrow(), *refreshing);
            }
        });
    }

    {
        let host = host.clone();
        let container_ref = container_ref.clone();
        let content_ref = content_ref.clone();
        let rendered_state = rendered_state.clone();
        let frame_timer = frame_timer.clone();
        let force_update = force_update.clone();
        let on_refreshing_change = props.on_refreshing_change.clone();
        use_effect(move || {
            if let Some(host) = &*host {
                host.layout_pass(&container_ref, &content_ref);

                let change = host.parent_flag.sync(&mut host.coordinator.borrow_mut());
                if let Some(refreshing) = change {
                    debug!(refreshing, "Reporting refreshing change to parent");
                    on_refreshing_change.emit(refreshing);
                }

                let coordinator = host.coordinator.borrow();
                let stale = *rendered_state.borrow() != Some(coordinator.state());
                if stale || coordinator.is_animating() {
                    let timer = Timeout::new(FRAME_MS, move || force_update.force_update());
                    *frame_timer.borrow_mut() = Some(timer);
                }
            }
        });
    }

    let on_touch_start = {
        let container_ref = container_ref.clone();
        let touch_start = touch_start.clone();
        Callback::from(move |e: TouchEvent| {
            let at_top = container_ref
                .cast::<Element>()
                .map(|element| element.scroll_top() <= 0)
                .unwrap_or(false);
            *touch_start.borrow_mut() = e
                .touches()
                .get(0)
                .filter(|_| at_top)
                .map(|touch| touch.client_y() as f64);
        })
    };

    let on_touch_move = {
        let drag = drag.clone();
        let touch_start = touch_start.clone();
        let limit = props.threshold * 2.0;
        Callback::from(move |e: TouchEvent| {
            let Some(start) = *touch_start.borrow() else {
                return;
            };
            if let Some(touch) = e.touches().get(0) {
                drag.set(drag_distance(start, touch.client_y() as f64, limit));
            }
        })
    };

    let on_touch_end = {
        let drag = drag.clone();
        let touch_start = touch_start.clone();
        Callback::from(move |_: TouchEvent| {
            *touch_start.borrow_mut() = None;
            drag.set(0.0);
        })
    };

    let on_scroll = {
        let force_update = force_update.clone();
        Callback::from(move |_: Event| force_update.force_update())
    };

    let (content_offset, indicator) = match &*host {
        Some(host) => {
            let coordinator = host.coordinator.borrow();
            let state = coordinator.state();
            *rendered_state.borrow_mut() = Some(state);
            (state.content_offset, Some(coordinator.indicator()))
        }
        None => (0.0, None),
    };

    let pull = *drag + content_offset;
    let slot_style = format!(
        "position: absolute; top: 0; left: 0; right: 0; height: {pull}px; \
         display: flex; align-items: center; justify-content: center; overflow: hidden;"
    );
    let content_style = format!("transform: translateY({pull}px);");

    html! {
        <div
            class="refreshable-scroll-view"
            style="position: relative; overflow-y: auto; height: 100%;"
            ref={container_ref}
            onscroll={on_scroll}
            ontouchstart={on_touch_start}
            ontouchmove={on_touch_move}
            ontouchend={on_touch_end}
        >
            {match indicator {
                Some(indicator) if pull > 0.0 => html! {
                    <div class="refresh-indicator-slot" style={slot_style}>
                        <RefreshActivityIndicator {indicator} />
                    </div>
                },
                _ => html! {},
            }}

            <div class="refreshable-content" style={content_style} ref={content_ref}>
                {props.children.clone()}
            </div>
        </div>
    }
}
