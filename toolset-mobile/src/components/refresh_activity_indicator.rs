//! Partial ring shown above pulled content

use std::f64::consts::PI;
use toolset_common::{IndicatorPose, RefreshActivityIndicator as Indicator};
use yew::prelude::*;

/// Keyframes used by the spinning pose
pub const SPIN_KEYFRAMES: &str =
    "@keyframes toolset-refresh-spin { from { transform: rotate(0deg); } to { transform: rotate(360deg); } }";

#[derive(Properties, PartialEq)]
pub struct RefreshActivityIndicatorProps {
    pub indicator: Indicator,
}

#[function_component(RefreshActivityIndicator)]
pub fn refresh_activity_indicator(props: &RefreshActivityIndicatorProps) -> Html {
    let indicator = &props.indicator;
    let size = indicator.diameter;
    let radius = ((size - indicator.line_width) / 2.0).max(0.0);
    let circumference = 2.0 * PI * radius;

    let motion = match indicator.pose {
        IndicatorPose::Static { angle } => {
            format!("transform: rotate({}deg);", angle.as_degrees())
        }
        IndicatorPose::Spinning { period } => format!(
            "animation: toolset-refresh-spin {}ms linear infinite;",
            period.as_millis()
        ),
    };
    let style = format!("width: {size}px; height: {size}px; {motion}");

    html! {
        <div class="refresh-indicator" style={style}>
            <style>{SPIN_KEYFRAMES}</style>
            <svg
                width={size.to_string()}
                height={size.to_string()}
                viewBox={format!("0 0 {size} {size}")}
            >
                <circle
                    cx={(size / 2.0).to_string()}
                    cy={(size / 2.0).to_string()}
                    r={radius.to_string()}
                    fill="none"
                    stroke={indicator.tint.clone()}
                    stroke-width={indicator.line_width.to_string()}
                    stroke-linecap="round"
                    stroke-dasharray={format!("{} {}", circumference * indicator.trim, circumference)}
                />
            </svg>
        </div>
    }
}
