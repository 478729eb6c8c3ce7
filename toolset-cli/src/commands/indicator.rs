///! Indicator render parameters for a given pull distance

use crate::output::{self, format_points, OutputFormat};
use anyhow::Result;
use serde::Serialize;
use std::rc::Rc;
use tabled::Tabled;
use toolset_common::{
    IndicatorPose, ManualScheduler, RefreshActivityIndicator, RefreshBinding, RefreshConfig,
    RefreshCoordinator,
};

#[derive(Tabled, Serialize)]
struct IndicatorRow {
    #[tabled(display_with = "format_points")]
    diameter: f64,
    trim: f64,
    #[tabled(display_with = "format_points")]
    line_width: f64,
    tint: String,
    pose: String,
}

impl From<&RefreshActivityIndicator> for IndicatorRow {
    fn from(indicator: &RefreshActivityIndicator) -> Self {
        let pose = match indicator.pose {
            IndicatorPose::Static { angle } => format!("static {}", angle),
            IndicatorPose::Spinning { period } => format!("spinning {}ms", period.as_millis()),
        };

        Self {
            diameter: indicator.diameter,
            trim: indicator.trim,
            line_width: indicator.line_width,
            tint: indicator.tint.clone(),
            pose,
        }
    }
}

/// The indicator a coordinator would render at `offset`
pub fn indicator_at(
    config: RefreshConfig,
    offset: f64,
    refreshing: bool,
) -> Result<RefreshActivityIndicator> {
    let coordinator = RefreshCoordinator::new(
        config,
        Rc::new(ManualScheduler::new()),
        RefreshBinding::new(refreshing),
        || {},
    )?;
    let config = coordinator.config();

    Ok(RefreshActivityIndicator::new(
        config.threshold,
        config.tint.clone(),
        coordinator.is_refreshing(),
        coordinator.rotation_for(offset),
        config.indicator_period(),
    ))
}

pub fn run(config: RefreshConfig, offset: f64, refreshing: bool, format: OutputFormat) -> Result<()> {
    let indicator = indicator_at(config, offset, refreshing)?;

    match format {
        OutputFormat::Table => output::print_table(vec![IndicatorRow::from(&indicator)]),
        _ => output::print_single(&indicator, format)?,
    }

    Ok(())
}
