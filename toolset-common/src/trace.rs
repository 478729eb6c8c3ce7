//! Recorded or synthetic sequences of layout passes
//!
//! A trace lists, pass by pass, where the fixed container and the moving
//! content were measured. Replaying it through a coordinator reproduces a pull
//! gesture without a rendering host.

use crate::frame::FrameSample;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Interval used between passes that carry no timestamp
pub const DEFAULT_PASS_INTERVAL_MS: u64 = 16;

/// One layout pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePass {
    /// Time of the pass since the start of the trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_ms: Option<u64>,
    pub moving_y: f64,
    #[serde(default)]
    pub fixed_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky_y: Option<f64>,
}

impl TracePass {
    pub fn new(moving_y: f64, fixed_y: f64) -> Self {
        Self {
            at_ms: None,
            moving_y,
            fixed_y,
            sticky_y: None,
        }
    }

    pub fn samples(&self) -> Vec<FrameSample> {
        let mut samples = vec![
            FrameSample::fixed(self.fixed_y),
            FrameSample::moving(self.moving_y),
        ];
        if let Some(y) = self.sticky_y {
            samples.push(FrameSample::sticky(y));
        }
        samples
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollTrace {
    #[serde(default)]
    pub passes: Vec<TracePass>,
}

impl ScrollTrace {
    pub fn from_json_str(input: &str) -> Result<Self> {
        let trace: ScrollTrace =
            serde_json::from_str(input).map_err(|e| Error::InvalidTrace(e.to_string()))?;
        trace.validate()?;
        Ok(trace)
    }

    /// Pull from rest down to `distance` in `steps` passes, then release back
    /// to rest in as many passes.
    pub fn synthetic_pull(distance: f64, steps: usize, interval_ms: u64) -> Result<Self> {
        if steps == 0 {
            return Err(Error::InvalidTrace("steps must be at least 1".to_string()));
        }
        if !distance.is_finite() {
            return Err(Error::InvalidTrace(format!(
                "pull distance must be finite, got {}",
                distance
            )));
        }

        let last_at_ms = (steps as u64)
            .checked_mul(2)
            .and_then(|passes| passes.checked_mul(interval_ms));
        if last_at_ms.is_none() {
            return Err(Error::InvalidTrace(format!(
                "{} steps at {} ms apart overflow the trace timeline",
                steps, interval_ms
            )));
        }

        let pull = (0..=steps).map(|i| distance * i as f64 / steps as f64);
        let release = (0..steps).rev().map(|i| distance * i as f64 / steps as f64);

        let passes = pull
            .chain(release)
            .enumerate()
            .map(|(i, y)| TracePass {
                at_ms: Some(i as u64 * interval_ms),
                ..TracePass::new(y, 0.0)
            })
            .collect();

        Ok(Self { passes })
    }

    pub fn validate(&self) -> Result<()> {
        if self.passes.is_empty() {
            return Err(Error::InvalidTrace("trace has no passes".to_string()));
        }

        let mut last_at = 0;
        for (index, pass) in self.passes.iter().enumerate() {
            let coordinates = [Some(pass.moving_y), Some(pass.fixed_y), pass.sticky_y];
            if coordinates.iter().flatten().any(|value| !value.is_finite()) {
                return Err(Error::InvalidTrace(format!(
                    "pass {} has a non-finite coordinate",
                    index
                )));
            }
            if let Some(at) = pass.at_ms {
                if at < last_at {
                    return Err(Error::InvalidTrace(format!(
                        "pass {} is timestamped before the previous pass ({} < {})",
                        index, at, last_at
                    )));
                }
                last_at = at;
            }
        }

        Ok(())
    }

    /// Pass times, filling missing timestamps with `interval` after the
    /// previous pass.
    pub fn timeline(&self, interval: Duration) -> Vec<Duration> {
        let mut previous: Option<Duration> = None;
        self.passes
            .iter()
            .map(|pass| {
                let at = match (pass.at_ms, previous) {
                    (Some(at), _) => Duration::from_millis(at),
                    (None, Some(prev)) => prev + interval,
                    (None, None) => Duration::ZERO,
                };
                previous = Some(at);
                at
            })
            .collect()
    }
}
