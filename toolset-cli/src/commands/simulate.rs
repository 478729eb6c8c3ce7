///! Scroll trace replay
///!
///! Feeds each pass of a trace through a layout hub into a refresh coordinator
///! and records what the coordinator did. Deterministic replays run on a manual
///! clock; real-time replays sleep between passes on a tokio `LocalSet`.

use crate::output::{self, format_flag, format_optional_points, format_points, OutputFormat};
use crate::scheduler::TokioScheduler;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tabled::Tabled;
use tokio::task::LocalSet;
use toolset_common::trace::DEFAULT_PASS_INTERVAL_MS;
use toolset_common::{
    frame, Angle, FrameSample, FrameTag, HapticFeedback, HapticStyle, LayoutHub, LayoutObserver,
    LayoutSubscriber, ManualScheduler, RefreshBinding, RefreshConfig, RefreshCoordinator,
    RefreshState, Scheduler, ScrollTrace, ScrollUpdate, StickyElement, TracePass,
};
use tracing::info;

const FRAME: Duration = Duration::from_millis(DEFAULT_PASS_INTERVAL_MS);

/// What the coordinator looked like right after one pass
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PassRow {
    pub pass: usize,
    pub at_ms: u64,
    #[tabled(display_with = "format_points")]
    pub offset: f64,
    pub rotation: Angle,
    #[tabled(display_with = "format_flag")]
    pub ready: bool,
    #[tabled(display_with = "format_flag")]
    pub refreshing: bool,
    #[tabled(display_with = "format_points")]
    pub content_offset: f64,
    #[tabled(display_with = "format_optional_points")]
    pub sticky_offset: Option<f64>,
    #[tabled(display_with = "format_flag")]
    pub triggered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub passes: Vec<PassRow>,
    pub triggers: usize,
    pub actions_run: usize,
    pub haptics: Vec<HapticStyle>,
    pub final_state: RefreshState,
}

/// Records the coordinator's answer to each layout pass
struct ReplayRecorder {
    coordinator: Rc<RefCell<RefreshCoordinator>>,
    last: Option<ScrollUpdate>,
}

impl LayoutSubscriber for ReplayRecorder {
    fn on_layout(&mut self, batch: &[FrameSample]) {
        let update = self.coordinator.borrow_mut().calculate_scroll_position(batch);
        self.last = Some(update);
    }
}

/// Collects haptic triggers instead of vibrating
#[derive(Default)]
struct HapticLog {
    styles: RefCell<Vec<HapticStyle>>,
}

impl HapticFeedback for HapticLog {
    fn vibrate(&self, style: HapticStyle) {
        info!(%style, "Haptic feedback");
        self.styles.borrow_mut().push(style);
    }
}

struct Simulation {
    hub: LayoutHub,
    coordinator: Rc<RefCell<RefreshCoordinator>>,
    recorder: Rc<RefCell<ReplayRecorder>>,
    actions: Rc<Cell<usize>>,
    haptics: Rc<HapticLog>,
    sticky: StickyElement,
    settle: Duration,
}

impl Simulation {
    /// Builds a coordinator whose refresh action simulates `work` and then
    /// clears the binding.
    fn new(config: RefreshConfig, scheduler: Rc<dyn Scheduler>, work: Duration) -> Result<Self> {
        let settle = config.trigger_delay() + work + config.offset_animation();
        let binding = RefreshBinding::default();
        let actions = Rc::new(Cell::new(0));
        let haptics = Rc::new(HapticLog::default());

        let action = {
            let scheduler = scheduler.clone();
            let binding = binding.clone();
            let actions = actions.clone();
            move || {
                actions.set(actions.get() + 1);
                info!(work_ms = work.as_millis() as u64, "Refresh action started");
                let binding = binding.clone();
                scheduler.schedule(work, Box::new(move || binding.finish()));
            }
        };

        let coordinator = RefreshCoordinator::new(config, scheduler, binding, action)?
            .with_haptics(haptics.clone());
        let coordinator = Rc::new(RefCell::new(coordinator));

        let recorder = Rc::new(RefCell::new(ReplayRecorder {
            coordinator: coordinator.clone(),
            last: None,
        }));
        let mut hub = LayoutHub::new();
        hub.subscribe(recorder.clone());

        Ok(Self {
            hub,
            coordinator,
            recorder,
            actions,
            haptics,
            sticky: StickyElement::new(false),
            settle,
        })
    }

    fn step(&mut self, index: usize, at: Duration, pass: &TracePass) -> PassRow {
        let samples = pass.samples();
        for sample in &samples {
            self.hub.report(*sample);
        }
        self.hub.commit_pass();

        let update = self.recorder.borrow_mut().last.take();
        let state = self.coordinator.borrow().state();

        PassRow {
            pass: index,
            at_ms: at.as_millis() as u64,
            offset: update.map(|u| u.offset).unwrap_or_default(),
            rotation: state.rotation_angle,
            ready: state.ready_to_refresh,
            refreshing: state.is_refreshing,
            content_offset: state.content_offset,
            sticky_offset: frame::latest(&samples, FrameTag::Sticky)
                .map(|sample| self.sticky.offset_for(sample)),
            triggered: update.map(|u| u.triggered).unwrap_or(false),
        }
    }

    /// Per-frame poll of the binding between passes
    fn poll(&self) {
        self.coordinator.borrow_mut().poll();
    }

    fn finish(self, passes: Vec<PassRow>) -> SimulationReport {
        self.poll();
        let triggers = passes.iter().filter(|row| row.triggered).count();
        let final_state = self.coordinator.borrow().state();
        let haptics = self.haptics.styles.borrow().clone();
        self.coordinator.borrow_mut().unmount();

        SimulationReport {
            passes,
            triggers,
            actions_run: self.actions.get(),
            haptics,
            final_state,
        }
    }
}

/// Replays `trace` on a manual clock. Passes without a timestamp follow the
/// previous one by one frame.
pub fn replay(trace: &ScrollTrace, config: RefreshConfig, work: Duration) -> Result<SimulationReport> {
    let scheduler = Rc::new(ManualScheduler::new());
    let mut simulation = Simulation::new(config, scheduler.clone(), work)?;

    let mut passes = Vec::with_capacity(trace.passes.len());
    for (index, (pass, at)) in trace.passes.iter().zip(trace.timeline(FRAME)).enumerate() {
        scheduler.advance(at.saturating_sub(scheduler.now()));
        passes.push(simulation.step(index, at, pass));
    }

    // The binding only changes inside scheduled tasks, so polling after each
    // deadline sees every transition without stepping through idle frames.
    let settle_end = scheduler.now() + simulation.settle;
    while let Some(at) = scheduler.next_deadline().filter(|at| *at <= settle_end) {
        scheduler.advance(at.saturating_sub(scheduler.now()));
        simulation.poll();
    }
    scheduler.advance(settle_end.saturating_sub(scheduler.now()));

    Ok(simulation.finish(passes))
}

/// Replays `trace` in wall-clock time
pub async fn replay_realtime(
    trace: &ScrollTrace,
    config: RefreshConfig,
    work: Duration,
    progress: ProgressBar,
) -> Result<SimulationReport> {
    LocalSet::new()
        .run_until(async {
            let scheduler = Rc::new(TokioScheduler::new());
            let mut simulation = Simulation::new(config, scheduler.clone(), work)?;
            let total = trace.passes.len();

            let mut passes = Vec::with_capacity(total);
            for (index, (pass, at)) in trace.passes.iter().zip(trace.timeline(FRAME)).enumerate() {
                let due = scheduler
                    .origin()
                    .checked_add(at)
                    .with_context(|| format!("pass {} is scheduled too far in the future", index))?;
                tokio::time::sleep_until(due).await;
                let row = simulation.step(index, at, pass);
                progress.set_message(format!(
                    "pass {}/{}: offset {:.1}, {}",
                    index + 1,
                    total,
                    row.offset,
                    if row.refreshing { "refreshing" } else { "idle" }
                ));
                passes.push(row);
            }

            progress.set_message("Waiting for the refresh to settle...");
            let deadline = scheduler
                .origin()
                .checked_add(scheduler.now() + simulation.settle)
                .context("refresh work runs too far into the future")?;
            while tokio::time::Instant::now() < deadline {
                tokio::time::sleep(FRAME).await;
                simulation.poll();
            }

            progress.finish_and_clear();
            Ok::<_, anyhow::Error>(simulation.finish(passes))
        })
        .await
}

/// Reads a trace from a `.toml` or `.json` file
pub fn load_trace(path: &Path) -> Result<ScrollTrace> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace {}", path.display()))?;

    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    if is_toml {
        let trace: ScrollTrace = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse trace {}", path.display()))?;
        trace.validate()?;
        Ok(trace)
    } else {
        Ok(ScrollTrace::from_json_str(&contents)?)
    }
}

pub async fn run(
    trace: &ScrollTrace,
    config: RefreshConfig,
    work: Duration,
    realtime: bool,
    format: OutputFormat,
) -> Result<()> {
    let report = if realtime {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        spinner.enable_steady_tick(Duration::from_millis(100));
        replay_realtime(trace, config, work, spinner).await?
    } else {
        replay(trace, config, work)?
    };

    print_report(report, format)
}

fn print_report(report: SimulationReport, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        return output::print_single(&report, format);
    }

    let summary = format!(
        "{} trigger(s), {} refresh action(s) run",
        report.triggers, report.actions_run
    );
    let final_state = report.final_state;
    output::print_table(report.passes);

    if report.triggers == 0 {
        output::print_warning(&summary);
    } else {
        output::print_success(&summary);
    }
    output::print_info(&format!(
        "final state: refreshing={}, ready={}, content offset {:.1}",
        final_state.is_refreshing, final_state.ready_to_refresh, final_state.content_offset
    ));

    Ok(())
}
