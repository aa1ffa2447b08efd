//! Progress reporting for engine runs
//!
//! Everything goes to stderr so `-o json` keeps stdout machine-readable.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use stepwise_application::ExecutionProgress;
use stepwise_domain::{PlanStep, StepOutcome, StepResult, ValidatedPlan, util::preview};

/// Reports progress with a spinner around the language model calls and one
/// line per executed step
///
/// With streaming enabled the answer is echoed as it is written instead of
/// behind the spinner.
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    stream_answer: bool,
    streamed: AtomicBool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            stream_answer: false,
            streamed: AtomicBool::new(false),
        }
    }

    /// Echo answer chunks to stderr while the answer is written
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.stream_answer = enabled;
        self
    }

    /// Whether any part of the answer has been echoed
    pub fn streamed_answer(&self) -> bool {
        self.streamed.load(Ordering::SeqCst)
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start_spinner(&self, message: &'static str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.spinner.lock()
            && let Some(previous) = slot.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }

    /// Clear any spinner left running by an aborted run
    pub fn finish(&self) {
        self.stop_spinner();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

fn plan_lines(plan: &ValidatedPlan) -> String {
    let mut out = format!(
        "{} {}",
        "Plan:".cyan().bold(),
        match plan.steps().len() {
            1 => "1 step".to_string(),
            n => format!("{} steps", n),
        }
    );
    for (i, step) in plan.steps().iter().enumerate() {
        out.push_str(&format!(
            "\n  {}. {} {}",
            i + 1,
            step.step_name,
            format!("[{}]", step.tool_name).dimmed()
        ));
    }
    out
}

fn step_start_line(index: usize, total: usize, step: &PlanStep) -> String {
    format!(
        "{} {} {}",
        format!("[{}/{}]", index, total).cyan(),
        step.step_name.bold(),
        format!("({})", step.tool_name).dimmed()
    )
}

fn step_complete_line(result: &StepResult) -> String {
    let elapsed = format!("{}ms", result.duration.as_millis());
    match &result.outcome {
        StepOutcome::Succeeded { result } => format!(
            "  {} {} {}",
            "✓".green(),
            preview(result, 80),
            elapsed.dimmed()
        ),
        StepOutcome::Failed { error } => format!(
            "  {} {} {}",
            "✗".red(),
            error.to_string().red(),
            elapsed.dimmed()
        ),
        StepOutcome::Skipped => format!("  {} {}", "-".dimmed(), "skipped".dimmed()),
    }
}

impl ExecutionProgress for ProgressReporter {
    fn on_planning_start(&self, _goal: &str) {
        self.start_spinner("Planning...");
    }

    fn on_plan_ready(&self, plan: &ValidatedPlan) {
        self.stop_spinner();
        eprintln!("{}\n", plan_lines(plan));
    }

    fn on_fallback_plan(&self, reason: &str) {
        self.stop_spinner();
        eprintln!("{} {}, using the default plan", "!".yellow().bold(), reason);
    }

    fn on_step_start(&self, index: usize, total: usize, step: &PlanStep) {
        eprintln!("{}", step_start_line(index, total, step));
    }

    fn on_step_complete(&self, _index: usize, _total: usize, result: &StepResult) {
        eprintln!("{}", step_complete_line(result));
    }

    fn on_steps_skipped(&self, count: usize) {
        eprintln!(
            "{} cancelled, {} remaining step(s) skipped",
            "!".yellow().bold(),
            count
        );
    }

    fn on_synthesis_start(&self) {
        eprintln!();
        self.streamed.store(false, Ordering::SeqCst);
        self.start_spinner("Writing answer...");
    }

    fn on_synthesis_chunk(&self, chunk: &str) {
        if !self.stream_answer {
            return;
        }
        if !self.streamed.swap(true, Ordering::SeqCst) {
            self.stop_spinner();
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{}", chunk);
        let _ = stderr.flush();
    }

    fn on_synthesis_complete(&self, success: bool) {
        self.stop_spinner();
        if self.streamed_answer() {
            eprintln!();
        }
        if !success {
            eprintln!("{} answer could not be written", "✗".red());
        }
    }
}
