//! Terminal progress sessions.
//!
//! A session owns one background thread that repaints an indicatif spinner
//! line with the elapsed seconds. The only state shared with that thread is
//! an atomic stop flag and the start instant. The thread is always joined
//! before the final line is written, including when the session is dropped
//! without being finished.

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize as _;

use crate::application::ports::{
    ProgressIndicator, ProgressLabels, ProgressSession, SessionOutcome,
};
use crate::output::Styles;

/// Repaint period of the spinner line.
pub const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

const TICK_STRINGS: &[&str] = &[
    "⠁", "⠂", "⠄", "⡀", "⡈", "⡐", "⡠", "⣀", "⣁", "⣂", "⣄", "⣌", "⣔", "⣤", "⣥", "⣦", "⣮", "⣶",
    "⣷", "⣿", "⡿", "⠿", "⢟", "⠟", "⡛", "⠛", "⠫", "⢋", "⠋", "⠍", "⡉", "⠉", "⠑", "⠡", "⢁",
];

/// Create a spinner for indeterminate progress.
///
/// # Panics
///
/// Panics if the spinner template string is invalid (it is a compile-time constant and will not panic).
#[must_use]
pub fn spinner(target: ProgressDrawTarget) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, target);
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(TICK_STRINGS)
            .template("  {spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb
}

/// Starts spinner sessions on the terminal.
pub struct TerminalProgress {
    styles: Styles,
    show: bool,
    quiet: bool,
}

impl TerminalProgress {
    /// `show` enables drawing; `quiet` suppresses the success line.
    #[must_use]
    pub fn new(styles: Styles, show: bool, quiet: bool) -> Self {
        Self {
            styles,
            show,
            quiet,
        }
    }
}

impl ProgressIndicator for TerminalProgress {
    type Session = SpinnerSession;

    fn begin(&self, labels: ProgressLabels) -> SpinnerSession {
        let target = if self.show {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        };
        SpinnerSession::start(spinner(target), labels, self.styles.clone(), self.quiet)
    }
}

/// One running spinner line.
pub struct SpinnerSession {
    bar: ProgressBar,
    labels: ProgressLabels,
    styles: Styles,
    quiet: bool,
    started: Instant,
    stop: Arc<AtomicBool>,
    repaint: Option<JoinHandle<()>>,
}

impl SpinnerSession {
    fn start(bar: ProgressBar, labels: ProgressLabels, styles: Styles, quiet: bool) -> Self {
        let started = Instant::now();
        let stop = Arc::new(AtomicBool::new(false));

        let repaint = {
            let bar = bar.clone();
            let stop = Arc::clone(&stop);
            let text = format!("{:<width$}", labels.text, width = labels.width());
            let max_secs = labels.max_secs;
            std::thread::spawn(move || {
                while !stop.load(Ordering::Acquire) {
                    let secs = started.elapsed().as_secs();
                    bar.set_message(format!("{text} {}", format_elapsed(secs, max_secs)));
                    bar.tick();
                    std::thread::park_timeout(REPAINT_INTERVAL);
                }
            })
        };

        Self {
            bar,
            labels,
            styles,
            quiet,
            started,
            stop,
            repaint: Some(repaint),
        }
    }

    /// Stop and join the repaint thread, then write the final line.
    /// Idempotent: only the first call has an effect.
    fn close(&mut self, outcome: SessionOutcome) {
        let Some(repaint) = self.repaint.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        repaint.thread().unpark();
        if repaint.join().is_err() {
            tracing::warn!("progress repaint thread panicked");
        }
        self.bar.finish_and_clear();

        let line = final_line(outcome, &self.labels, self.started.elapsed(), &self.styles);
        match outcome {
            SessionOutcome::Succeeded if !self.quiet => println!("  {line}"),
            SessionOutcome::Succeeded => {}
            SessionOutcome::Failed | SessionOutcome::Cancelled => eprintln!("  {line}"),
        }
    }
}

impl ProgressSession for SpinnerSession {
    fn finish(mut self, outcome: SessionOutcome) {
        self.close(outcome);
    }
}

impl Drop for SpinnerSession {
    fn drop(&mut self) {
        self.close(SessionOutcome::Failed);
    }
}

/// Elapsed seconds, right-aligned to the width of `max_secs`.
#[must_use]
pub fn format_elapsed(secs: u64, max_secs: Option<u64>) -> String {
    let width = max_secs.map_or(0, |m| m.to_string().len());
    format!("{secs:>width$}s")
}

/// Final line written for a session outcome.
#[must_use]
pub fn final_line(
    outcome: SessionOutcome,
    labels: &ProgressLabels,
    elapsed: Duration,
    styles: &Styles,
) -> String {
    match outcome {
        SessionOutcome::Succeeded => format!(
            "{} {} ({}s)",
            "✓".style(styles.success),
            labels.done,
            elapsed.as_secs()
        ),
        SessionOutcome::Failed => format!("{} {}", "✗".style(styles.error), labels.fail),
        SessionOutcome::Cancelled => format!(
            "{} Cancelled: {}",
            "⚠".style(styles.warning),
            labels.text
        ),
    }
}
