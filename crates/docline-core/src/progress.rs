//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: one indicatif bar per chunk, cleared when the chunk is written.
//! Non-TTY mode: hidden bars; per-chunk log lines are the only progress signal.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Per-chunk bar: items transformed so far
fn chunk_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:<12.dim} {bar:30.green/dim} {pos:>6}/{len:6} {eta:>4} {wide_msg:.dim}")
        .expect("invalid template")
        .progress_chars("--")
}

/// Central progress context owning the `MultiProgress`.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY on stderr.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: std::io::stderr().is_terminal(),
        }
    }

    /// Context that never draws, for tests and library callers.
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: false,
        }
    }

    /// Bar tracking `len` items of one chunk. Hidden when not a TTY.
    pub fn chunk_bar(&self, label: &str, len: usize) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(len as u64));
        pb.set_style(chunk_style());
        pb.set_prefix(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(200));
        pb
    }

    /// Print a line above managed progress bars.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.is_tty {
            let _ = self.multi.println(msg);
        } else {
            eprintln!("{}", msg.as_ref());
        }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// `MultiProgress` for the log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for `ProgressContext`.
pub type SharedProgress = Arc<ProgressContext>;

/// Format a count with thousands separators.
pub fn fmt_num(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact wall-clock duration: `850ms`, `12.3s`, `4m 05s`, `2h 03m`.
pub fn fmt_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    if secs == 0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    }
}
