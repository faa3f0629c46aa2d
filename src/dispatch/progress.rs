//! Progress reporting for a running sweep.

use std::io::Write;

use tracing::info;

/// Receives `completed / total` updates from the dispatcher's driver thread.
pub trait Progress {
    fn start(&mut self, _total: usize) {}

    fn advance(&mut self, completed: usize, total: usize);

    fn finish(&mut self) {}
}

/// Discards all updates.
#[derive(Debug, Default)]
pub struct Silent;

impl Progress for Silent {
    fn advance(&mut self, _completed: usize, _total: usize) {}
}

/// Single refreshed status line on stderr, plus an `info` event every 10%.
///
/// The status line is closed with a newline before each `info` event so log
/// output never lands on the end of a half-drawn line.
#[derive(Debug)]
pub struct StderrProgress {
    label: String,
    last_decile: usize,
    line_open: bool,
}

impl StderrProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            last_decile: 0,
            line_open: false,
        }
    }

    fn draw<W: Write>(&mut self, out: &mut W, completed: usize, total: usize) {
        let pct = if total == 0 { 100 } else { completed * 100 / total };
        let _ = write!(out, "\r{}: {completed}/{total} ({pct}%)", self.label);
        self.line_open = true;

        let decile = pct / 10;
        if decile > self.last_decile {
            self.last_decile = decile;
            let _ = writeln!(out);
            self.line_open = false;
            let _ = out.flush();
            info!("{}: {completed}/{total} points done", self.label);
        } else {
            let _ = out.flush();
        }
    }

    fn close<W: Write>(&mut self, out: &mut W) {
        if self.line_open {
            let _ = writeln!(out);
            self.line_open = false;
        }
    }
}

impl Progress for StderrProgress {
    fn start(&mut self, total: usize) {
        self.last_decile = 0;
        self.draw(&mut std::io::stderr(), 0, total);
    }

    fn advance(&mut self, completed: usize, total: usize) {
        self.draw(&mut std::io::stderr(), completed, total);
    }

    fn finish(&mut self) {
        self.close(&mut std::io::stderr());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_is_closed_before_each_decile_event() {
        let mut bar = StderrProgress::new("demo");
        let mut out = Vec::new();
        bar.draw(&mut out, 0, 20);
        bar.draw(&mut out, 1, 20);
        bar.draw(&mut out, 2, 20);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\rdemo: 0/20 (0%)\rdemo: 1/20 (5%)\rdemo: 2/20 (10%)\n");
        assert!(!bar.line_open);
    }

    #[test]
    fn finish_adds_no_blank_line_after_full_decile() {
        let mut bar = StderrProgress::new("demo");
        let mut out = Vec::new();
        bar.draw(&mut out, 3, 3);
        bar.close(&mut out);
        assert_eq!(String::from_utf8(out).unwrap(), "\rdemo: 3/3 (100%)\n");

        let mut bar = StderrProgress::new("demo");
        let mut out = Vec::new();
        bar.draw(&mut out, 0, 3);
        bar.close(&mut out);
        assert_eq!(String::from_utf8(out).unwrap(), "\rdemo: 0/3 (0%)\n");
    }
}
