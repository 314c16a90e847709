//! Indicateur d'avancement sur stderr

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Ligne `label: 42% | 21/50 [12.3s]` réécrite à chaque complétion
#[derive(Debug)]
pub struct Progress {
    label: &'static str,
    total: usize,
    done: usize,
    enabled: bool,
    started: Instant,
}

impl Progress {
    pub fn new(label: &'static str, total: usize, enabled: bool) -> Self {
        Self {
            label,
            total,
            done: 0,
            enabled,
            started: Instant::now(),
        }
    }

    pub fn advance(&mut self) {
        self.done += 1;
        if self.enabled {
            self.draw();
        }
    }

    /// Termine la ligne courante avant un autre affichage
    pub fn suspend(&self) {
        if self.enabled && self.done > 0 {
            eprintln!();
        }
    }

    pub fn finish(&self) {
        if self.enabled && self.total > 0 {
            eprintln!();
        }
    }

    pub fn line(&self) -> String {
        render(self.label, self.done, self.total, self.started.elapsed())
    }

    fn draw(&self) {
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r{}", self.line());
        let _ = stderr.flush();
    }
}

fn render(label: &str, done: usize, total: usize, elapsed: Duration) -> String {
    let percent = if total == 0 { 100 } else { done * 100 / total };
    format!(
        "{}: {:>3}% | {}/{} [{:.1}s]",
        label,
        percent,
        done,
        total,
        elapsed.as_secs_f64()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(
            render("Clipping", 21, 50, Duration::from_millis(12_340)),
            "Clipping:  42% | 21/50 [12.3s]"
        );
        assert_eq!(render("Clipping", 0, 0, Duration::ZERO), "Clipping: 100% | 0/0 [0.0s]");
    }

    #[test]
    fn test_advance_counts_when_disabled() {
        let mut progress = Progress::new("Clipping", 3, false);
        progress.advance();
        progress.advance();
        assert!(progress.line().starts_with("Clipping:  66% | 2/3"));
    }
}
