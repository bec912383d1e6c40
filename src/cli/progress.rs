//! CLI-specific progress handling for transit-graph

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Creates a progress bar counting processed items
pub fn create_progress_bar(total: u64, unit: &str) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
    let template = format!(
        "{{spinner:.green}} [{{elapsed_precise}}] [{{wide_bar:.cyan/blue}}] {{pos}}/{{len}} {unit} ({{percent}}%) ETA: {{eta}}"
    );
    let style = ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Progress bar for a long loop, hidden when not wanted
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    pub fn new(total: u64, unit: &str, message: &str, visible: bool) -> Self {
        let pb = if visible {
            eprintln!("{message}");
            create_progress_bar(total, unit)
        } else {
            ProgressBar::hidden()
        };
        Self { pb }
    }

    /// Callback reporting the number of items done so far
    pub fn tracker(&self) -> impl FnMut(usize) + '_ {
        move |done| self.pb.set_position(done as u64)
    }

    pub fn finish(&self, message: &str) {
        self.pb.finish_and_clear();
        if !self.pb.is_hidden() {
            eprintln!("{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_progress_bar_template() {
        let pb = create_progress_bar(1000, "stops");
        assert_eq!(pb.length().unwrap(), 1000);
        pb.set_position(100);
        pb.finish();
    }

    #[test]
    fn test_tracker_moves_bar() {
        let manager = ProgressManager::new(10, "stops", "Auditing", true);
        let mut track = manager.tracker();
        track(4);
        assert_eq!(manager.pb.position(), 4);
    }

    #[test]
    fn test_hidden_manager() {
        let manager = ProgressManager::new(10, "stops", "Auditing", false);
        assert!(manager.pb.is_hidden());
    }
}
