//! Terminal progress bar fed from the controller's progress channel

use crate::fetcher::Progress;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A progress bar redrawn whenever the controller publishes a new snapshot
pub struct ProgressDisplay {
    bar: ProgressBar,
    progress: watch::Receiver<Progress>,
    task: JoinHandle<()>,
}

impl ProgressDisplay {
    /// Starts rendering snapshots from `progress` against a bar of `total` ids
    pub fn spawn(progress: watch::Receiver<Progress>, total: u64) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "[{bar:50}] {percent:>3}% | {msg} | {elapsed_precise} (eta {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░");
        bar.set_style(style);

        let task = {
            let bar = bar.clone();
            let mut rx = progress.clone();
            tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let snapshot = rx.borrow_and_update().clone();
                    render(&bar, &snapshot);
                }
            })
        };

        Self {
            bar,
            progress,
            task,
        }
    }

    /// Stops rendering and leaves the last snapshot on screen
    pub fn finish(self) {
        self.task.abort();
        let snapshot = self.progress.borrow().clone();
        render(&self.bar, &snapshot);
        self.bar.abandon();
    }
}

fn render(bar: &ProgressBar, snapshot: &Progress) {
    bar.set_position(snapshot.completed);
    match snapshot.current_id {
        Some(id) => bar.set_message(format!(
            "ID: {} | ✓ {} | ✗ {}",
            id, snapshot.successful, snapshot.failed
        )),
        None => bar.set_message(format!("✓ {} | ✗ {}", snapshot.successful, snapshot.failed)),
    }
}
