//! Watch mode for incremental updates on file changes
//!
//! After the initial build, every changed file under the mod folder is
//! transformed again on its own. Nothing else in the output is touched and a
//! failing file never stops the loop.

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};

use crate::build::{BuildPipeline, ChangeOutcome};
use crate::config::schema::WatchConfig;

/// Error during watch mode
#[derive(Debug)]
pub enum WatchError {
    /// Failed to initialize file watcher
    WatcherInit(notify::Error),
    /// Failed to add watch path
    WatchPath(notify::Error),
    /// The watcher stopped delivering events
    ChannelClosed,
    /// Mod directory not found
    SourceNotFound(PathBuf),
}

impl std::fmt::Display for WatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchError::WatcherInit(e) => write!(f, "Failed to initialize file watcher: {}", e),
            WatchError::WatchPath(e) => write!(f, "Failed to watch path: {}", e),
            WatchError::ChannelClosed => write!(f, "File watcher stopped unexpectedly"),
            WatchError::SourceNotFound(path) => {
                write!(f, "Mod directory not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for WatchError {}

/// Input to the watch loop.
///
/// The debouncer feeds these through a channel; tests push them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A path was created or modified
    Changed(PathBuf),
    /// The watcher reported an error
    Error(String),
}

/// Tracks files that failed so a later successful update can be reported
#[derive(Debug, Default)]
pub struct ErrorTracker {
    failing: HashSet<String>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, relative: &str) {
        self.failing.insert(relative.to_string());
    }

    /// Record a successful update, returns true if the file was failing before
    pub fn record_success(&mut self, relative: &str) -> bool {
        self.failing.remove(relative)
    }

    pub fn has_errors(&self) -> bool {
        !self.failing.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.failing.len()
    }
}

/// Counters for one watch session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WatchSummary {
    /// Change events received
    pub events: usize,
    /// Files transformed again
    pub updated: usize,
    /// Failed updates
    pub failed: usize,
    /// Watcher errors reported
    pub watcher_errors: usize,
}

/// Clear the terminal screen
fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}

/// Format duration for display
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Get current timestamp for logging
fn timestamp() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
    let secs = now.as_secs() % 86400;
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Handle events until every sender is dropped.
pub fn process_events(
    pipeline: &BuildPipeline,
    rx: &Receiver<WatchEvent>,
    config: &WatchConfig,
) -> WatchSummary {
    let mut summary = WatchSummary::default();
    let mut tracker = ErrorTracker::new();

    while let Ok(event) = rx.recv() {
        match event {
            WatchEvent::Changed(path) => {
                summary.events += 1;
                let start = Instant::now();
                let outcome = pipeline.handle_change(&path);
                if matches!(outcome, ChangeOutcome::Ignored(_)) {
                    continue;
                }
                if config.clear_screen {
                    clear_screen();
                }
                match outcome {
                    ChangeOutcome::Updated(update) => {
                        summary.updated += 1;
                        if tracker.record_success(&update.relative) {
                            println!("[{}] Fixed: {}", timestamp(), update.relative);
                        }
                        println!(
                            "[{}] Updated {} ({}, {} file{}) in {}",
                            timestamp(),
                            update.relative,
                            update.action,
                            update.outputs.len(),
                            if update.outputs.len() == 1 { "" } else { "s" },
                            format_duration(start.elapsed())
                        );
                    }
                    ChangeOutcome::Failed { relative, error } => {
                        summary.failed += 1;
                        tracker.record_failure(&relative);
                        eprintln!("[{}] Error in {}: {}", timestamp(), relative, error);
                    }
                    ChangeOutcome::Ignored(_) => {}
                }
            }
            WatchEvent::Error(message) => {
                summary.watcher_errors += 1;
                eprintln!("[{}] Watch error: {}", timestamp(), message);
                eprintln!("[{}] Continuing to watch...", timestamp());
            }
        }
    }

    if tracker.has_errors() {
        tracing::warn!("{} file(s) still failing", tracker.error_count());
    }
    summary
}

/// Forward debouncer output into the watch loop's channel
fn forward_events(tx: &Sender<WatchEvent>, result: DebounceEventResult) {
    match result {
        Ok(events) => {
            for event in events {
                if matches!(event.kind, DebouncedEventKind::Any) {
                    let _ = tx.send(WatchEvent::Changed(event.path));
                }
            }
        }
        Err(error) => {
            let _ = tx.send(WatchEvent::Error(error.to_string()));
        }
    }
}

/// Watch the mod folder and update changed files.
///
/// Blocks until interrupted (Ctrl+C). The pipeline should already have run
/// its initial build so the ignore rules are loaded.
pub fn watch(pipeline: &BuildPipeline, config: &WatchConfig) -> Result<(), WatchError> {
    let mod_root = pipeline.context().mod_root().to_path_buf();
    if !mod_root.is_dir() {
        return Err(WatchError::SourceNotFound(mod_root));
    }

    let (tx, rx) = channel();
    let debounce = Duration::from_millis(u64::from(config.debounce_ms));
    let mut debouncer =
        new_debouncer(debounce, move |result: DebounceEventResult| forward_events(&tx, result))
            .map_err(WatchError::WatcherInit)?;

    debouncer
        .watcher()
        .watch(&mod_root, RecursiveMode::Recursive)
        .map_err(WatchError::WatchPath)?;

    println!("[{}] Watching {} for changes...", timestamp(), mod_root.display());
    let summary = process_events(pipeline, &rx, config);
    tracing::debug!("Watch loop ended after {} event(s)", summary.events);

    Err(WatchError::ChannelClosed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildContext;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BuildPipeline) {
        let temp = TempDir::new().unwrap();
        let mod_root = temp.path().join("WatchMod");
        fs::create_dir_all(&mod_root).unwrap();
        let mut pipeline = BuildPipeline::new(BuildContext::new(mod_root, temp.path().join("out")));
        pipeline.build().unwrap();
        (temp, pipeline)
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp();
        assert_eq!(ts.len(), 8);
        assert_eq!(ts.matches(':').count(), 2);
    }

    #[test]
    fn test_error_tracker_detects_fixed_files() {
        let mut tracker = ErrorTracker::new();
        tracker.record_failure("gfx/a.png");
        tracker.record_failure("gfx/b.png");
        assert_eq!(tracker.error_count(), 2);

        assert!(tracker.record_success("gfx/a.png"));
        assert!(!tracker.record_success("gfx/c.png"));
        assert_eq!(tracker.error_count(), 1);
        assert!(tracker.has_errors());
    }

    #[test]
    fn test_process_events_updates_changed_file() {
        let (_temp, pipeline) = setup();
        let source = pipeline.context().mod_root().join("common/notes.txt");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "v2").unwrap();

        let (tx, rx) = channel();
        tx.send(WatchEvent::Changed(source)).unwrap();
        drop(tx);

        let summary = process_events(&pipeline, &rx, &WatchConfig::default());
        assert_eq!(summary.updated, 1);
        let dest = pipeline.context().destination("common/notes.txt");
        assert_eq!(fs::read_to_string(dest).unwrap(), "v2");
    }

    #[test]
    fn test_process_events_survives_errors() {
        let (_temp, pipeline) = setup();
        let root = pipeline.context().mod_root().to_path_buf();
        fs::write(root.join("broken.png"), b"nope").unwrap();
        fs::write(root.join("after.txt"), b"ok").unwrap();

        let (tx, rx) = channel();
        tx.send(WatchEvent::Changed(root.join("broken.png"))).unwrap();
        tx.send(WatchEvent::Error("watcher hiccup".into())).unwrap();
        tx.send(WatchEvent::Changed(root.join("after.txt"))).unwrap();
        drop(tx);

        let summary = process_events(&pipeline, &rx, &WatchConfig::default());
        assert_eq!(summary.events, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.watcher_errors, 1);
        assert!(pipeline.context().destination("after.txt").exists());
    }

    #[test]
    fn test_process_events_ignores_directories() {
        let (_temp, pipeline) = setup();
        let dir = pipeline.context().mod_root().join("gfx");
        fs::create_dir_all(&dir).unwrap();

        let (tx, rx) = channel();
        tx.send(WatchEvent::Changed(dir)).unwrap();
        drop(tx);

        let summary = process_events(&pipeline, &rx, &WatchConfig::default());
        assert_eq!(summary.events, 1);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_watch_source_not_found() {
        let temp = TempDir::new().unwrap();
        let ctx = BuildContext::new(temp.path().join("missing"), temp.path().join("out"));
        let pipeline = BuildPipeline::new(ctx);
        let result = watch(&pipeline, &WatchConfig::default());
        assert!(matches!(result, Err(WatchError::SourceNotFound(_))));
    }
}
