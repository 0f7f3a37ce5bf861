//! Background export: one worker thread, progress channel, cancel token.

use camino::Utf8PathBuf;
use provaudit_export::{
    write_report, BranchResolver, CancelToken, ExportError, ExportProgress, ExportSummary,
};
use provaudit_types::ScanResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Launch guard: at most one export runs at a time; a second request is
/// rejected, never interleaved.
#[derive(Clone, Default)]
pub struct ExportLauncher {
    in_flight: Arc<AtomicBool>,
}

impl ExportLauncher {
    pub fn new() -> ExportLauncher {
        ExportLauncher::default()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Start an export over `snapshot` on a worker thread.
    ///
    /// The snapshot is a clone taken by the caller; the foreground is free to
    /// keep recording decisions while the export runs (the report simply
    /// reflects the moment the snapshot was taken).
    pub fn spawn<R>(
        &self,
        snapshot: ScanResult,
        destination: Utf8PathBuf,
        resolver: R,
    ) -> Result<ExportTask, ExportError>
    where
        R: BranchResolver + Send + 'static,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ExportError::AlreadyRunning);
        }

        let (progress_tx, progress_rx) = mpsc::channel();
        let cancel = CancelToken::new();

        let flag = Arc::clone(&self.in_flight);
        let worker_cancel = cancel.clone();
        let handle = std::thread::spawn(move || {
            let outcome = write_report(
                &snapshot,
                &destination,
                &resolver,
                Some(&progress_tx),
                &worker_cancel,
            );
            flag.store(false, Ordering::SeqCst);
            outcome
        });

        Ok(ExportTask {
            progress: progress_rx,
            cancel,
            handle,
        })
    }
}

/// Handle on a running export, decoupled from any rendering concern.
pub struct ExportTask {
    progress: Receiver<ExportProgress>,
    cancel: CancelToken,
    handle: JoinHandle<Result<ExportSummary, ExportError>>,
}

impl ExportTask {
    /// Progress messages; advisory, drained at the receiver's leisure.
    pub fn progress(&self) -> &Receiver<ExportProgress> {
        &self.progress
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and return its outcome.
    pub fn join(self) -> Result<ExportSummary, ExportError> {
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(_) => Err(ExportError::Worker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provaudit_export::{BranchLookupError, FixedBranch};
    use std::sync::mpsc::Sender;
    use tempfile::TempDir;

    const FIXTURE: &str = r#"{
        "src/a.c": [{"id": "file", "purl": ["pkg:github/owner/repo@v1"]}],
        "src/b.c": [{"id": "snippet", "oss_lines": "3-5"}]
    }"#;

    fn dest(tmp: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().join(name)).expect("utf8 path")
    }

    #[test]
    fn export_runs_in_background_and_reports_progress() {
        let snapshot: ScanResult = serde_json::from_str(FIXTURE).expect("fixture");
        let tmp = TempDir::new().expect("temp dir");
        let launcher = ExportLauncher::new();

        let task = launcher
            .spawn(
                snapshot,
                dest(&tmp, "report.csv"),
                FixedBranch("main".to_string()),
            )
            .expect("spawn");

        let summary = task.join().expect("export");
        assert_eq!(summary.rows, 2);
        assert!(summary.destination.as_str().ends_with("report.csv"));
        assert!(!launcher.is_running());
    }

    #[test]
    fn progress_messages_arrive_per_file() {
        let snapshot: ScanResult = serde_json::from_str(FIXTURE).expect("fixture");
        let tmp = TempDir::new().expect("temp dir");
        let launcher = ExportLauncher::new();

        let task = launcher
            .spawn(
                snapshot,
                dest(&tmp, "report.csv"),
                FixedBranch("main".to_string()),
            )
            .expect("spawn");

        let updates: Vec<ExportProgress> = task.progress().iter().collect();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].processed, 2);
        assert_eq!(updates[1].total, 2);
        task.join().expect("export");
    }

    #[test]
    fn second_export_is_rejected_while_one_is_in_flight() {
        // A resolver that blocks until released keeps the first export alive.
        struct BlockingResolver(Sender<()>, std::sync::mpsc::Receiver<()>);
        impl BranchResolver for BlockingResolver {
            fn default_branch(
                &self,
                _owner: &str,
                _repo: &str,
            ) -> Result<String, BranchLookupError> {
                let _ = self.0.send(());
                let _ = self.1.recv();
                Ok("main".to_string())
            }
        }

        let snapshot: ScanResult = serde_json::from_str(
            r#"{"a.c": [{"id": "file", "purl": ["pkg:github/owner/repo"]}]}"#,
        )
        .expect("fixture");
        let tmp = TempDir::new().expect("temp dir");
        let launcher = ExportLauncher::new();

        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();

        let task = launcher
            .spawn(
                snapshot.clone(),
                dest(&tmp, "first.csv"),
                BlockingResolver(started_tx, release_rx),
            )
            .expect("first spawn");

        // Wait until the worker is inside the branch lookup.
        started_rx.recv().expect("worker started");
        assert!(launcher.is_running());

        let second = launcher.spawn(
            snapshot,
            dest(&tmp, "second.csv"),
            FixedBranch("main".to_string()),
        );
        assert!(matches!(second, Err(ExportError::AlreadyRunning)));

        release_tx.send(()).expect("release worker");
        task.join().expect("first export");
        assert!(!launcher.is_running());
    }

    #[test]
    fn cancelled_export_reports_cancellation() {
        let snapshot: ScanResult = serde_json::from_str(FIXTURE).expect("fixture");
        let tmp = TempDir::new().expect("temp dir");
        let launcher = ExportLauncher::new();

        let task = launcher
            .spawn(
                snapshot,
                dest(&tmp, "report.csv"),
                FixedBranch("main".to_string()),
            )
            .expect("spawn");
        task.cancel();

        // Cancellation raced the worker: either it finished first or it
        // stopped with the cancel error; the guard clears in both cases.
        match task.join() {
            Ok(_) | Err(ExportError::Cancelled) => {}
            Err(other) => panic!("unexpected export error: {other}"),
        }
        assert!(!launcher.is_running());
    }
}
