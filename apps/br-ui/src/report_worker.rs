use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use br_app::{Report, ReportParams, ReportProgressEvent, ReportRequest, error_trace};

pub struct ReportWorker {
    pub progress_rx: Receiver<WorkerMessage>,
    _handle: JoinHandle<()>,
}

#[derive(Debug)]
pub enum WorkerMessage {
    Progress(ReportProgressEvent),
    Complete(Box<Report>),
    Error { message: String, trace: String },
}

impl ReportWorker {
    pub fn start(root: &Path, params: ReportParams) -> Self {
        let (tx, rx) = channel();
        let root = root.to_path_buf();

        let handle = thread::spawn(move || {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| Self::run_report(&root, params, &tx)));
            if let Err(payload) = outcome {
                let detail = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                let _ = tx.send(WorkerMessage::Error {
                    message: "Report worker panicked".to_string(),
                    trace: detail,
                });
            }
        });

        Self {
            progress_rx: rx,
            _handle: handle,
        }
    }

    fn run_report(root: &Path, params: ReportParams, tx: &Sender<WorkerMessage>) {
        let request = ReportRequest {
            root,
            params,
            cache: None,
        };

        let mut forward = |event: ReportProgressEvent| {
            let _ = tx.send(WorkerMessage::Progress(event));
        };
        let message =
            match br_app::generate_report_with_progress(&request, Some(&mut forward)) {
                Ok(report) => WorkerMessage::Complete(Box::new(report)),
                Err(err) => WorkerMessage::Error {
                    message: err.to_string(),
                    trace: error_trace(&err),
                },
            };
        let _ = tx.send(message);
    }
}
