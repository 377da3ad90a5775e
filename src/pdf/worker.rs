//! Page render worker - runs in a dedicated thread

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use flume::{Receiver, RecvTimeoutError, Sender};
use log::{debug, error, warn};

use super::document::{DocumentFault, DocumentHandle, DocumentLoader};
use super::highlight::{HighlightStyle, paint_highlights};
use super::request::{PageJob, RenderRequest, RenderResponse, RenderSpec, RequestId};
use super::types::{Frame, PageRect};

/// Rasterize a page and paint `highlights` over it
pub fn render_page(
    doc: &dyn DocumentHandle,
    spec: &RenderSpec,
    highlights: &[PageRect],
    style: &HighlightStyle,
) -> Result<Frame, DocumentFault> {
    let (scale_x, scale_y) = spec.scale();
    let mut frame = doc.rasterize(spec.page, scale_x, scale_y)?;
    paint_highlights(&mut frame, highlights, style);
    Ok(frame)
}

/// Main worker function.
///
/// Opens its own handle to the document, then serves page jobs until
/// shutdown or until every sender is gone. Jobs that queue up while a page
/// is being rendered are collapsed to the newest one; the others are
/// answered with [`RenderResponse::Superseded`].
#[expect(
    clippy::needless_pass_by_value,
    reason = "Values moved into thread, need ownership"
)]
pub fn render_worker(
    loader: Arc<dyn DocumentLoader>,
    doc_path: &Path,
    style: HighlightStyle,
    requests: Receiver<RenderRequest>,
    responses: Sender<RenderResponse>,
) {
    let doc = loader.open(doc_path);
    if let Err(e) = &doc {
        error!("Render worker failed to open {doc_path:?}: {e}");
    }

    while let Ok(request) = requests.recv() {
        let RenderRequest::Page(mut job) = request else {
            break;
        };

        let mut shutdown = false;
        for queued in requests.try_iter() {
            match queued {
                RenderRequest::Page(newer) => {
                    let _ = responses.send(RenderResponse::Superseded(job.id));
                    job = newer;
                }
                RenderRequest::Shutdown => {
                    shutdown = true;
                    break;
                }
            }
        }
        if shutdown {
            let _ = responses.send(RenderResponse::Superseded(job.id));
            break;
        }

        let response = match &doc {
            Ok(doc) => match render_page(doc.as_ref(), &job.spec, &job.highlights, &style) {
                Ok(frame) => RenderResponse::Page { id: job.id, frame },
                Err(error) => RenderResponse::Error { id: job.id, error },
            },
            Err(e) => RenderResponse::Error {
                id: job.id,
                error: DocumentFault::generic(e.to_string()),
            },
        };

        if responses.send(response).is_err() {
            break;
        }
    }

    debug!("Render worker for {doc_path:?} exiting");
}

/// Owner side of a background render thread
pub struct RenderWorker {
    request_tx: Sender<RenderRequest>,
    response_rx: Receiver<RenderResponse>,
    next_request_id: u64,
    latest: Option<RequestId>,
    thread: Option<JoinHandle<()>>,
}

impl RenderWorker {
    /// Spawn a worker thread for the document at `doc_path`
    #[must_use]
    pub fn spawn(loader: Arc<dyn DocumentLoader>, doc_path: PathBuf, style: HighlightStyle) -> Self {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        let thread = std::thread::Builder::new()
            .name("folio-render".to_string())
            .spawn(move || render_worker(loader, &doc_path, style, request_rx, response_tx));

        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(e) => {
                // Requests then fail on send and poll reports nothing
                error!("Failed to spawn render worker: {e}");
                None
            }
        };

        Self {
            request_tx,
            response_rx,
            next_request_id: 1,
            latest: None,
            thread,
        }
    }

    /// Queue a render; any earlier request becomes stale
    pub fn submit(&mut self, spec: RenderSpec, highlights: Vec<PageRect>) -> RequestId {
        let id = self.next_id();
        self.latest = Some(id);

        let job = PageJob {
            id,
            spec,
            highlights,
        };
        if self.request_tx.send(RenderRequest::Page(job)).is_err() {
            warn!("Render worker is gone, dropping request {id:?}");
        }

        id
    }

    /// Id of the newest submitted request
    #[must_use]
    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest
    }

    /// Forget the outstanding request so its answer is dropped on arrival
    pub fn cancel_pending(&mut self) {
        if let Some(id) = self.latest.take() {
            debug!("Cancelled render request {id:?}");
        }
    }

    /// Drain finished work, keeping only the answer to the newest request
    pub fn poll(&mut self) -> Option<Result<Frame, DocumentFault>> {
        let mut delivered = None;
        while let Ok(response) = self.response_rx.try_recv() {
            if let Some(result) = self.accept(response) {
                delivered = Some(result);
            }
        }
        delivered
    }

    /// Block until the newest request is answered or `timeout` elapses
    pub fn wait(&mut self, timeout: Duration) -> Option<Result<Frame, DocumentFault>> {
        self.latest?;
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.response_rx.recv_timeout(remaining) {
                Ok(response) => {
                    if let Some(result) = self.accept(response) {
                        return Some(result);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn accept(&mut self, response: RenderResponse) -> Option<Result<Frame, DocumentFault>> {
        let id = response.id();
        if Some(id) != self.latest {
            debug!("Dropping stale render response {id:?}");
            return None;
        }

        match response {
            RenderResponse::Page { frame, .. } => {
                self.latest = None;
                Some(Ok(frame))
            }
            RenderResponse::Error { error, .. } => {
                self.latest = None;
                Some(Err(error))
            }
            RenderResponse::Superseded(_) => None,
        }
    }

    /// Ask the worker thread to exit
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(RenderRequest::Shutdown);
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.shutdown();
        // Detach; a page in progress finishes on its own
        drop(self.thread.take());
    }
}
