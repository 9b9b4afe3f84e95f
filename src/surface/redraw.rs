use crate::error::{ArcamError, Result};
use crate::render::RenderSurface;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

struct RedrawShared {
    wakeup: Notify,
    paused: AtomicBool,
    requests: AtomicU64,
    frames_drawn: AtomicU64,
}

/// Render-on-demand surface owner running on the tokio runtime.
///
/// Nothing is drawn unless a redraw is requested. Requests arriving while a
/// draw is pending coalesce into one draw, and a request is never lost: the
/// wakeup permit is stored until the render task consumes it.
pub struct RedrawLoop {
    shared: Arc<RedrawShared>,
    cancellation_token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RedrawLoop {
    /// Spawn the render task; must be called from within a tokio runtime
    pub fn spawn<F>(draw: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let shared = Arc::new(RedrawShared {
            wakeup: Notify::new(),
            paused: AtomicBool::new(false),
            requests: AtomicU64::new(0),
            frames_drawn: AtomicU64::new(0),
        });
        let cancellation_token = CancellationToken::new();

        let task_shared = Arc::clone(&shared);
        let token = cancellation_token.clone();
        let task = tokio::spawn(async move {
            info!("Render loop started");
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = task_shared.wakeup.notified() => {
                        if task_shared.paused.load(Ordering::Acquire) {
                            trace!("Render loop paused, skipping redraw");
                            continue;
                        }
                        draw();
                        task_shared.frames_drawn.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            info!("Render loop stopped");
        });

        Self {
            shared,
            cancellation_token,
            task: Mutex::new(Some(task)),
        }
    }

    /// Signal the render task to exit without waiting for it
    pub fn finish(&self) {
        self.cancellation_token.cancel();
    }

    /// Stop the render task and wait for it to exit
    pub async fn shutdown(&self) -> Result<()> {
        self.finish();

        let task = self.task.lock().take();
        if let Some(task) = task {
            task.await.map_err(|e| {
                ArcamError::worker_fault("arcam-render".to_string(), e.to_string())
            })?;
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    pub fn redraw_requests(&self) -> u64 {
        self.shared.requests.load(Ordering::Relaxed)
    }

    pub fn frames_drawn(&self) -> u64 {
        self.shared.frames_drawn.load(Ordering::Relaxed)
    }
}

impl RenderSurface for RedrawLoop {
    fn request_redraw(&self) {
        self.shared.requests.fetch_add(1, Ordering::Relaxed);
        self.shared.wakeup.notify_one();
    }

    fn on_pause(&self) {
        debug!("Render loop paused");
        self.shared.paused.store(true, Ordering::Release);
    }

    fn on_resume(&self) {
        debug!("Render loop resumed");
        self.shared.paused.store(false, Ordering::Release);
        // Redraw whatever the renderer holds now
        self.shared.wakeup.notify_one();
    }
}

impl Drop for RedrawLoop {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}
