use super::stats::{DispatchStats, DispatchStatsSnapshot};
use crate::camera::{FrameRequest, FrameSink};
use crate::config::DispatchConfig;
use crate::error::{ArcamError, Result};
use crate::fault::panic_message;
use crate::frame::PreviewFrame;
use crate::render::{FrameRenderer, RenderSurface};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, info, trace, warn};

const CONSUMER_THREAD_NAME: &str = "arcam-frame-consumer";

/// Camera-side half of the dispatcher, registered with the device as its frame sink
struct Handoff {
    frames_tx: Sender<PreviewFrame>,
    frames_rx: Receiver<PreviewFrame>,
    accepting: AtomicBool,
    copy_frames: AtomicBool,
    frame_request: Mutex<Option<Arc<dyn FrameRequest>>>,
    stats: DispatchStats,
}

impl Handoff {
    /// Queue a frame, evicting the oldest queued frame when full
    fn enqueue(&self, frame: PreviewFrame) {
        let mut frame = frame;
        loop {
            match self.frames_tx.try_send(frame) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(stale) = self.frames_rx.try_recv() {
                        self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                        trace!("Frame queue full, dropped frame {}", stale.sequence);
                    }
                    frame = rejected;
                }
                // Unreachable while we hold a receiver
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

impl FrameSink for Handoff {
    fn on_preview_frame(&self, frame: PreviewFrame) {
        self.stats.frames_received.fetch_add(1, Ordering::Relaxed);

        if !self.accepting.load(Ordering::Acquire) {
            self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
            trace!("Dispatcher stopped, discarding frame {}", frame.sequence);
            return;
        }

        let frame = if self.copy_frames.load(Ordering::Relaxed) {
            frame.detached()
        } else {
            frame
        };
        trace!("Received frame {} ({} bytes)", frame.sequence, frame.data.len());
        self.enqueue(frame);

        if let Some(request) = self.frame_request.lock().as_ref() {
            request.request_next_frame();
        }
    }
}

/// Closes the handoff when the consumer thread exits
struct IntakeGuard(Arc<Handoff>);

impl Drop for IntakeGuard {
    fn drop(&mut self) {
        self.0.accepting.store(false, Ordering::Release);
    }
}

/// Bridges the camera delivery thread to the renderer.
///
/// The camera thread only enqueues into a bounded channel (drop-oldest). A
/// dedicated consumer thread forwards each queued frame to the renderer and
/// then requests exactly one redraw.
pub struct FrameDispatcher {
    handoff: Arc<Handoff>,
    renderer: Arc<dyn FrameRenderer>,
    surface: Arc<dyn RenderSurface>,
    always_copy: bool,
    worker: Option<(Sender<()>, JoinHandle<()>)>,
}

impl FrameDispatcher {
    pub fn new(
        config: &DispatchConfig,
        renderer: Arc<dyn FrameRenderer>,
        surface: Arc<dyn RenderSurface>,
    ) -> Self {
        let (frames_tx, frames_rx) = channel::bounded(config.queue_depth.max(1));
        debug!("Frame dispatcher queue depth {}", config.queue_depth.max(1));

        Self {
            handoff: Arc::new(Handoff {
                frames_tx,
                frames_rx,
                accepting: AtomicBool::new(false),
                copy_frames: AtomicBool::new(config.copy_frames),
                frame_request: Mutex::new(None),
                stats: DispatchStats::default(),
            }),
            renderer,
            surface,
            always_copy: config.copy_frames,
            worker: None,
        }
    }

    /// The sink to register with the camera device
    pub fn sink(&self) -> Arc<dyn FrameSink> {
        Arc::clone(&self.handoff) as Arc<dyn FrameSink>
    }

    /// Adapt to the capabilities of a freshly opened device
    pub fn attach(&self, frame_request: Option<Arc<dyn FrameRequest>>, reuses_buffers: bool) {
        self.handoff
            .copy_frames
            .store(self.always_copy || reuses_buffers, Ordering::Relaxed);
        *self.handoff.frame_request.lock() = frame_request;
    }

    pub fn detach(&self) {
        *self.handoff.frame_request.lock() = None;
    }

    /// Request the first frame from a one-shot device; no-op otherwise
    pub fn arm(&self) {
        if let Some(request) = self.handoff.frame_request.lock().as_ref() {
            request.request_next_frame();
        }
    }

    /// Start the consumer thread and begin accepting frames.
    ///
    /// A consumer that already exited (its renderer panicked) is reaped and
    /// replaced, so calling this again is how the pipeline recovers.
    pub fn start(&mut self) -> Result<()> {
        let consumer_exited = match &self.worker {
            Some((_, handle)) => handle.is_finished(),
            None => false,
        };
        if consumer_exited {
            if let Err(e) = self.reap() {
                warn!("Replacing failed frame consumer: {}", e);
            }
        }

        if self.worker.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let frames_rx = self.handoff.frames_rx.clone();
        let handoff = Arc::clone(&self.handoff);
        let renderer = Arc::clone(&self.renderer);
        let surface = Arc::clone(&self.surface);

        let handle = std::thread::Builder::new()
            .name(CONSUMER_THREAD_NAME.to_string())
            .spawn(move || {
                // Stop intake however the loop ends, including a renderer panic
                let _intake = IntakeGuard(Arc::clone(&handoff));
                loop {
                    crossbeam::select! {
                        recv(frames_rx) -> frame => match frame {
                            Ok(frame) => {
                                let sequence = frame.sequence;
                                renderer.on_frame(frame);
                                handoff.stats.frames_forwarded.fetch_add(1, Ordering::Relaxed);
                                surface.request_redraw();
                                handoff.stats.redraws_requested.fetch_add(1, Ordering::Relaxed);
                                trace!("Forwarded frame {} and requested redraw", sequence);
                            }
                            Err(_) => break,
                        },
                        recv(stop_rx) -> _ => break,
                    }
                }
                debug!("Frame consumer loop stopped");
            })?;

        self.worker = Some((stop_tx, handle));
        self.handoff.accepting.store(true, Ordering::Release);
        info!("Frame dispatcher started");
        Ok(())
    }

    /// Stop accepting frames and join the consumer thread.
    ///
    /// Frames still queued are discarded. Returns `WorkerFault` if the consumer
    /// thread panicked.
    pub fn stop(&mut self) -> Result<()> {
        self.handoff.accepting.store(false, Ordering::Release);
        self.reap()
    }

    fn reap(&mut self) -> Result<()> {
        let Some((stop_tx, handle)) = self.worker.take() else {
            return Ok(());
        };

        drop(stop_tx);
        let joined = handle.join();

        let mut discarded = 0;
        while self.handoff.frames_rx.try_recv().is_ok() {
            discarded += 1;
        }
        self.handoff
            .stats
            .frames_dropped
            .fetch_add(discarded, Ordering::Relaxed);

        match joined {
            Ok(()) => {
                info!("Frame dispatcher stopped ({} queued frames discarded)", discarded);
                Ok(())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Frame consumer thread terminated abnormally: {}", message);
                Err(ArcamError::worker_fault(CONSUMER_THREAD_NAME.to_string(), message))
            }
        }
    }

    /// Whether a consumer thread is alive to take frames
    pub fn is_running(&self) -> bool {
        match &self.worker {
            Some((_, handle)) => !handle.is_finished(),
            None => false,
        }
    }

    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.handoff.stats.snapshot()
    }

    pub fn renderer(&self) -> &Arc<dyn FrameRenderer> {
        &self.renderer
    }

    pub fn surface(&self) -> &Arc<dyn RenderSurface> {
        &self.surface
    }
}

impl Drop for FrameDispatcher {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("Error stopping frame dispatcher: {}", e);
        }
    }
}
