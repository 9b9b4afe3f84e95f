use anyhow::Result;
use arcam::{
    ArcamConfig, CameraHolder, EventBus, FrameRenderer, HostEvent, HostScreen, LifecycleCoordinator,
    OverlayRenderer, PreviewFrame, RedrawLoop, SimulatedCamera, TrackingSession,
};
use clap::Parser;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "arcam")]
#[command(about = "Camera and render-surface lifecycle coordinator for AR overlays")]
#[command(version)]
#[command(long_about = "Runs a camera preview session against a render-on-demand surface, \
driving it through the host lifecycle (create, surface, preview, pause, destroy). \
Without camera hardware the simulated camera backend delivers synthetic frames.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "arcam.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting a session")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - wire the coordinator but don't start a session
    #[arg(long, help = "Perform dry run - build the coordinator but don't run a session")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Write logs to a file instead of stdout
    #[arg(long, value_name = "PATH", help = "Write logs to this file")]
    log_file: Option<String>,

    /// Stop the session after this many seconds
    #[arg(long, value_name = "SECONDS", help = "Run the preview session for a fixed time")]
    duration_secs: Option<u64>,
}

/// Why the preview session ended
#[derive(Debug, Clone)]
enum ShutdownReason {
    Signal(String),
    Timeout,
}

/// Attempts at starting the preview before giving up
const START_ATTEMPTS: u32 = 3;
const START_RETRY_DELAY: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    let _log_guard = init_logging(&args)?;

    info!("Starting arcam v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match ArcamConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    run_session(config, &args).await
}

async fn run_session(config: ArcamConfig, args: &Args) -> Result<()> {
    let events = EventBus::default();
    let event_logger = spawn_event_logger(&events);

    let holder = Arc::new(CameraHolder::new(SimulatedCamera::new(
        config.simulation.clone(),
    )));
    let renderer = Arc::new(SessionRenderer::default());
    let draw_target = Arc::clone(&renderer);
    let redraw = Arc::new(RedrawLoop::spawn(move || draw_target.draw()));
    let (surface_width, surface_height) = (config.camera.preview_width, config.camera.preview_height);

    let mut coordinator = LifecycleCoordinator::builder()
        .config(config)
        .camera_holder(holder)
        .renderer(renderer.clone())
        .render_surface(redraw.clone())
        .host(Arc::new(SessionHost))
        .tracking_session(Arc::new(SessionTracking))
        .event_bus(events.clone())
        .build()
        .map_err(|e| {
            error!("Failed to build coordinator: {}", e);
            e
        })?;

    if args.dry_run {
        info!("Dry run mode - coordinator wired but no session started");
        println!("✓ Dry run completed successfully - coordinator wired");
        redraw.shutdown().await?;
        return Ok(());
    }

    coordinator.handle(HostEvent::Created(None));
    coordinator.handle(HostEvent::Resumed);
    coordinator.handle(HostEvent::SurfaceCreated);
    coordinator.handle(HostEvent::SurfaceChanged {
        width: surface_width,
        height: surface_height,
    });
    coordinator.set_secondary_renderer(Some(Arc::new(StatusOverlay) as Arc<dyn OverlayRenderer>));

    let mut attempt = 1;
    while let Err(e) = coordinator.start_preview() {
        if !e.is_recoverable() || attempt >= START_ATTEMPTS {
            error!("Failed to start preview: {}", e);
            coordinator.handle(HostEvent::Destroyed);
            redraw.shutdown().await?;
            return Err(e.into());
        }
        warn!(
            "Preview start attempt {}/{} failed: {}",
            attempt, START_ATTEMPTS, e
        );
        attempt += 1;
        tokio::time::sleep(START_RETRY_DELAY).await;
    }
    info!("Preview running: {:?}", coordinator.status());

    let reason = wait_for_shutdown(args.duration_secs).await;
    info!("Shutdown initiated: {:?}", reason);

    coordinator.handle(HostEvent::Paused);
    coordinator.handle(HostEvent::SurfaceDestroyed);
    coordinator.handle(HostEvent::Destroyed);

    let stats = coordinator.dispatch_stats();
    info!(
        "Session finished: {} frames received, {} forwarded, {} dropped, {} redraws requested, {} drawn",
        stats.frames_received,
        stats.frames_forwarded,
        stats.frames_dropped,
        stats.redraws_requested,
        redraw.frames_drawn()
    );

    debug!(
        "Renderer accepted {} frames",
        renderer.frames_seen.load(Ordering::Relaxed)
    );

    redraw.shutdown().await?;
    drop(coordinator);
    event_logger.abort();

    info!("arcam session complete");
    Ok(())
}

async fn wait_for_shutdown(duration_secs: Option<u64>) -> ShutdownReason {
    let timeout = async {
        match duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        reason = wait_for_signal() => reason,
        _ = timeout => ShutdownReason::Timeout,
    }
}

async fn wait_for_signal() -> ShutdownReason {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("Received SIGINT signal (Ctrl+C)");
                        ShutdownReason::Signal("SIGINT".to_string())
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM signal");
                        ShutdownReason::Signal("SIGTERM".to_string())
                    }
                }
            }
            Err(e) => {
                warn!("Failed to register SIGTERM handler: {}", e);
                wait_for_ctrl_c().await
            }
        }
    }

    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await
    }
}

async fn wait_for_ctrl_c() -> ShutdownReason {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received SIGINT signal (Ctrl+C)");
    ShutdownReason::Signal("SIGINT".to_string())
}

fn spawn_event_logger(events: &EventBus) -> tokio::task::JoinHandle<()> {
    let mut receiver = events.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => debug!(event = event.event_type(), "{}", event.description()),
                Err(RecvError::Lagged(skipped)) => warn!("Event logger lagged by {} events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Keeps the newest frame and "draws" it when the surface asks
#[derive(Default)]
struct SessionRenderer {
    latest: Mutex<Option<PreviewFrame>>,
    secondary: Mutex<Option<Arc<dyn OverlayRenderer>>>,
    frames_seen: AtomicU64,
}

impl SessionRenderer {
    fn draw(&self) {
        if let Some(frame) = self.latest.lock().as_ref() {
            debug!(
                "Drawing frame {} ({}x{} {:?})",
                frame.sequence, frame.width, frame.height, frame.format
            );
        }
        if let Some(overlay) = self.secondary.lock().as_ref() {
            overlay.draw();
        }
    }
}

impl FrameRenderer for SessionRenderer {
    fn on_frame(&self, frame: PreviewFrame) {
        self.frames_seen.fetch_add(1, Ordering::Relaxed);
        *self.latest.lock() = Some(frame);
    }

    fn set_secondary_renderer(&self, renderer: Option<Arc<dyn OverlayRenderer>>) {
        *self.secondary.lock() = renderer;
    }
}

struct StatusOverlay;

impl OverlayRenderer for StatusOverlay {
    fn draw(&self) {
        debug!("Drawing status overlay");
    }
}

struct SessionHost;

impl HostScreen for SessionHost {
    fn finish(&self) {
        info!("Host screen finishing");
    }
}

struct SessionTracking;

impl TrackingSession for SessionTracking {
    fn release(&self) {
        info!("Tracking session released");
    }
}

fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("arcam={}", log_level)));

    let (writer, guard) = match args.log_file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Log file path has no file name: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };
    let ansi = args.log_file.is_none();

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .with_thread_names(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_thread_names(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(guard)
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# arcam configuration file");
    println!("# Every value below is the built-in default; ARCAM__<SECTION>__<KEY> overrides it");
    println!();
    println!("{}", ArcamConfig::default().to_toml()?);
    Ok(())
}
