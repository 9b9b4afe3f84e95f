use std::any::Any;
use std::panic;
use std::sync::Once;
use tracing::error;

static INSTALL: Once = Once::new();

/// Install a process-wide panic hook that logs faults from any thread.
///
/// The previous hook still runs afterwards, so the default stderr report and
/// abort/unwind behaviour are unchanged. Safe to call more than once.
pub fn install_fault_handler() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let name = thread.name().unwrap_or("<unnamed>");
            let location = info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "<unknown>".to_string());

            error!(
                thread = name,
                location = %location,
                "Uncaught worker fault: {}",
                panic_message(info.payload())
            );

            previous(info);
        }));
    });
}

/// Extract the message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
