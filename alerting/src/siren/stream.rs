//! Siren render loop.
//!
//! Writes a pre-generated cycle buffer to an audio sink until cancelled. The
//! loop is cooperative: the cancellation token is checked before every buffer
//! write, and the stop path waits (bounded) for the loop to exit before the
//! sink handle is stopped, so the loop never writes to a released device.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::platform::AudioSink;

/// Run the render loop to completion on the current thread.
///
/// Exits when the token is cancelled, or when a write fails (a failed device
/// leaves vibration and wake carrying the episode; audio is not retried).
pub fn run_render_loop(sink: Arc<dyn AudioSink>, cycle: Vec<i16>, cancel: CancellationToken) {
    debug!(samples = cycle.len(), "render loop started");

    while !cancel.is_cancelled() {
        if let Err(error) = sink.write(&cycle) {
            warn!(%error, "audio write failed, render loop stopping");
            break;
        }
    }

    debug!("render loop exited");
}

/// Spawn the render loop on the blocking thread pool.
///
/// The returned handle completes once the loop has observed cancellation (or
/// a write failure) and exited; the caller must await it before stopping the
/// sink.
pub fn spawn_render_loop(
    sink: Arc<dyn AudioSink>,
    cycle: Vec<i16>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || run_render_loop(sink, cycle, cancel))
}
