//! Live fMP4-over-WebSocket player with a simulated sink
//!
//! Run with: cargo run --example ws_player [WS_URL]
//!
//! Examples:
//!   cargo run --example ws_player                                  # ws://127.0.0.1:8080/live
//!   cargo run --example ws_player wss://edge.example.com/live/cam1
//!
//! The sink does not decode anything. It counts appended bytes and
//! pretends every append buffers half a second of media, which is enough
//! to watch the queue, merge and window logic work against a real stream.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use ws_fmp4::{
    BufferStats, Callbacks, LivePlayer, PlaybackSink, PlayerBackend, PlayerConfig, SinkError,
    SinkFactory, SinkNotifier, TimeRange,
};

/// Seconds of media each append is assumed to carry
const SECONDS_PER_APPEND: f64 = 0.5;

struct SimulatedSink {
    notifier: SinkNotifier,
    range: Option<TimeRange>,
    position: f64,
    paused: bool,
    bytes: Arc<AtomicU64>,
}

impl PlaybackSink for SimulatedSink {
    fn add_track(&mut self, mime: &str) -> Result<(), SinkError> {
        println!("sink track: {}", mime);
        Ok(())
    }

    fn is_updating(&self) -> bool {
        // Every operation completes immediately
        false
    }

    fn append(&mut self, data: Bytes) -> Result<(), SinkError> {
        self.bytes.fetch_add(data.len() as u64, Ordering::Relaxed);
        let range = self.range.get_or_insert(TimeRange::new(0.0, 0.0));
        range.end += SECONDS_PER_APPEND;
        if !self.paused {
            self.position += SECONDS_PER_APPEND;
        }
        self.notifier.update_end();
        Ok(())
    }

    fn remove(&mut self, range: TimeRange) -> Result<(), SinkError> {
        if let Some(current) = self.range.as_mut() {
            if range.end > current.start {
                current.start = range.end.min(current.end);
            }
        }
        self.notifier.update_end();
        Ok(())
    }

    fn buffered(&self) -> Vec<TimeRange> {
        self.range.into_iter().collect()
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, position: f64) {
        self.position = position;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) -> Result<(), SinkError> {
        self.paused = false;
        Ok(())
    }

    fn close(&mut self) {
        println!("sink closed");
    }
}

struct SimulatedSinkFactory {
    bytes: Arc<AtomicU64>,
}

impl SinkFactory for SimulatedSinkFactory {
    fn create(&mut self, notifier: SinkNotifier) -> Result<Box<dyn PlaybackSink>, SinkError> {
        notifier.source_open();
        Ok(Box::new(SimulatedSink {
            notifier,
            range: None,
            position: 0.0,
            paused: true,
            bytes: Arc::clone(&self.bytes),
        }))
    }
}

fn print_stats(stats: &BufferStats) {
    println!(
        "latency {:>6.2}s  buffered {:>6.2}s  queue {:>3} segments / {:>8} bytes",
        stats.live_latency, stats.buffered_duration, stats.queue_size, stats.queue_bytes
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:8080/live".to_string());

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ws_fmp4=debug".parse()?)
                .add_directive("ws_player=debug".parse()?),
        )
        .init();

    let bytes = Arc::new(AtomicU64::new(0));

    let callbacks = Callbacks::new()
        .on_stats(print_stats)
        .on_source_buffer_ready(|| println!("sink ready"))
        .on_reconnect_success(|| println!("reconnected"))
        .on_reconnect_failed(|attempts| println!("gave up after {} attempts", attempts))
        .on_merger_error(|e| println!("buffering fault: {}", e));

    let config = PlayerConfig::new(url.clone())
        .debug(true)
        .autoplay(true)
        .callbacks(callbacks);

    let backend = PlayerBackend::new(SimulatedSinkFactory {
        bytes: Arc::clone(&bytes),
    });

    println!("Connecting to {}", url);
    let mut player = LivePlayer::start(config, backend)?;

    tokio::signal::ctrl_c().await?;
    println!();
    println!("Shutting down");
    player.destroy();
    player.join().await;

    println!("Appended {} bytes", bytes.load(Ordering::Relaxed));
    Ok(())
}
