//! Low-latency live playback of fragmented MP4 over WebSocket
//!
//! A [`LivePlayer`] keeps one WebSocket connection to a live endpoint,
//! queues every binary message as an fMP4 segment and feeds a
//! [`PlaybackSink`] supplied by the embedder. It keeps the sink's buffer
//! near the live edge and reconnects with exponential backoff when the
//! connection drops.
//!
//! ```text
//!   WebSocket ──► TransportSession ──► SegmentEngine ──► PlaybackSink
//!       ▲               │ retry timer        │ Demuxer       │
//!       └───────────────┘                    └── window ◄────┘ update end
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ws_fmp4::{Callbacks, LivePlayer, PlayerBackend, PlayerConfig, SinkFactory};
//!
//! # async fn run(sink_factory: impl SinkFactory + 'static) -> ws_fmp4::Result<()> {
//! let config = PlayerConfig::new("wss://edge.example.com/live/cam1")
//!     .target_latency(1.5)
//!     .callbacks(Callbacks::new().on_stats(|s| println!("latency {:.2}s", s.live_latency)));
//!
//! let player = LivePlayer::start(config, PlayerBackend::new(sink_factory))?;
//! // ...
//! player.destroy();
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod error;
pub mod event;
pub mod logger;
pub mod media;
pub mod player;
pub mod sink;
pub mod stats;
pub mod transport;

#[cfg(test)]
mod testing;

pub use error::{DemuxError, Error, Result, SinkError};
pub use media::{CodecDescriptor, Demuxer, Mp4Demuxer};
pub use player::{Callbacks, LivePlayer, PlayerBackend, PlayerConfig};
pub use sink::{PlaybackSink, SinkEvent, SinkFactory, SinkNotifier, TimeRange};
pub use stats::BufferStats;
pub use transport::{Connector, ReconnectPolicy, WsConnector};
