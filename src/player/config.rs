//! Player configuration

use std::time::Duration;

use url::Url;

use crate::buffer::{EngineConfig, MergePolicy, WindowConfig};
use crate::error::{Error, Result};
use crate::transport::ReconnectPolicy;

use super::callbacks::Callbacks;

/// Default live latency target in seconds
pub const TARGET_LATENCY_SECONDS: f64 = 2.0;
/// Default ceiling on buffered duration in seconds
pub const MAX_BUFFER_SECONDS: f64 = 20.0;
/// Default back buffer in seconds
pub const BACK_BUFFER_SECONDS: f64 = 10.0;
/// Default ingestion queue length
pub const MAX_QUEUE_SIZE: usize = 50;
/// Default ingestion queue size in bytes (4MB)
pub const MAX_QUEUE_BYTES: usize = 4 * 1024 * 1024;
/// Default automatic reconnect budget
pub const MAX_RECONNECT_ATTEMPTS: u32 = 3;
/// Default delay before the first reconnect
pub const RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Player configuration options
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Stream endpoint (`ws://` or `wss://`)
    pub url: String,

    /// Emit debug and warning diagnostics (errors are always logged)
    pub debug: bool,

    /// Distance from the live edge to jump to on the first frame (0 = start of buffer)
    pub target_latency_seconds: f64,

    /// Maximum buffered duration before the oldest media is removed
    pub max_buffer_seconds: f64,

    /// Buffered duration kept behind the play head
    pub back_buffer_seconds: f64,

    /// Maximum queued segments (oldest dropped first)
    pub max_queue_size: usize,

    /// Maximum queued bytes (oldest dropped first)
    pub max_queue_bytes: usize,

    /// Automatic reconnect budget (0 disables reconnection)
    pub max_reconnect_attempts: u32,

    /// Delay before the first reconnect; doubles on each retry
    pub reconnect_delay: Duration,

    /// Merge queued segments once this many are waiting
    pub merge_threshold_count: Option<usize>,

    /// Merge queued segments once this many bytes are waiting
    pub merge_threshold_bytes: Option<usize>,

    /// Codec list announced to the sink instead of the discovered one
    pub codec_string_override: Option<String>,

    /// Ask the sink whether the MIME type is supported (diagnostic only)
    pub enable_type_support_check: bool,

    /// Start playback as soon as the sink track opens
    pub autoplay: bool,

    pub callbacks: Callbacks,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            debug: false,
            target_latency_seconds: TARGET_LATENCY_SECONDS,
            max_buffer_seconds: MAX_BUFFER_SECONDS,
            back_buffer_seconds: BACK_BUFFER_SECONDS,
            max_queue_size: MAX_QUEUE_SIZE,
            max_queue_bytes: MAX_QUEUE_BYTES,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_delay: RECONNECT_DELAY,
            merge_threshold_count: None,
            merge_threshold_bytes: None,
            codec_string_override: None,
            enable_type_support_check: false,
            autoplay: false,
            callbacks: Callbacks::default(),
        }
    }
}

impl PlayerConfig {
    /// Create a config for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Set the live latency target
    pub fn target_latency(mut self, seconds: f64) -> Self {
        self.target_latency_seconds = seconds;
        self
    }

    /// Set the buffered duration ceiling
    pub fn max_buffer(mut self, seconds: f64) -> Self {
        self.max_buffer_seconds = seconds;
        self
    }

    /// Set the back buffer
    pub fn back_buffer(mut self, seconds: f64) -> Self {
        self.back_buffer_seconds = seconds;
        self
    }

    /// Set both queue bounds
    pub fn queue_limits(mut self, max_size: usize, max_bytes: usize) -> Self {
        self.max_queue_size = max_size;
        self.max_queue_bytes = max_bytes;
        self
    }

    /// Set the reconnect budget and base delay
    pub fn reconnect(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_reconnect_attempts = max_attempts;
        self.reconnect_delay = delay;
        self
    }

    /// Disable automatic reconnection
    pub fn disable_reconnect(mut self) -> Self {
        self.max_reconnect_attempts = 0;
        self
    }

    pub fn merge_threshold_count(mut self, count: usize) -> Self {
        self.merge_threshold_count = Some(count);
        self
    }

    pub fn merge_threshold_bytes(mut self, bytes: usize) -> Self {
        self.merge_threshold_bytes = Some(bytes);
        self
    }

    pub fn codec_string_override(mut self, codecs: impl Into<String>) -> Self {
        self.codec_string_override = Some(codecs.into());
        self
    }

    pub fn enable_type_support_check(mut self) -> Self {
        self.enable_type_support_check = true;
        self
    }

    pub fn autoplay(mut self, enabled: bool) -> Self {
        self.autoplay = enabled;
        self
    }

    pub fn callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Check the endpoint and bounds before anything is allocated
    pub fn validate(&self) -> Result<()> {
        let url =
            Url::parse(&self.url).map_err(|_| Error::InvalidEndpoint(self.url.clone()))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::InvalidEndpoint(self.url.clone()));
        }

        if self.max_queue_size == 0 {
            return Err(Error::InvalidConfig("max_queue_size must be at least 1"));
        }
        if self.max_queue_bytes == 0 {
            return Err(Error::InvalidConfig("max_queue_bytes must be at least 1"));
        }

        let windows = [
            self.target_latency_seconds,
            self.max_buffer_seconds,
            self.back_buffer_seconds,
        ];
        if windows.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(Error::InvalidConfig(
                "window durations must be finite and non-negative",
            ));
        }
        Ok(())
    }

    pub(crate) fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_queue_size: self.max_queue_size,
            max_queue_bytes: self.max_queue_bytes,
            merge: MergePolicy::new(self.merge_threshold_count, self.merge_threshold_bytes),
            window: WindowConfig {
                target_latency: self.target_latency_seconds,
                max_buffer: self.max_buffer_seconds,
                back_buffer: self.back_buffer_seconds,
            },
            codec_override: self.codec_string_override.clone(),
            type_support_check: self.enable_type_support_check,
            autoplay: self.autoplay,
        }
    }

    pub(crate) fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(self.max_reconnect_attempts, self.reconnect_delay)
    }
}
