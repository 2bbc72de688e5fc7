//! Codec discovery boundary
//!
//! The engine hands the first segment of every stream to a [`Demuxer`]
//! and waits for exactly one reply carrying one codec string per track.

use bytes::Bytes;

use crate::error::DemuxError;
use crate::event::{EventSender, PlayerEvent};

/// One-shot reply channel for a demux request
#[derive(Debug)]
pub struct DemuxReply {
    epoch: u64,
    tx: EventSender,
}

impl DemuxReply {
    pub fn new(epoch: u64, tx: EventSender) -> Self {
        Self { epoch, tx }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Deliver the outcome. Consumes the reply so it can only happen once.
    pub fn send(self, result: Result<Vec<String>, DemuxError>) {
        self.tx.send(PlayerEvent::Demuxed {
            epoch: self.epoch,
            result,
        });
    }
}

/// Learns track codecs from the first segment of a stream
///
/// Implementations may answer synchronously or from another task; the
/// engine treats the reply as asynchronous either way.
pub trait Demuxer: Send {
    fn demux(&mut self, init: Bytes, reply: DemuxReply);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_carries_epoch() {
        let (tx, mut rx) = EventSender::channel();
        let reply = DemuxReply::new(9, tx);
        assert_eq!(reply.epoch(), 9);

        reply.send(Ok(vec!["avc1.64001f".into()]));

        match rx.try_recv() {
            Ok(PlayerEvent::Demuxed { epoch, result }) => {
                assert_eq!(epoch, 9);
                assert_eq!(result.unwrap(), vec!["avc1.64001f".to_string()]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
