//! Speech source seam
//!
//! The worker pumps transcripts out of a [`SpeechSource`] without knowing
//! where they come from. In production that is a speech-to-text session; in
//! tests and bridging setups it is a [`ChannelSource`] fed by whatever
//! produces the events.

use std::future::Future;

use tokio::sync::mpsc;

use crate::protocol::TranscriptEvent;

use super::error::AgentError;

/// A stream of transcription results
pub trait SpeechSource: Send + 'static {
    /// Next transcript. `None` means the source is exhausted and the worker
    /// stops cleanly; `Some(Err(_))` is a source failure and the worker
    /// enters the failed state.
    fn next_transcript(
        &mut self,
    ) -> impl Future<Output = Option<Result<TranscriptEvent, AgentError>>> + Send;
}

/// Source fed through an mpsc channel
///
/// The sender half goes to whatever produces transcripts; dropping it ends
/// the source cleanly.
pub struct ChannelSource {
    rx: mpsc::Receiver<TranscriptEvent>,
}

impl ChannelSource {
    pub fn new(buffer: usize) -> (mpsc::Sender<TranscriptEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self { rx })
    }
}

impl SpeechSource for ChannelSource {
    async fn next_transcript(&mut self) -> Option<Result<TranscriptEvent, AgentError>> {
        self.rx.recv().await.map(Ok)
    }
}
