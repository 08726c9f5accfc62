//! Output stream and sink ownership.

use std::thread;
use std::time::Duration;

use log::{error, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::error::PlaybackError;

const OUTPUT_STREAM_OPEN_RETRIES: usize = 5;
const OUTPUT_STREAM_OPEN_RETRY_MS: u64 = 100;

/// An open output stream with a paused sink connected to its mixer.
pub(super) struct Output {
    // Dropping the stream silences the sink, so it lives as long as the sink.
    _stream: OutputStream,
    pub(super) sink: Sink,
}

impl Output {
    /// Open the default device and connect a paused sink at `gain`.
    pub(super) fn open(gain: f32) -> Result<Self, PlaybackError> {
        let mut stream = open_output_stream_with_retry()?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());
        sink.pause();
        sink.set_volume(gain);
        Ok(Self {
            _stream: stream,
            sink,
        })
    }
}

/// Open the default output stream with bounded retry behavior.
fn open_output_stream_with_retry() -> Result<OutputStream, PlaybackError> {
    let mut attempt = 1;
    loop {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                if attempt == OUTPUT_STREAM_OPEN_RETRIES {
                    error!(
                        "failed to open default output stream after {} attempts: {}",
                        OUTPUT_STREAM_OPEN_RETRIES, err
                    );
                    return Err(PlaybackError::Output(err.to_string()));
                }
                warn!(
                    "open_default_stream attempt {}/{} failed: {}",
                    attempt, OUTPUT_STREAM_OPEN_RETRIES, err
                );
                thread::sleep(Duration::from_millis(OUTPUT_STREAM_OPEN_RETRY_MS));
                attempt += 1;
            }
        }
    }
}
