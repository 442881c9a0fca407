//! Word-by-word output surfaces.
//!
//! Presentation layers often want to reveal a finished summary
//! progressively. The core deliberately carries no timing contract: these
//! are plain lazy sequences that preserve word order, and any pacing is
//! imposed by the caller (the CLI's `--pace-ms` flag, for instance).

use tokio_stream::Stream;

/// Iterate the words of a summary in order.
///
/// Splits on Unicode whitespace; empty input yields an empty iterator.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// The words of a summary as an async [`Stream`].
///
/// Useful when the consumer is already driving a stream (a terminal
/// writer, a websocket). Items arrive immediately; throttle on the
/// consumer side if pacing is wanted.
pub fn word_stream(text: String) -> impl Stream<Item = String> {
    let words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
    tokio_stream::iter(words)
}
