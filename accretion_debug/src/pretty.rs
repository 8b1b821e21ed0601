// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`SyncTraceSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).
//! Timestamps are printed in seconds.

use std::io::Write;

use accretion_core::trace::{PublishEvent, RetireEvent, SuppressEvent, SyncTraceSink, TickEvent};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SyncTraceSink for PrettyPrintSink<W> {
    fn on_tick(&mut self, e: &TickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] index={} stamp={:.6}s",
            e.tick_index,
            e.stamp.as_secs_f64(),
        );
    }

    fn on_publish(&mut self, e: &PublishEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[publish] channel={} add={} delete={}",
            e.channel, e.additions, e.deletions,
        );
    }

    fn on_suppress(&mut self, e: &SuppressEvent<'_>) {
        let _ = writeln!(self.writer, "[suppress] channel={}", e.channel);
    }

    fn on_retire(&mut self, e: &RetireEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[retire] channel={} count={}",
            e.channel, e.retired,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accretion_core::channel::ChannelId;
    use accretion_core::time::Timestamp;

    #[test]
    fn pretty_print_tick_and_publish() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_tick(&TickEvent {
            tick_index: 4,
            stamp: Timestamp(2_500_000_000),
        });
        sink.on_publish(&PublishEvent {
            channel: &ChannelId::GRAPH,
            additions: 3,
            deletions: 1,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[tick] index=4 stamp=2.500000s"), "got: {output}");
        assert!(
            output.contains("[publish] channel=graph_viz add=3 delete=1"),
            "got: {output}"
        );
    }

    #[test]
    fn pretty_print_suppress_and_retire() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_suppress(&SuppressEvent {
            channel: &ChannelId::ESDF,
        });
        sink.on_retire(&RetireEvent {
            channel: &ChannelId::GRAPH_LABELS,
            retired: 2,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            [
                "[suppress] channel=esdf_viz",
                "[retire] channel=graph_label_viz count=2"
            ]
        );
    }
}
