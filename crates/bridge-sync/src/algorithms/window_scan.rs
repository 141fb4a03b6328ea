//! # Windowed Scanner
//!
//! Bounded event queries over a block range.
//!
//! ## Forward
//!
//! Queries `[from, min(from + window, end)]`, yields ascending, then
//! `from = to + 1` until `from > end`. Lazy: nothing is fetched until polled.
//!
//! ## Backward
//!
//! Starts at `to = head`, queries `[max(to - window, floor), to]` newest first
//! and stops at the first window holding a match. Finding the latest commit
//! costs one query per window between head and that commit instead of a scan
//! of the full history.

use futures::stream::{self, Stream, TryStreamExt};
use tracing::debug;

use bridge_telemetry::SCAN_WINDOWS;
use bridge_types::{BridgeError, EventFilter, LedgerEvent, LedgerReader, Order};

/// Scanner over one ledger with a fixed window size.
pub struct WindowedScanner<'a, L: LedgerReader + ?Sized> {
    reader: &'a L,
    chain: &'a str,
    window: u64,
}

impl<'a, L: LedgerReader + ?Sized> WindowedScanner<'a, L> {
    /// Create a scanner. A zero window is rejected.
    pub fn new(reader: &'a L, chain: &'a str, window: u64) -> Result<Self, BridgeError> {
        if window == 0 {
            return Err(BridgeError::InvariantViolation(format!(
                "{chain}: scan window must be > 0"
            )));
        }
        Ok(Self {
            reader,
            chain,
            window,
        })
    }

    /// Window size in blocks.
    pub fn window(&self) -> u64 {
        self.window
    }

    /// Lazily stream matching events in `[begin, end]`, ascending.
    ///
    /// A failed query is yielded once and ends the stream.
    pub fn scan_forward(
        &self,
        filter: &'a EventFilter,
        begin: u64,
        end: u64,
    ) -> impl Stream<Item = Result<LedgerEvent, BridgeError>> + 'a {
        let reader = self.reader;
        let chain = self.chain;
        let window = self.window;

        stream::try_unfold(Some(begin), move |cursor: Option<u64>| async move {
            let from = match cursor {
                Some(from) if from <= end => from,
                _ => return Ok::<_, BridgeError>(None),
            };
            let to = from.saturating_add(window).min(end);
            let mut events = fetch_window(reader, chain, filter, from, to, Order::Asc).await?;
            events.sort_by_key(|e| (e.block_number, e.log_index));
            Ok(Some((events, to.checked_add(1))))
        })
        .map_ok(|events| stream::iter(events.into_iter().map(Ok::<_, BridgeError>)))
        .try_flatten()
    }

    /// Collect `scan_forward` into a vector. No partial results on error.
    pub async fn collect_forward(
        &self,
        filter: &'a EventFilter,
        begin: u64,
        end: u64,
    ) -> Result<Vec<LedgerEvent>, BridgeError> {
        self.scan_forward(filter, begin, end).try_collect().await
    }

    /// Highest-block matching event in `[floor, head]`, scanning newest
    /// windows first.
    pub async fn scan_backward_until_found(
        &self,
        filter: &EventFilter,
        head: u64,
        floor: u64,
    ) -> Result<Option<LedgerEvent>, BridgeError> {
        if head < floor {
            return Ok(None);
        }

        let mut to = head;
        loop {
            let start = to.saturating_sub(self.window).max(floor);
            let events = fetch_window(self.reader, self.chain, filter, start, to, Order::Desc).await?;
            let newest = events
                .into_iter()
                .max_by_key(|e| (e.block_number, e.log_index));
            if newest.is_some() {
                return Ok(newest);
            }
            if start == floor {
                return Ok(None);
            }
            to = start - 1;
        }
    }
}

async fn fetch_window<L: LedgerReader + ?Sized>(
    reader: &L,
    chain: &str,
    filter: &EventFilter,
    from: u64,
    to: u64,
    order: Order,
) -> Result<Vec<LedgerEvent>, BridgeError> {
    let direction = match order {
        Order::Asc => "forward",
        Order::Desc => "backward",
    };
    debug!(chain, from, to, direction, "[bridge-sync] scanning window");
    SCAN_WINDOWS.with_label_values(&[chain, direction]).inc();
    reader.events(filter, from, to, order).await
}
