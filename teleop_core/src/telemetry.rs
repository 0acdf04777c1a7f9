//! Rolling per-tick history for plotting and export.

use std::collections::VecDeque;

use serde::Serialize;

/// Default number of ticks retained (one per horizontal pixel of the graph).
pub const DEFAULT_HISTORY: usize = 1000;

/// Snapshot of one steering channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ChannelSample {
    pub cmd_req: f64,
    pub cmd_d_unfilt: f64,
    pub cmd_d: f64,
}

/// One row of drive telemetry.
///
/// Flat so it serializes straight to a CSV row: for each channel the
/// saturated request, the slewed value and the filtered command.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TickSample {
    /// Accumulated shaped time since `begin`.
    pub t_s: f64,
    pub dt_s: f64,
    pub xd_req: f64,
    pub xd_unfilt: f64,
    pub xd_d: f64,
    pub yd_req: f64,
    pub yd_unfilt: f64,
    pub yd_d: f64,
    pub rzd_req: f64,
    pub rzd_unfilt: f64,
    pub rzd_d: f64,
}

impl TickSample {
    pub fn from_channels(
        t_s: f64,
        dt_s: f64,
        xd: ChannelSample,
        yd: ChannelSample,
        rzd: ChannelSample,
    ) -> Self {
        Self {
            t_s,
            dt_s,
            xd_req: xd.cmd_req,
            xd_unfilt: xd.cmd_d_unfilt,
            xd_d: xd.cmd_d,
            yd_req: yd.cmd_req,
            yd_unfilt: yd.cmd_d_unfilt,
            yd_d: yd.cmd_d,
            rzd_req: rzd.cmd_req,
            rzd_unfilt: rzd.cmd_d_unfilt,
            rzd_d: rzd.cmd_d,
        }
    }

    pub fn xd(&self) -> ChannelSample {
        ChannelSample {
            cmd_req: self.xd_req,
            cmd_d_unfilt: self.xd_unfilt,
            cmd_d: self.xd_d,
        }
    }

    pub fn yd(&self) -> ChannelSample {
        ChannelSample {
            cmd_req: self.yd_req,
            cmd_d_unfilt: self.yd_unfilt,
            cmd_d: self.yd_d,
        }
    }

    pub fn rzd(&self) -> ChannelSample {
        ChannelSample {
            cmd_req: self.rzd_req,
            cmd_d_unfilt: self.rzd_unfilt,
            cmd_d: self.rzd_d,
        }
    }
}

/// Bounded FIFO of `TickSample`; the oldest sample is dropped when full.
#[derive(Debug, Clone)]
pub struct TelemetryHistory {
    cap: usize,
    buf: VecDeque<TickSample>,
}

impl Default for TelemetryHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY)
    }
}

impl TelemetryHistory {
    /// Capacity is clamped to at least one sample.
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn push(&mut self, sample: TickSample) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(sample);
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn latest(&self) -> Option<&TickSample> {
        self.buf.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TickSample> {
        self.buf.iter()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
