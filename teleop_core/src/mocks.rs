//! Test and helper doubles for teleop_core

use std::sync::{Arc, Mutex};

use teleop_traits::{AxisSource, CommandSink, StickFrame, VelocityCommand};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A source that returns the same frame every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantSource(pub StickFrame);

impl AxisSource for ConstantSource {
    fn read_frame(&mut self) -> Result<StickFrame, BoxError> {
        Ok(self.0)
    }
}

/// A source that always errors; exercises the input error path.
#[derive(Debug, Default)]
pub struct FailingSource;

impl AxisSource for FailingSource {
    fn read_frame(&mut self) -> Result<StickFrame, BoxError> {
        Err(Box::new(std::io::Error::other("gamepad disconnected")))
    }
}

/// Everything a `RecordingSink` has seen.
#[derive(Debug, Default, Clone)]
pub struct SinkLog {
    pub sent: Vec<(VelocityCommand, f64)>,
    pub stops: usize,
}

/// A sink that records every command; clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    log: Arc<Mutex<SinkLog>>,
    fail_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `n` commands, then fail every later `send`.
    pub fn failing_after(n: usize) -> Self {
        Self {
            log: Arc::default(),
            fail_after: Some(n),
        }
    }

    pub fn snapshot(&self) -> SinkLog {
        self.log.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl CommandSink for RecordingSink {
    fn send(&mut self, cmd: &VelocityCommand, dt_s: f64) -> Result<(), BoxError> {
        let mut log = self
            .log
            .lock()
            .map_err(|_| std::io::Error::other("sink log poisoned"))?;
        if self.fail_after.is_some_and(|n| log.sent.len() >= n) {
            return Err(Box::new(std::io::Error::other("locomotion link lost")));
        }
        log.sent.push((*cmd, dt_s));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        if let Ok(mut log) = self.log.lock() {
            log.stops += 1;
        }
        Ok(())
    }
}
