//! Scalar helpers shared by the steering processors and the simulator.

use std::time::Duration;

/// Clamp `val` into `[min, max]`.
///
/// No ordering check is made on the bounds: with `min > max` the lower bound
/// is tested first, so any value below `min` returns `min`.
#[inline]
pub fn saturate(val: f64, min: f64, max: f64) -> f64 {
    if val < min {
        min
    } else if val > max {
        max
    } else {
        val
    }
}

/// Zero inside the open band between `a` and `b`, otherwise the distance
/// past the nearer edge (signed).
///
/// The bounds may be given in either order.
#[inline]
pub fn deadband(val: f64, a: f64, b: f64) -> f64 {
    let lo = a.min(b);
    let hi = a.max(b);
    if lo < val && val < hi {
        0.0
    } else if val < lo {
        val - lo
    } else if val > hi {
        val - hi
    } else {
        0.0
    }
}

/// Move `cur` toward `des` by at most `limit * dt`.
///
/// Returns `cur` unchanged when `dt <= 0` or `limit < 0`.
#[inline]
pub fn slew_rate_limit(cur: f64, des: f64, limit: f64, dt: f64) -> f64 {
    if dt <= 0.0 || limit < 0.0 {
        return cur;
    }
    let rate = saturate((des - cur) / dt, -limit, limit);
    cur + rate * dt
}

/// Rotate a planar vector by `yaw` radians (counter-clockwise).
#[inline]
pub fn rot2d(yaw: f64, p: (f64, f64)) -> (f64, f64) {
    let (s, c) = yaw.sin_cos();
    (c * p.0 - s * p.1, s * p.0 + c * p.1)
}

/// Nominal tick period in seconds for a loop rate in Hz.
#[inline]
pub fn period_s(rate_hz: f64) -> f64 {
    1.0 / rate_hz
}

/// Tick period as a `Duration`; `None` when the rate is not positive or is
/// too slow for the period to fit.
pub fn tick_period(rate_hz: f64) -> Option<Duration> {
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(period_s(rate_hz)).ok()
}
