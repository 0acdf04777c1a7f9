//! Second-order low-pass filter designed at runtime with the bilinear transform.
//!
//! The continuous prototype `H(s) = gain * w0² / (s² + (w0/q) s + w0²)` is
//! mapped to the z-plane pole by pole, padded with zeros at `z = -1`, and run
//! as a transposed direct-form II recursion with two memory registers:
//!
//! ```text
//! y[n]  = cxn * x[n] + z0
//! z0   <- -y[n] * cy0 + x[n] * cx0 + z1
//! z1   <- -y[n] * cy1 + x[n] * cx1
//! ```
//!
//! Memory starts `Uninitialized` and is primed with the steady-state response
//! of the first sample, so a filter fed a constant never shows a start-up
//! transient.

use std::f64::consts::{FRAC_1_SQRT_2, TAU};

use num_complex::Complex64;

use crate::error::FilterError;

/// Butterworth quality factor (maximally flat, no peaking).
pub const DEFAULT_QUALITY: f64 = FRAC_1_SQRT_2;

/// Relative imaginary residue in the discrete gain above which we warn.
const GAIN_IMAG_TOLERANCE: f64 = 1e-9;

/// Continuous-domain design parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterDesign {
    /// Sample period in seconds.
    pub dt: f64,
    /// Cutoff (natural) frequency in Hz.
    pub freq_hz: f64,
    /// Static (DC) gain.
    pub gain: f64,
    /// Quality factor; `zeta = 1 / (2 q)`.
    pub quality: f64,
}

impl FilterDesign {
    pub fn new(dt: f64, freq_hz: f64) -> Self {
        Self {
            dt,
            freq_hz,
            gain: 1.0,
            quality: DEFAULT_QUALITY,
        }
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(FilterError::InvalidConfiguration(format!(
                "dt must be > 0 and finite, got {}",
                self.dt
            )));
        }
        if !(self.freq_hz.is_finite() && self.freq_hz > 0.0) {
            return Err(FilterError::InvalidConfiguration(format!(
                "freq_hz must be > 0 and finite, got {}",
                self.freq_hz
            )));
        }
        if !(self.quality.is_finite() && self.quality > 0.0) {
            return Err(FilterError::InvalidConfiguration(format!(
                "quality must be > 0 and finite, got {}",
                self.quality
            )));
        }
        if !self.gain.is_finite() {
            return Err(FilterError::InvalidConfiguration(format!(
                "gain must be finite, got {}",
                self.gain
            )));
        }
        Ok(())
    }

    /// Damping ratio.
    pub fn zeta(&self) -> f64 {
        1.0 / (2.0 * self.quality)
    }

    /// Natural frequency in rad/s.
    pub fn w0(&self) -> f64 {
        TAU * self.freq_hz
    }

    /// s-plane pole pair; complex conjugates when `quality > 0.5`.
    pub fn continuous_poles(&self) -> [Complex64; 2] {
        let zeta = self.zeta();
        let w0 = self.w0();
        let root = Complex64::new(zeta * zeta - 1.0, 0.0).sqrt();
        [-w0 * (zeta + root), -w0 * (zeta - root)]
    }
}

/// Normalized recursion coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub cxn: f64,
    pub cx0: f64,
    pub cx1: f64,
    pub cy0: f64,
    pub cy1: f64,
}

impl Coefficients {
    /// Steady-state output for a constant input `x`.
    #[inline]
    pub fn steady_state(&self, x: f64) -> f64 {
        x * (self.cxn + self.cx0 + self.cx1) / (1.0 + self.cy0 + self.cy1)
    }
}

/// Recursion memory.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FilterMemory {
    #[default]
    Uninitialized,
    Ready { z0: f64, z1: f64 },
}

/// Runtime-designed second-order low-pass.
#[derive(Debug, Clone)]
pub struct SecondOrderLowPass {
    design: FilterDesign,
    coeffs: Coefficients,
    poles: [Complex64; 2],
    zeros: [Complex64; 2],
    gain: f64,
    memory: FilterMemory,
}

impl SecondOrderLowPass {
    /// Unity-gain Butterworth filter.
    pub fn new(dt: f64, freq_hz: f64) -> Result<Self, FilterError> {
        Self::configure(dt, freq_hz, 1.0, DEFAULT_QUALITY)
    }

    pub fn configure(dt: f64, freq_hz: f64, gain: f64, quality: f64) -> Result<Self, FilterError> {
        Self::from_design(FilterDesign {
            dt,
            freq_hz,
            gain,
            quality,
        })
    }

    pub fn from_design(design: FilterDesign) -> Result<Self, FilterError> {
        design.validate()?;
        let fs2 = 2.0 / design.dt;
        let s_poles = design.continuous_poles();
        let w0 = design.w0();
        let s_gain = design.gain * w0 * w0;

        // Bilinear map, pole by pole
        let poles = s_poles.map(|p| {
            let half = p * design.dt / 2.0;
            (1.0 + half) / (1.0 - half)
        });
        // No finite s-plane zeros: both land at Nyquist
        let zeros = [Complex64::new(-1.0, 0.0); 2];

        let g = s_poles
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, &p| acc / (fs2 - p))
            * s_gain;
        if g.im.abs() > GAIN_IMAG_TOLERANCE * g.re.abs().max(f64::MIN_POSITIVE) {
            tracing::warn!(
                re = g.re,
                im = g.im,
                "discrete gain has an imaginary residue; keeping the real part"
            );
        }
        let gain = g.re;

        let b = expand_monic(&zeros);
        let a = expand_monic(&poles);
        let lead = a[0].re;
        let coeffs = Coefficients {
            cxn: gain * b[0].re / lead,
            cx0: gain * b[1].re / lead,
            cx1: gain * b[2].re / lead,
            cy0: a[1].re / lead,
            cy1: a[2].re / lead,
        };

        tracing::debug!(
            dt = design.dt,
            freq_hz = design.freq_hz,
            quality = design.quality,
            cxn = coeffs.cxn,
            cy0 = coeffs.cy0,
            cy1 = coeffs.cy1,
            "filter designed"
        );

        Ok(Self {
            design,
            coeffs,
            poles,
            zeros,
            gain,
            memory: FilterMemory::Uninitialized,
        })
    }

    /// Redesign in place; memory returns to `Uninitialized`.
    ///
    /// On error the filter is left untouched.
    pub fn reconfigure(
        &mut self,
        dt: f64,
        freq_hz: f64,
        gain: f64,
        quality: f64,
    ) -> Result<(), FilterError> {
        *self = Self::configure(dt, freq_hz, gain, quality)?;
        Ok(())
    }

    /// Forget the recursion memory; the next sample re-primes it.
    pub fn reset(&mut self) {
        self.memory = FilterMemory::Uninitialized;
    }

    /// Consume one sample and return one filtered sample.
    pub fn filter_val(&mut self, x: f64) -> f64 {
        let c = self.coeffs;
        let (z0, z1) = match self.memory {
            FilterMemory::Ready { z0, z1 } => (z0, z1),
            FilterMemory::Uninitialized => {
                let y = c.steady_state(x);
                let z1 = -y * c.cy1 + x * c.cx1;
                let z0 = -y * c.cy0 + x * c.cx0 + z1;
                (z0, z1)
            }
        };
        let y = x * c.cxn + z0;
        self.memory = FilterMemory::Ready {
            z0: -y * c.cy0 + x * c.cx0 + z1,
            z1: -y * c.cy1 + x * c.cx1,
        };
        y
    }

    pub fn design(&self) -> &FilterDesign {
        &self.design
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coeffs
    }

    pub fn discrete_poles(&self) -> &[Complex64; 2] {
        &self.poles
    }

    pub fn discrete_zeros(&self) -> &[Complex64; 2] {
        &self.zeros
    }

    /// Discrete gain correction applied to the numerator.
    pub fn discrete_gain(&self) -> f64 {
        self.gain
    }

    pub fn memory(&self) -> FilterMemory {
        self.memory
    }

    pub fn is_primed(&self) -> bool {
        matches!(self.memory, FilterMemory::Ready { .. })
    }
}

/// Expand `Π (x - r)` into polynomial coefficients, highest power first.
///
/// An empty root set yields `[1]`.
pub fn expand_monic(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = Vec::with_capacity(roots.len() + 1);
    coeffs.push(Complex64::new(1.0, 0.0));
    for r in roots {
        coeffs.push(Complex64::new(0.0, 0.0));
        for k in (1..coeffs.len()).rev() {
            let prev = coeffs[k - 1];
            coeffs[k] -= r * prev;
        }
    }
    coeffs
}
