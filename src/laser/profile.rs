//! Analytic laser profiles.
//!
//! A profile describes the laser field in the injection plane as an
//! envelope times an oscillating carrier. The temporal part is evaluated
//! once per step; the transverse shape is evaluated per cell.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::math::smooth_step;
use crate::{Error, Float3, Result};

/// Direction of the laser E field in the injection plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarisation {
    /// E along x
    #[default]
    LinearX,
    /// E along z
    LinearZ,
    /// E rotating in the x-z plane
    Circular,
}

impl Polarisation {
    /// E direction for carrier phase `arg`, scaled to unit amplitude.
    fn components(&self, arg: f64) -> [f64; 3] {
        match self {
            Polarisation::LinearX => [arg.sin(), 0.0, 0.0],
            Polarisation::LinearZ => [0.0, 0.0, arg.sin()],
            Polarisation::Circular => [arg.sin() * FRAC_1_SQRT_2, 0.0, arg.cos() * FRAC_1_SQRT_2],
        }
    }
}

/// Transverse shape of the laser in the injection plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transverse {
    /// Same value in every cell
    Uniform,
    /// `exp(-r^2 / w0^2)` around the centre of the global domain
    Gaussian {
        /// Beam waist (m)
        w0: f64,
    },
}

/// Plane wave with smooth up and down ramps around a flat plateau.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneWave {
    /// Peak field amplitude (V/m)
    pub amplitude: f64,
    /// Wave length (m)
    pub wave_length: f64,
    /// Ramp width (s)
    pub pulse_length: f64,
    /// Total ramp duration in units of `pulse_length`, split between up and down ramp
    pub ramp_init: f64,
    /// Duration of the flat part (s)
    pub plateau: f64,
    /// Polarisation
    pub polarisation: Polarisation,
    /// Carrier phase (rad)
    pub phase: f64,
}

impl PlaneWave {
    /// Plane wave without plateau.
    pub fn new(amplitude: f64, wave_length: f64, pulse_length: f64) -> Self {
        Self {
            amplitude,
            wave_length,
            pulse_length,
            ramp_init: 20.6146,
            plateau: 0.0,
            polarisation: Polarisation::LinearX,
            phase: 0.0,
        }
    }

    /// Set the total ramp duration in pulse lengths.
    pub fn with_ramp_init(mut self, ramp_init: f64) -> Self {
        self.ramp_init = ramp_init;
        self
    }

    /// Set the plateau duration.
    pub fn with_plateau(mut self, plateau: f64) -> Self {
        self.plateau = plateau;
        self
    }

    /// Set polarisation.
    pub fn with_polarisation(mut self, polarisation: Polarisation) -> Self {
        self.polarisation = polarisation;
        self
    }

    /// Set carrier phase.
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    fn init_time(&self) -> f64 {
        self.ramp_init * self.pulse_length + self.plateau
    }

    fn envelope(&self, t: f64) -> f64 {
        let ramp = 0.5 * self.ramp_init * self.pulse_length;
        let up = 0.5 * ramp;
        let down = ramp + self.plateau + 0.5 * ramp;
        let tau = self.pulse_length as f32;
        let rising = smooth_step(t as f32, up as f32, tau);
        let falling = smooth_step(-(t as f32), -(down as f32), tau);
        (rising * falling) as f64
    }
}

/// Gaussian pulse with Gaussian transverse profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBeam {
    /// Peak field amplitude (V/m)
    pub amplitude: f64,
    /// Wave length (m)
    pub wave_length: f64,
    /// Temporal sigma of the intensity envelope (s)
    pub pulse_length: f64,
    /// Injection duration in units of `pulse_length`; the peak passes at half of it
    pub pulse_init: f64,
    /// Beam waist (m)
    pub w0: f64,
    /// Polarisation
    pub polarisation: Polarisation,
    /// Carrier phase (rad)
    pub phase: f64,
}

impl GaussianBeam {
    /// Gaussian beam with the default injection duration of 20 pulse lengths.
    pub fn new(amplitude: f64, wave_length: f64, pulse_length: f64, w0: f64) -> Self {
        Self {
            amplitude,
            wave_length,
            pulse_length,
            pulse_init: 20.0,
            w0,
            polarisation: Polarisation::LinearX,
            phase: 0.0,
        }
    }

    /// Set the injection duration in pulse lengths.
    pub fn with_pulse_init(mut self, pulse_init: f64) -> Self {
        self.pulse_init = pulse_init;
        self
    }

    /// Set polarisation.
    pub fn with_polarisation(mut self, polarisation: Polarisation) -> Self {
        self.polarisation = polarisation;
        self
    }

    /// Set carrier phase.
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    fn init_time(&self) -> f64 {
        self.pulse_init * self.pulse_length
    }

    fn envelope(&self, t: f64) -> f64 {
        let mu = 0.5 * self.init_time();
        let x = (t - mu) / self.pulse_length;
        (-0.5 * x * x).exp()
    }
}

/// Laser selected for the run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LaserProfile {
    /// No laser; injection never runs
    #[default]
    None,
    /// Plane wave
    PlaneWave(PlaneWave),
    /// Gaussian beam
    GaussianBeam(GaussianBeam),
}

impl LaserProfile {
    /// Profile name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            LaserProfile::None => "none",
            LaserProfile::PlaneWave(_) => "plane wave",
            LaserProfile::GaussianBeam(_) => "gaussian beam",
        }
    }

    /// Duration (s) during which the laser is injected. Zero disables the laser.
    pub fn init_time(&self) -> f64 {
        match self {
            LaserProfile::None => 0.0,
            LaserProfile::PlaneWave(p) => p.init_time(),
            LaserProfile::GaussianBeam(g) => g.init_time(),
        }
    }

    /// True for the no-op profile.
    pub fn is_disabled(&self) -> bool {
        self.init_time() == 0.0
    }

    /// Check lengths and durations.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::Config(format!(
                    "{} of {} laser must be positive, got {v}",
                    name,
                    self.name()
                )))
            }
        };
        match self {
            LaserProfile::None => Ok(()),
            LaserProfile::PlaneWave(p) => {
                positive("wave length", p.wave_length)?;
                positive("pulse length", p.pulse_length)?;
                positive("ramp init", p.ramp_init)?;
                if !(p.plateau.is_finite() && p.plateau >= 0.0) {
                    return Err(Error::Config(format!(
                        "plateau of plane wave laser must not be negative, got {}",
                        p.plateau
                    )));
                }
                Ok(())
            }
            LaserProfile::GaussianBeam(g) => {
                positive("wave length", g.wave_length)?;
                positive("pulse length", g.pulse_length)?;
                positive("pulse init", g.pulse_init)?;
                positive("waist", g.w0)
            }
        }
    }

    /// Temporal part of the field (envelope x carrier x amplitude) at time `t`
    /// for propagation speed `c`.
    pub fn time_part(&self, t: f64, c: f64) -> Float3 {
        let (amplitude, envelope, wave_length, phase, polarisation) = match self {
            LaserProfile::None => return [0.0; 3],
            LaserProfile::PlaneWave(p) => {
                (p.amplitude, p.envelope(t), p.wave_length, p.phase, p.polarisation)
            }
            LaserProfile::GaussianBeam(g) => {
                (g.amplitude, g.envelope(t), g.wave_length, g.phase, g.polarisation)
            }
        };
        let omega = 2.0 * PI * c / wave_length;
        let e = polarisation.components(omega * t + phase);
        let scale = amplitude * envelope;
        [
            (scale * e[0]) as f32,
            (scale * e[1]) as f32,
            (scale * e[2]) as f32,
        ]
    }

    /// Transverse shape.
    pub fn transverse(&self) -> Transverse {
        match self {
            LaserProfile::GaussianBeam(g) => Transverse::Gaussian { w0: g.w0 },
            _ => Transverse::Uniform,
        }
    }
}
