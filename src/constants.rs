//! Physical constants in SI units.

/// Speed of light in vacuum (m/s).
pub const C0: f64 = 299_792_458.0;
