// Our Real scalar type. Every dimension in this crate is in millimeters.
pub type Real = f64;

/// Tolerance for geometric comparisons (point equality, degenerate radii).
pub const EPSILON: Real = 1e-9;

/// Default over-extension applied to boolean cuts so no face is left
/// coincident with the face it cuts through.
pub const DEFAULT_BOOLEAN_EPSILON: Real = 0.01;

// Pi
/// Archimedes' constant (π)
pub const PI: Real = core::f64::consts::PI;

// Frac Pi 2
/// π/2
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;

/// π/4
pub const FRAC_PI_4: Real = core::f64::consts::FRAC_PI_4;

// Tau
/// The full circle constant (τ)
pub const TAU: Real = core::f64::consts::TAU;
