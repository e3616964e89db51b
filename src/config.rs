//! Shared tolerances, layer planning and engine configuration

use crate::error::{Error, Result};

/// Geometric tolerance shared by every robustness decision in the crate
///
/// Used for near-zero vector magnitudes, near-zero offsets, intersection
/// parameters close to 0 or 1, and "touching is not colliding" in free-path
/// queries. Exact point equality is still used for structural dedup.
pub const EPSILON: f64 = 1e-5;

/// Default accuracy factor for the accelerated backend's bisection depth
pub const DEFAULT_ACCURACY: f64 = 20.0;

/// Default lower bound for the accelerated backend's bisection depth
pub const MIN_TREE_DEPTH: u32 = 4;

/// Default upper bound for the accelerated backend's bisection depth
pub const MAX_TREE_DEPTH: u32 = 16;

/// Ceiling that ignores floating point noise just above an integer
///
/// `ceil_tolerant(5.000000001)` is 5, whereas `f64::ceil` would give 6.
pub fn ceil_tolerant(value: f64) -> usize {
    if value <= 0.0 {
        return 0;
    }
    let floor = value.floor();
    if value - floor < EPSILON {
        floor as usize
    } else {
        floor as usize + 1
    }
}

/// Compute the Z heights of all layers, from `maxz` down to `minz`
///
/// The number of layers is `1 + ceil(|maxz - minz| / dz)` and the step is
/// evened out so the last layer lands exactly on `minz`. A Z range narrower
/// than [`EPSILON`] gives a single layer at `maxz`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for a non-positive or non-finite `dz`, or
/// when `maxz < minz`.
///
/// # Example
///
/// ```
/// use waterline::config::layer_heights;
///
/// let layers = layer_heights(0.0, 10.0, 2.0).unwrap();
/// assert_eq!(layers, vec![10.0, 8.0, 6.0, 4.0, 2.0, 0.0]);
/// ```
pub fn layer_heights(minz: f64, maxz: f64, dz: f64) -> Result<Vec<f64>> {
    if !(dz.is_finite() && dz > 0.0) {
        return Err(Error::invalid_config_value("dz", dz, "a positive layer step"));
    }
    if !(minz.is_finite() && maxz.is_finite()) {
        return Err(Error::InvalidConfig(format!(
            "Z range {}..{} is not finite",
            minz, maxz
        )));
    }
    if maxz < minz - EPSILON {
        return Err(Error::InvalidConfig(format!(
            "Z range is inverted: minz {} is above maxz {}",
            minz, maxz
        )));
    }

    let mut diff = (maxz - minz).abs();
    if diff < EPSILON {
        diff = 0.0;
    }
    let count = 1 + ceil_tolerant(diff / dz);
    let step = diff / (count - 1).max(1) as f64;

    Ok((0..count).map(|i| maxz - i as f64 * step).collect())
}

/// Collision backend used for the final free-path queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Exact per-triangle sweep ([`crate::collision::TriangleScan`])
    #[default]
    TriangleScan,
    /// parry3d mesh with recursive bisection ([`crate::collision::AcceleratedScan`])
    #[cfg(feature = "mesh-ops")]
    Accelerated,
}

/// Configuration for a waterline computation
///
/// # Example
///
/// ```
/// use waterline::config::{Backend, WaterlineConfig};
///
/// let config = WaterlineConfig::new()
///     .with_backend(Backend::TriangleScan)
///     .with_accuracy(10.0);
/// assert_eq!(config.accuracy, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaterlineConfig {
    /// Backend for free-path queries
    pub backend: Backend,
    /// Accuracy factor for the accelerated backend's bisection depth
    pub accuracy: f64,
    /// Smallest bisection depth
    pub min_depth: u32,
    /// Largest bisection depth
    pub max_depth: u32,
}

impl WaterlineConfig {
    /// Create a configuration with the exact backend and default depth limits
    pub fn new() -> Self {
        Self {
            backend: Backend::default(),
            accuracy: DEFAULT_ACCURACY,
            min_depth: MIN_TREE_DEPTH,
            max_depth: MAX_TREE_DEPTH,
        }
    }

    /// Select the free-path backend
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the accuracy factor of the accelerated backend
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Set the bisection depth limits of the accelerated backend
    pub fn with_depth_limits(mut self, min_depth: u32, max_depth: u32) -> Self {
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    /// Check the settings for consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.accuracy.is_finite() && self.accuracy > 0.0) {
            return Err(Error::invalid_config_value(
                "accuracy",
                self.accuracy,
                "a positive factor",
            ));
        }
        if self.min_depth > self.max_depth {
            return Err(Error::InvalidConfig(format!(
                "minimum depth {} exceeds maximum depth {}",
                self.min_depth, self.max_depth
            )));
        }
        Ok(())
    }

    /// Bisection depth for a model of size `model_dim` and a tool of `radius`
    ///
    /// `ceil(log2(accuracy * model_dim / radius))`, clamped to the depth
    /// limits. A zero radius needs the finest resolution.
    pub fn tree_depth(&self, model_dim: f64, radius: f64) -> u32 {
        if radius <= 0.0 || model_dim <= 0.0 {
            return if radius <= 0.0 {
                self.max_depth
            } else {
                self.min_depth
            };
        }
        let depth = (self.accuracy * model_dim / radius).log2().ceil();
        if depth <= self.min_depth as f64 {
            self.min_depth
        } else if depth >= self.max_depth as f64 {
            self.max_depth
        } else {
            depth as u32
        }
    }
}

impl Default for WaterlineConfig {
    fn default() -> Self {
        Self::new()
    }
}
