//! Zoom and base scaling shared by all commands of one handler.

/// Default zoom: a grid size of 10 maps to a factor of 1.
pub const DEFAULT_ZOOM_FACTOR: f64 = 1.0;

/// Zoom multiplier plus the backend base scale.
///
/// The zoom factor multiplies every coordinate. The scaling factor is a
/// uniform transform each backend installs on its own surface; renderers
/// track what they installed so repeated passes do not compound it.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomContext {
    zoom_factor: f64,
    scaling_factor: f64,
}

impl Default for ZoomContext {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_FACTOR, 1.0)
    }
}

impl ZoomContext {
    pub fn new(zoom_factor: f64, scaling_factor: f64) -> Self {
        Self {
            zoom_factor: zoom_factor.max(0.0),
            scaling_factor: if scaling_factor > 0.0 { scaling_factor } else { 1.0 },
        }
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// Negative factors are clamped to zero.
    pub fn set_zoom_factor(&mut self, zoom_factor: f64) {
        self.zoom_factor = zoom_factor.max(0.0);
    }

    pub fn scaling_factor(&self) -> f64 {
        self.scaling_factor
    }

    /// Change the base scale; renderers reinstall it on their next pass.
    ///
    /// Non-positive factors are ignored.
    pub fn set_scaling(&mut self, scaling_factor: f64) {
        if scaling_factor <= 0.0 {
            log::debug!("ignoring non-positive scaling factor {scaling_factor}");
            return;
        }
        self.scaling_factor = scaling_factor;
    }

    /// Multiply a diagram coordinate by the zoom factor.
    pub fn zoom(&self, value: f64) -> f64 {
        value * self.zoom_factor
    }
}
