//! Magnet cavity layout.

use crate::errors::ConfigError;
use crate::float_types::Real;
use crate::mesh::Prism;
use crate::params::{LabelSpec, MagnetLayout};
use crate::sketch::Sketch;
use nalgebra::Point2;

/// A disc-shaped void receiving one magnet, open to the back of the plate.
#[derive(Clone, Debug, PartialEq)]
pub struct MagnetCavity {
    pub center: Point2<Real>,
    /// Magnet diameter plus tolerance.
    pub diameter: Real,
    /// Starts below the plate's bottom face so the cut leaves no skin.
    pub z_min: Real,
    /// Reaches from `z_min` to exactly the magnet height.
    pub height: Real,
}

impl MagnetCavity {
    pub fn radius(&self) -> Real {
        0.5 * self.diameter
    }

    pub fn z_max(&self) -> Real {
        self.z_min + self.height
    }

    /// The cavity as a cut prism with `segments` around its circumference.
    pub fn to_prism(&self, segments: usize) -> Prism {
        Prism::new(
            Sketch::circle(self.radius(), segments).translate(self.center.x, self.center.y),
            self.z_min,
            self.z_max(),
        )
    }
}

/// Cavity positions for the configured magnet layout.
///
/// Two magnets sit at `(±(w/2 − inset), 0)`; four at every sign
/// combination of `(±(w/2 − inset), ±(h/2 − inset))`. Fitting the cavities
/// inside the plate is checked by [`LabelSpec::validate`], not here.
pub fn magnet_cavities(spec: &LabelSpec) -> Result<Vec<MagnetCavity>, ConfigError> {
    let x = 0.5 * spec.label_width - spec.magnet_inset;
    let y = 0.5 * spec.label_height - spec.magnet_inset;
    let centers: Vec<Point2<Real>> = match spec.magnet_layout()? {
        MagnetLayout::Two => vec![Point2::new(-x, 0.0), Point2::new(x, 0.0)],
        MagnetLayout::Four => vec![
            Point2::new(-x, -y),
            Point2::new(x, -y),
            Point2::new(x, y),
            Point2::new(-x, y),
        ],
    };

    let overcut = spec.boolean_epsilon;
    Ok(centers
        .into_iter()
        .map(|center| MagnetCavity {
            center,
            diameter: spec.cavity_diameter(),
            z_min: -overcut,
            height: spec.magnet_height + overcut,
        })
        .collect())
}
