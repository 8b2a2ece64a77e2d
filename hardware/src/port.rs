use nalgebra::Vector3;
use rotations::prelude::{Quaternion, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::HardwareErrors;

/// Identity and mounting of a sensor or actuator.
///
/// `orientation` rotates port axes onto body axes: `orientation.rotate(v)` takes a
/// vector measured along the port axes into the body frame, `transform` goes the
/// other way. The position is informational.
#[derive(Debug, Clone, PartialEq)]
pub struct PortDescriptor {
    pub name: String,
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortBuilder {
    pub name: String,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default = "identity")]
    pub orientation: [f64; 4],
}

fn identity() -> [f64; 4] {
    Quaternion::IDENTITY.into()
}

impl PortBuilder {
    /// Tolerance on the norm of a configured orientation quaternion.
    pub const ORIENTATION_TOL: f64 = 1e-6;

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            position: [0.0; 3],
            orientation: identity(),
        }
    }

    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    /// Orientation as a scalar first quaternion `[q0, q1, q2, q3]`.
    pub fn with_orientation(mut self, orientation: [f64; 4]) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn build(&self) -> Result<PortDescriptor, HardwareErrors> {
        if self.name.is_empty() {
            return Err(HardwareErrors::EmptyName);
        }
        if self.position.iter().any(|v| !v.is_finite()) {
            return Err(HardwareErrors::NonFinite(self.name.clone()));
        }
        let orientation =
            UnitQuaternion::from_near_unit(self.orientation.into(), Self::ORIENTATION_TOL)
                .map_err(|source| HardwareErrors::Orientation {
                    name: self.name.clone(),
                    source,
                })?;
        Ok(PortDescriptor {
            name: self.name.clone(),
            position: Vector3::from(self.position),
            orientation,
        })
    }
}

/// Fails on the first name that appears twice.
pub fn check_unique_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), HardwareErrors> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(HardwareErrors::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}

pub(crate) fn check_finite(name: &str, v: &[f64]) -> Result<(), HardwareErrors> {
    if v.iter().any(|x| !x.is_finite()) {
        return Err(HardwareErrors::NonFinite(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults() {
        let port = PortBuilder::new("mag").build().unwrap();
        assert_eq!(port.orientation, UnitQuaternion::IDENTITY);
        assert_eq!(port.position, Vector3::zeros());
    }

    #[test]
    fn test_port_rejects_non_unit_orientation() {
        let result = PortBuilder::new("wheel")
            .with_orientation([0.0, 0.0, 0.0, 0.0])
            .build();
        assert!(matches!(result, Err(HardwareErrors::Orientation { .. })));
    }

    #[test]
    fn test_duplicate_names() {
        assert!(check_unique_names(["a", "b", "c"]).is_ok());
        assert!(matches!(
            check_unique_names(["a", "b", "a"]),
            Err(HardwareErrors::DuplicateName(name)) if name == "a"
        ));
    }
}
