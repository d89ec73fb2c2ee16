// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::collections::HashMap;

/// Built-in display names for the solver kernels.
const DEFAULT_KERNEL_NAMES: &[(&str, &str)] = &[
    ("SolveXPBDHydrostatic", "Hydrostatic Solver"),
    ("SolveXPBDDeviatoric", "Deviatoric Solver"),
    ("UpdateSurfaceMesh", "Surface Update"),
    ("UpdateStressVisualization", "Stress Visualization"),
    ("PredictPositions", "Position Prediction"),
    ("CollideSDF", "SDF Collision"),
    ("CollideSDF_PreStep", "SDF Pre-Step"),
    ("CollideParticles", "Particle Collision"),
    ("SolveAttachment", "Attachment Solver"),
    ("ApplyDeltas", "Delta Application"),
    ("XPBDFinalize", "XPBD Finalization"),
    ("UpdateMotionConstraints", "Motion Constraints"),
    ("SolveConstraints", "Constraint Solving"),
    ("ComputeAverageResidual", "Residual Computation"),
    ("SolveStableNeoHookean", "Neo-Hookean Solver"),
    ("UpdateSpatialHash", "Spatial Hashing"),
    ("NormalizeSurfaceNormals", "Normal Computation"),
    ("UpdateSurfaceNormals", "Surface Normals"),
    ("UpdateSurfaceVertices", "Surface Vertices"),
];

/// Maps raw kernel identifiers to human readable names.
#[derive(Clone, Debug)]
pub struct NameMapper {
    names: HashMap<String, String>,
}

impl Default for NameMapper {
    fn default() -> Self {
        Self {
            names: DEFAULT_KERNEL_NAMES
                .iter()
                .map(|(raw, display)| (raw.to_string(), display.to_string()))
                .collect(),
        }
    }
}

impl NameMapper {
    /// Returns a mapper with no entries.
    pub fn empty() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    /// Returns the default mapper extended with `overrides`. Entries in
    /// `overrides` replace built-in names for the same kernel.
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut mapper = Self::default();
        for (raw, display) in overrides {
            mapper.names.insert(raw.clone(), display.clone());
        }
        mapper
    }

    /// Display name for `raw_name`, or `raw_name` itself when unmapped.
    pub fn map<'a>(&'a self, raw_name: &'a str) -> &'a str {
        self.names
            .get(raw_name)
            .map(String::as_str)
            .unwrap_or(raw_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let mapper = NameMapper::default();
        assert_eq!(mapper.map("SolveXPBDHydrostatic"), "Hydrostatic Solver");
        assert_eq!(mapper.map("CollideSDF_PreStep"), "SDF Pre-Step");
        assert_eq!(mapper.map("UpdateSurfaceVertices"), "Surface Vertices");
    }

    #[test]
    fn test_identity_fallback() {
        let mapper = NameMapper::default();
        assert_eq!(mapper.map("MyCustomKernel"), "MyCustomKernel");
        // Lookups are case-sensitive.
        assert_eq!(mapper.map("collidesdf"), "collidesdf");
        assert_eq!(NameMapper::empty().map("CollideSDF"), "CollideSDF");
    }

    #[test]
    fn test_overrides() {
        let overrides: HashMap<String, String> = [
            ("CollideSDF".to_string(), "Collision".to_string()),
            ("Blur".to_string(), "Gaussian Blur".to_string()),
        ]
        .into_iter()
        .collect();
        let mapper = NameMapper::with_overrides(&overrides);
        assert_eq!(mapper.map("CollideSDF"), "Collision");
        assert_eq!(mapper.map("Blur"), "Gaussian Blur");
        assert_eq!(mapper.map("ApplyDeltas"), "Delta Application");
    }
}
