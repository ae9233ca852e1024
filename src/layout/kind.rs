use std::fmt;

/// One of the twelve coordinate-system layouts a cube field can take.
///
/// Names serialize as snake_case. Unknown names deserialize to [`LayoutKind::Cube`], the
/// axis-aligned lattice, with a warning instead of failing the whole scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayoutKind {
    Cube,
    Sphere,
    Cylinder,
    EllipticCylindrical,
    ParabolicCylindrical,
    Paraboloidal,
    Ellipsoidal,
    OblateSpheroidal,
    ProlateSpheroidal,
    Bispherical,
    Conical,
    Scatter,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 12] = [
        Self::Cube,
        Self::Sphere,
        Self::Cylinder,
        Self::EllipticCylindrical,
        Self::ParabolicCylindrical,
        Self::Paraboloidal,
        Self::Ellipsoidal,
        Self::OblateSpheroidal,
        Self::ProlateSpheroidal,
        Self::Bispherical,
        Self::Conical,
        Self::Scatter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::EllipticCylindrical => "elliptic_cylindrical",
            Self::ParabolicCylindrical => "parabolic_cylindrical",
            Self::Paraboloidal => "paraboloidal",
            Self::Ellipsoidal => "ellipsoidal",
            Self::OblateSpheroidal => "oblate_spheroidal",
            Self::ProlateSpheroidal => "prolate_spheroidal",
            Self::Bispherical => "bispherical",
            Self::Conical => "conical",
            Self::Scatter => "scatter",
        }
    }

    /// Strict lookup. Case, `_` and `-` are ignored, so `ellipticCylindrical` also matches.
    pub fn parse(name: &str) -> Option<Self> {
        let compact: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|k| k.name().replace('_', "") == compact)
    }

    /// Lenient lookup used for scene data: unknown names become the lattice.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(layout = name, "unknown layout, falling back to cube lattice");
            Self::Cube
        })
    }

    /// Layouts whose instances are rotated to face the coordinate origin. These take the
    /// look-at write path; the rest take the scale-plus-translation path.
    pub fn orients_to_origin(self) -> bool {
        matches!(
            self,
            Self::Sphere
                | Self::Cylinder
                | Self::Ellipsoidal
                | Self::OblateSpheroidal
                | Self::ProlateSpheroidal
                | Self::Bispherical
                | Self::Conical
        )
    }

    /// Layouts placed by the time-shifted linear instance index rather than the grid cell.
    pub fn is_linear_indexed(self) -> bool {
        matches!(self, Self::Sphere | Self::Cylinder | Self::Scatter)
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for LayoutKind {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<LayoutKind> for String {
    fn from(kind: LayoutKind) -> Self {
        kind.name().to_string()
    }
}
