use std::fmt;
use std::str::FromStr;

/// Kind tag carried by every volume axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisKind {
    Domain,
    Space,
    Time,
    List,
    Point,
    Vector,
    CovariantVector,
    Scalar,
    Complex,
    RgbColor,
    Stub,
    #[default]
    Unknown,
}

impl AxisKind {
    /// Axes that index acquisitions rather than positions
    pub fn is_gradient(self) -> bool {
        matches!(self, AxisKind::List | AxisKind::Vector | AxisKind::Point)
    }

    pub fn is_anatomical(self) -> bool {
        matches!(self, AxisKind::Domain | AxisKind::Space)
    }

    pub fn name(self) -> &'static str {
        match self {
            AxisKind::Domain => "domain",
            AxisKind::Space => "space",
            AxisKind::Time => "time",
            AxisKind::List => "list",
            AxisKind::Point => "point",
            AxisKind::Vector => "vector",
            AxisKind::CovariantVector => "covariant-vector",
            AxisKind::Scalar => "scalar",
            AxisKind::Complex => "complex",
            AxisKind::RgbColor => "RGB-color",
            AxisKind::Stub => "stub",
            AxisKind::Unknown => "???",
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AxisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "domain" => AxisKind::Domain,
            "space" => AxisKind::Space,
            "time" => AxisKind::Time,
            "list" => AxisKind::List,
            "point" => AxisKind::Point,
            "vector" => AxisKind::Vector,
            "covariant-vector" => AxisKind::CovariantVector,
            "scalar" => AxisKind::Scalar,
            "complex" => AxisKind::Complex,
            "rgb-color" => AxisKind::RgbColor,
            "stub" => AxisKind::Stub,
            "???" | "none" | "unknown" => AxisKind::Unknown,
            other => return Err(format!("unrecognized axis kind '{other}'")),
        };
        Ok(kind)
    }
}

/// World coordinate frame of a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpaceFrame {
    #[default]
    RightAnteriorSuperior,
    LeftAnteriorSuperior,
    LeftPosteriorSuperior,
    RightAnteriorSuperiorTime,
    LeftAnteriorSuperiorTime,
    LeftPosteriorSuperiorTime,
    ScannerXyz,
    ScannerXyzTime,
    ThreeDRightHanded,
    ThreeDLeftHanded,
}

impl SpaceFrame {
    /// Frames the normalizer knows how to bring to RAS
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            SpaceFrame::RightAnteriorSuperior
                | SpaceFrame::LeftAnteriorSuperior
                | SpaceFrame::LeftPosteriorSuperior
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            SpaceFrame::RightAnteriorSuperior => "right-anterior-superior",
            SpaceFrame::LeftAnteriorSuperior => "left-anterior-superior",
            SpaceFrame::LeftPosteriorSuperior => "left-posterior-superior",
            SpaceFrame::RightAnteriorSuperiorTime => "right-anterior-superior-time",
            SpaceFrame::LeftAnteriorSuperiorTime => "left-anterior-superior-time",
            SpaceFrame::LeftPosteriorSuperiorTime => "left-posterior-superior-time",
            SpaceFrame::ScannerXyz => "scanner-xyz",
            SpaceFrame::ScannerXyzTime => "scanner-xyz-time",
            SpaceFrame::ThreeDRightHanded => "3D-right-handed",
            SpaceFrame::ThreeDLeftHanded => "3D-left-handed",
        }
    }
}

impl fmt::Display for SpaceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpaceFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let frame = match s.trim().to_ascii_lowercase().as_str() {
            "ras" | "right-anterior-superior" => SpaceFrame::RightAnteriorSuperior,
            "las" | "left-anterior-superior" => SpaceFrame::LeftAnteriorSuperior,
            "lps" | "left-posterior-superior" => SpaceFrame::LeftPosteriorSuperior,
            "rast" | "right-anterior-superior-time" => SpaceFrame::RightAnteriorSuperiorTime,
            "last" | "left-anterior-superior-time" => SpaceFrame::LeftAnteriorSuperiorTime,
            "lpst" | "left-posterior-superior-time" => SpaceFrame::LeftPosteriorSuperiorTime,
            "scanner-xyz" => SpaceFrame::ScannerXyz,
            "scanner-xyz-time" => SpaceFrame::ScannerXyzTime,
            "3d-right-handed" => SpaceFrame::ThreeDRightHanded,
            "3d-left-handed" => SpaceFrame::ThreeDLeftHanded,
            other => return Err(format!("unrecognized space '{other}'")),
        };
        Ok(frame)
    }
}
