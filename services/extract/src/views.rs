//! Camera views of the Waymo vehicle.
//!
//! The dataset encodes each camera as a small integer (`CameraName.Name` in
//! the frame schema). Only the five physical cameras map to a view; every
//! other code, including `0` (UNKNOWN), is invalid.

use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// One of the five cameras mounted on the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum CameraView {
    #[value(name = "front")]
    Front,
    #[value(name = "front_left")]
    FrontLeft,
    #[value(name = "front_right")]
    FrontRight,
    #[value(name = "side_left")]
    SideLeft,
    #[value(name = "side_right")]
    SideRight,
}

/// Code/view table, ordered by code.
const VIEW_TABLE: [(i32, CameraView); 5] = [
    (1, CameraView::Front),
    (2, CameraView::FrontLeft),
    (3, CameraView::FrontRight),
    (4, CameraView::SideLeft),
    (5, CameraView::SideRight),
];

impl CameraView {
    /// Map a dataset camera code to its view, if the code is recognized.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Front),
            2 => Some(Self::FrontLeft),
            3 => Some(Self::FrontRight),
            4 => Some(Self::SideLeft),
            5 => Some(Self::SideRight),
            _ => None,
        }
    }

    /// Dataset camera code for this view.
    pub const fn code(self) -> i32 {
        match self {
            Self::Front => 1,
            Self::FrontLeft => 2,
            Self::FrontRight => 3,
            Self::SideLeft => 4,
            Self::SideRight => 5,
        }
    }

    /// Canonical name used on the command line and in output file names.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::FrontLeft => "front_left",
            Self::FrontRight => "front_right",
            Self::SideLeft => "side_left",
            Self::SideRight => "side_right",
        }
    }

    /// All views in code order. Returns a new vector on every call.
    pub fn all() -> Vec<Self> {
        VIEW_TABLE.iter().map(|(_, view)| *view).collect()
    }
}

impl fmt::Display for CameraView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown view name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown camera view: {0}")]
pub struct UnknownView(pub String);

impl FromStr for CameraView {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VIEW_TABLE
            .iter()
            .map(|(_, view)| *view)
            .find(|view| view.name() == s)
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}

/// Set of requested views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSet {
    mask: u8,
}

impl ViewSet {
    pub fn new(views: impl IntoIterator<Item = CameraView>) -> Self {
        let mut set = Self::default();
        for view in views {
            set.insert(view);
        }
        set
    }

    pub fn all() -> Self {
        Self::new(CameraView::all())
    }

    pub fn insert(&mut self, view: CameraView) {
        self.mask |= 1 << view.code();
    }

    pub fn contains(&self, view: CameraView) -> bool {
        self.mask & (1 << view.code()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Requested views in code order.
    pub fn iter(&self) -> impl Iterator<Item = CameraView> + '_ {
        VIEW_TABLE
            .iter()
            .map(|(_, view)| *view)
            .filter(move |view| self.contains(*view))
    }
}

impl FromIterator<CameraView> for ViewSet {
    fn from_iter<I: IntoIterator<Item = CameraView>>(iter: I) -> Self {
        Self::new(iter)
    }
}
