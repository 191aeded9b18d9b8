//! The layout engine: pure placement math for gallery views.
//!
//! Given an ordered collection of records, a mode, and a random source,
//! [`arrange`] attaches a 3D position and rotation to every element without
//! reordering or touching the elements themselves. Nothing here performs
//! I/O or holds state; placements are recomputed on every call, so the
//! engine is trivially reentrant.
//!
//! Randomness is part of the design for `grid`, `sphere`, and `web` (fresh
//! scatter on every mode switch). The random source is an explicit
//! parameter so callers that need reproducible output, tests first among
//! them, can pass a seeded generator.

mod connections;
mod shapes;

pub use connections::connections;

use rand::Rng;

/// An `[x, y, z]` triple.
pub type Vec3 = [f64; 3];

/// Position and rotation computed for one element.
///
/// The rotation is meaningful only for layouts whose cards are not
/// billboarded by the renderer; `web` emits zero rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Vec3,
}

/// The fixed set of placement algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    Spiral,
    Grid,
    Sphere,
    Wave,
    #[default]
    Web,
}

impl LayoutMode {
    /// Parse a mode selector. Unrecognized values fall back to [`Web`],
    /// the gallery's default view, rather than erroring.
    ///
    /// [`Web`]: LayoutMode::Web
    pub fn parse(s: &str) -> Self {
        match s {
            "spiral" => Self::Spiral,
            "grid" => Self::Grid,
            "sphere" => Self::Sphere,
            "wave" => Self::Wave,
            _ => Self::Web,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spiral => "spiral",
            Self::Grid => "grid",
            Self::Sphere => "sphere",
            Self::Wave => "wave",
            Self::Web => "web",
        }
    }

    /// Whether the mode draws from the random source. `spiral` and `wave`
    /// are closed-form and identical on every call.
    pub fn is_randomized(self) -> bool {
        matches!(self, Self::Grid | Self::Sphere | Self::Web)
    }
}

/// Compute placements for `n` elements in the given mode.
///
/// Zero elements yield an empty vector; a single element lands at the
/// formula's index-0 position, not a special-cased center.
pub fn placements<R: Rng + ?Sized>(mode: LayoutMode, n: usize, rng: &mut R) -> Vec<Placement> {
    match mode {
        LayoutMode::Spiral => shapes::spiral(n),
        LayoutMode::Grid => shapes::grid(n, rng),
        LayoutMode::Sphere => shapes::sphere(n, rng),
        LayoutMode::Wave => shapes::wave(n),
        LayoutMode::Web => shapes::web(n, rng),
    }
}

/// Attach a placement to every element, preserving order and identity.
pub fn arrange<T, R: Rng + ?Sized>(
    items: Vec<T>,
    mode: LayoutMode,
    rng: &mut R,
) -> Vec<(T, Placement)> {
    let placements = placements(mode, items.len(), rng);
    items.into_iter().zip(placements).collect()
}
