//! Geometry tags of boundary nodes.
//!
//! A tag records, per axis, on which side the fluid lies:
//! `+1` means the fluid is toward `+axis` and the `-axis` neighbour is cut
//! off, `-1` the reverse, `0` means both neighbours are available.
//!
//! * `Face`: one constrained axis.
//! * `Inner`: two or three constrained axes, the missing set is the
//!   intersection of the face constraints (concave edge or corner).
//! * `Outer`: two or three constrained axes, only the diagonal is missing,
//!   i.e. the union of the face constraints (convex edge or corner).

use std::fmt;

/// Per-axis fluid side of a boundary node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OpenSides([i8; 3]);

impl OpenSides {
    /// Create from per-axis signs in `{-1, 0, 1}`.
    pub fn new(signs: [i8; 3]) -> Self {
        Self([signs[0].signum(), signs[1].signum(), signs[2].signum()])
    }

    /// Sign on `axis`.
    #[inline]
    pub fn get(self, axis: usize) -> i8 {
        self.0[axis]
    }

    /// All three signs.
    #[inline]
    pub fn signs(self) -> [i8; 3] {
        self.0
    }

    /// Number of constrained axes.
    pub fn n_constrained(self) -> usize {
        self.0.iter().filter(|s| **s != 0).count()
    }

    /// `(axis, sign)` of every constrained axis.
    pub fn constrained(self) -> impl Iterator<Item = (usize, i8)> {
        self.0
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s != 0)
    }

    /// Inward normal (toward the fluid), unnormalised.
    #[inline]
    pub fn normal(self) -> [i32; 3] {
        [self.0[0] as i32, self.0[1] as i32, self.0[2] as i32]
    }

    fn encode(self) -> usize {
        self.0
            .iter()
            .fold(0, |acc, s| acc * 3 + (*s + 1) as usize)
    }

    fn decode(mut code: usize) -> Self {
        let mut signs = [0i8; 3];
        for axis in (0..3).rev() {
            signs[axis] = (code % 3) as i8 - 1;
            code /= 3;
        }
        Self(signs)
    }
}

/// Geometry classification of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeometryTag {
    /// Full stencil available.
    #[default]
    Interior,
    /// Planar wall.
    Face(OpenSides),
    /// Concave edge or corner.
    Inner(OpenSides),
    /// Convex edge or corner.
    Outer(OpenSides),
}

/// Number of dense tag slots.
pub(crate) const TAG_SLOTS: usize = 4 * 27;

impl GeometryTag {
    /// Open sides of the tag (all free for `Interior`).
    pub fn open_sides(self) -> OpenSides {
        match self {
            Self::Interior => OpenSides::default(),
            Self::Face(o) | Self::Inner(o) | Self::Outer(o) => o,
        }
    }

    /// Dense slot used for table lookups.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            Self::Interior => 0,
            Self::Face(o) => 27 + o.encode(),
            Self::Inner(o) => 2 * 27 + o.encode(),
            Self::Outer(o) => 3 * 27 + o.encode(),
        }
    }

    /// Tag stored in a dense slot.
    pub(crate) fn from_slot(slot: usize) -> Self {
        let open = OpenSides::decode(slot % 27);
        match slot / 27 {
            0 => Self::Interior,
            1 => Self::Face(open),
            2 => Self::Inner(open),
            _ => Self::Outer(open),
        }
    }
}

impl fmt::Display for GeometryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const AXES: [char; 3] = ['x', 'y', 'z'];
        let (kind, open) = match self {
            Self::Interior => return write!(f, "interior"),
            Self::Face(o) => ("face", *o),
            Self::Inner(o) if o.n_constrained() == 3 => ("inner corner", *o),
            Self::Inner(o) => ("inner edge", *o),
            Self::Outer(o) if o.n_constrained() == 3 => ("outer corner", *o),
            Self::Outer(o) => ("outer edge", *o),
        };
        write!(f, "{kind}(")?;
        for (i, (axis, s)) in open.constrained().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}{}", if s > 0 { '+' } else { '-' }, AXES[axis])?;
        }
        write!(f, ")")
    }
}
