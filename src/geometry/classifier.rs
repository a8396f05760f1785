//! Geometry classification of boundary nodes.
//!
//! A boundary node is classified from which of its lattice neighbours lie
//! in the flow region (fluid or boundary, not solid, not outside the
//! domain). Axis neighbours decide faces and inner features. When both axis
//! neighbours of every axis are present, the missing diagonals decide
//! whether the node sits on a convex (outer) feature.

use super::tag::{GeometryTag, OpenSides};

/// Classify one node.
///
/// `offsets` are the neighbour offsets to inspect (the lattice velocities),
/// `present(offset)` reports whether that neighbour belongs to the flow
/// region. Returns the reason when no tag matches the neighbourhood.
pub fn classify_node<F>(
    dimension: usize,
    offsets: &[[i32; 3]],
    present: F,
) -> Result<GeometryTag, String>
where
    F: Fn([i32; 3]) -> bool,
{
    const AXES: [char; 3] = ['x', 'y', 'z'];

    let mut open = [0i8; 3];
    for axis in 0..dimension {
        let mut e = [0i32; 3];
        e[axis] = 1;
        let plus = present(e);
        e[axis] = -1;
        let minus = present(e);
        open[axis] = match (minus, plus) {
            (true, true) => 0,
            (false, true) => 1,
            (true, false) => -1,
            (false, false) => {
                return Err(format!(
                    "no flow neighbour on either side along {}",
                    AXES[axis]
                ))
            }
        };
    }

    let missing: Vec<[i32; 3]> = offsets
        .iter()
        .copied()
        .filter(|c| *c != [0, 0, 0] && !present(*c))
        .collect();

    let open = OpenSides::new(open);
    let tag = match open.n_constrained() {
        0 => return classify_diagonal(open, &missing),
        1 => GeometryTag::Face(open),
        _ => GeometryTag::Inner(open),
    };

    // every cut neighbour must lie on a solid side of some constrained axis
    for m in &missing {
        if !open.constrained().any(|(axis, s)| m[axis] == -(s as i32)) {
            return Err(format!(
                "neighbour {:?} is cut but {} leaves it open",
                m, tag
            ));
        }
    }
    Ok(tag)
}

fn classify_diagonal(free: OpenSides, missing: &[[i32; 3]]) -> Result<GeometryTag, String> {
    debug_assert_eq!(free.n_constrained(), 0);
    let Some(first) = missing.first() else {
        return Ok(GeometryTag::Interior);
    };

    let mut signs = [0i8; 3];
    for axis in 0..3 {
        let m = first[axis];
        if m != 0 && missing.iter().all(|o| o[axis] == m) {
            signs[axis] = -(m as i8);
        }
    }
    let open = OpenSides::new(signs);
    if open.n_constrained() < 2 {
        return Err(format!(
            "cut diagonals {:?} do not form an edge or corner",
            missing
        ));
    }
    Ok(GeometryTag::Outer(open))
}
