//! Consistency checks for a [`Connectivity`].
//!
//! [`validate`] makes a single pass and reports the first violation:
//! table lengths, index ranges, face reciprocity, edge and corner list
//! membership, and finally that every edge/corner list is fully explained
//! by the transform queries.

use log::warn;
use thiserror::Error;

use crate::topology::connectivity::Connectivity;
use crate::topology::dimension::Dimension;
use crate::topology::orientation::{EdgeCode, FaceCode};
use crate::topology::tables::EDGES_3D;
use crate::topology::transform::{find_corner_transform, find_edge_transform};

/// First inconsistency found in a connectivity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectivityViolation {
    #[error("table `{table}` has {found} entries, expected {expected}")]
    TableLength {
        table: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{table}` offsets are not a monotone cover of the list")]
    Offsets { table: &'static str },
    #[error("`{table}`[{index}] = {value} out of range")]
    EntryRange {
        table: &'static str,
        index: usize,
        value: i64,
    },
    #[error("tree {tree} face {face} is its own neighbor with orientation {orientation}")]
    SelfFaceOrientation {
        tree: usize,
        face: usize,
        orientation: usize,
    },
    #[error("tree {tree} face {face} -> tree {ntree} face {nface} is not reciprocated")]
    FaceReciprocity {
        tree: usize,
        face: usize,
        ntree: usize,
        nface: usize,
    },
    #[error("{feature} {id} of tree {tree} local {local} has an invalid list range")]
    ListRange {
        feature: &'static str,
        id: usize,
        tree: usize,
        local: usize,
    },
    #[error("{feature} {id} lists tree {ntree} local {nlocal}, which does not carry the id")]
    ListMember {
        feature: &'static str,
        id: usize,
        ntree: usize,
        nlocal: usize,
    },
    #[error("{feature} {id} lists tree {tree} local {local} {count} times")]
    IdentityCount {
        feature: &'static str,
        id: usize,
        tree: usize,
        local: usize,
        count: usize,
    },
    #[error(
        "{feature} of tree {tree} local {local}: transforms explain {expected} list entries, list has {found}"
    )]
    TransformCount {
        feature: &'static str,
        tree: usize,
        local: usize,
        expected: usize,
        found: usize,
    },
}

fn check_len(table: &'static str, found: usize, expected: usize) -> Result<(), ConnectivityViolation> {
    if found != expected {
        return Err(ConnectivityViolation::TableLength {
            table,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_range<T: Copy + Into<i64>>(
    table: &'static str,
    values: &[T],
    lo: i64,
    hi: usize,
) -> Result<(), ConnectivityViolation> {
    for (index, &v) in values.iter().enumerate() {
        let value: i64 = v.into();
        if value < lo || value >= hi as i64 {
            return Err(ConnectivityViolation::EntryRange {
                table,
                index,
                value,
            });
        }
    }
    Ok(())
}

fn check_offsets(
    table: &'static str,
    offsets: &[i32],
    list_len: usize,
) -> Result<(), ConnectivityViolation> {
    let monotone = offsets.windows(2).all(|w| w[0] <= w[1]);
    if offsets.first() != Some(&0) || !monotone || offsets.last() != Some(&(list_len as i32)) {
        return Err(ConnectivityViolation::Offsets { table });
    }
    Ok(())
}

fn check_lengths<D: Dimension>(conn: &Connectivity<D>) -> Result<(), ConnectivityViolation> {
    let trees = conn.num_trees;
    check_len("vertices", conn.vertices.len(), 3 * conn.num_vertices)?;
    let ttv = if conn.num_vertices > 0 { D::CHILDREN * trees } else { 0 };
    check_len("tree_to_vertex", conn.tree_to_vertex.len(), ttv)?;
    check_len("tree_to_tree", conn.tree_to_tree.len(), D::FACES * trees)?;
    check_len("tree_to_face", conn.tree_to_face.len(), D::FACES * trees)?;

    if D::EDGES == 0 {
        check_len("edge_to_tree", conn.num_edges, 0)?;
    }
    let tte = if conn.num_edges > 0 { EDGES_3D * trees } else { 0 };
    check_len("tree_to_edge", conn.tree_to_edge.len(), tte)?;
    check_len("ett_offset", conn.ett_offset.len(), conn.num_edges + 1)?;
    check_len("edge_to_edge", conn.edge_to_edge.len(), conn.edge_to_tree.len())?;
    check_offsets("ett_offset", &conn.ett_offset, conn.edge_to_tree.len())?;

    let ttc = if conn.num_corners > 0 { D::CHILDREN * trees } else { 0 };
    check_len("tree_to_corner", conn.tree_to_corner.len(), ttc)?;
    check_len("ctt_offset", conn.ctt_offset.len(), conn.num_corners + 1)?;
    check_len("corner_to_corner", conn.corner_to_corner.len(), conn.corner_to_tree.len())?;
    check_offsets("ctt_offset", &conn.ctt_offset, conn.corner_to_tree.len())
}

fn check_faces<D: Dimension>(conn: &Connectivity<D>) -> Result<(), ConnectivityViolation> {
    for tree in 0..conn.num_trees {
        for face in 0..D::FACES {
            let slot = tree * D::FACES + face;
            let ntree = conn.tree_to_tree[slot];
            if ntree < 0 || ntree as usize >= conn.num_trees {
                return Err(ConnectivityViolation::EntryRange {
                    table: "tree_to_tree",
                    index: slot,
                    value: ntree.into(),
                });
            }
            let ntree = ntree as usize;
            let code = FaceCode::decode::<D>(conn.tree_to_face[slot]).ok_or(
                ConnectivityViolation::EntryRange {
                    table: "tree_to_face",
                    index: slot,
                    value: conn.tree_to_face[slot].into(),
                },
            )?;
            let nface = code.face_index();
            if ntree == tree && nface == face {
                if code.orientation != 0 {
                    return Err(ConnectivityViolation::SelfFaceOrientation {
                        tree,
                        face,
                        orientation: code.orientation_index(),
                    });
                }
                continue;
            }
            let back = ntree * D::FACES + nface;
            let expected = FaceCode::new(face as u8, code.orientation).encode::<D>();
            if conn.tree_to_tree[back] as usize != tree || conn.tree_to_face[back] != expected {
                return Err(ConnectivityViolation::FaceReciprocity {
                    tree,
                    face,
                    ntree,
                    nface,
                });
            }
        }
    }
    Ok(())
}

/// Shared membership checks for one edge or corner id: the list range is
/// valid, every member carries the id, and `(tree, local)` occurs once.
#[allow(clippy::too_many_arguments)]
fn check_list(
    feature: &'static str,
    id: usize,
    tree: usize,
    local: usize,
    range: std::ops::Range<usize>,
    list_len: usize,
    members: impl Iterator<Item = (usize, usize)>,
    carries_id: impl Fn(usize, usize) -> bool,
) -> Result<(), ConnectivityViolation> {
    if range.start >= range.end || range.end > list_len {
        return Err(ConnectivityViolation::ListRange {
            feature,
            id,
            tree,
            local,
        });
    }
    let mut count = 0;
    for (ntree, nlocal) in members {
        if !carries_id(ntree, nlocal) {
            return Err(ConnectivityViolation::ListMember {
                feature,
                id,
                ntree,
                nlocal,
            });
        }
        if ntree == tree && nlocal == local {
            count += 1;
        }
    }
    if count != 1 {
        return Err(ConnectivityViolation::IdentityCount {
            feature,
            id,
            tree,
            local,
            count,
        });
    }
    Ok(())
}

fn check_edges<D: Dimension>(conn: &Connectivity<D>) -> Result<(), ConnectivityViolation> {
    if conn.num_edges == 0 {
        return Ok(());
    }
    check_range("tree_to_edge", &conn.tree_to_edge, -1, conn.num_edges)?;
    for tree in 0..conn.num_trees {
        for edge in 0..EDGES_3D {
            let Some(id) = conn.tree_edge(tree, edge) else {
                continue;
            };
            let range = conn.edge_range(id);
            let members = range.clone().map(|k| {
                let code = EdgeCode::decode(conn.edge_to_edge[k]).unwrap_or_default();
                (conn.edge_to_tree[k] as usize, code.edge_index())
            });
            check_list(
                "edge",
                id,
                tree,
                edge,
                range.clone(),
                conn.edge_to_tree.len(),
                members,
                |nt, ne| conn.tree_to_edge[nt * EDGES_3D + ne] == id as i32,
            )?;
            let info = find_edge_transform(conn, tree, edge);
            if info.expected_count() != range.len() {
                return Err(ConnectivityViolation::TransformCount {
                    feature: "edge",
                    tree,
                    local: edge,
                    expected: info.expected_count(),
                    found: range.len(),
                });
            }
        }
    }
    Ok(())
}

fn check_corners<D: Dimension>(conn: &Connectivity<D>) -> Result<(), ConnectivityViolation> {
    if conn.num_corners == 0 {
        return Ok(());
    }
    check_range("tree_to_corner", &conn.tree_to_corner, -1, conn.num_corners)?;
    for tree in 0..conn.num_trees {
        for corner in 0..D::CHILDREN {
            let Some(id) = conn.tree_corner(tree, corner) else {
                continue;
            };
            let range = conn.corner_range(id);
            check_list(
                "corner",
                id,
                tree,
                corner,
                range.clone(),
                conn.corner_to_tree.len(),
                conn.corner_trees(id),
                |nt, nc| conn.tree_to_corner[nt * D::CHILDREN + nc] == id as i32,
            )?;
            let info = find_corner_transform(conn, tree, corner);
            if info.expected_count() != range.len() {
                return Err(ConnectivityViolation::TransformCount {
                    feature: "corner",
                    tree,
                    local: corner,
                    expected: info.expected_count(),
                    found: range.len(),
                });
            }
        }
    }
    Ok(())
}

/// Check every structural invariant of `conn`, returning the first
/// violation. Pure; safe to call any number of times.
pub fn validate<D: Dimension>(conn: &Connectivity<D>) -> Result<(), ConnectivityViolation> {
    check_lengths(conn)?;

    check_range("edge_to_tree", &conn.edge_to_tree, 0, conn.num_trees)?;
    check_range("edge_to_edge", &conn.edge_to_edge, 0, EdgeCode::LIMIT)?;
    check_range("corner_to_tree", &conn.corner_to_tree, 0, conn.num_trees)?;
    check_range("corner_to_corner", &conn.corner_to_corner, 0, D::CHILDREN)?;
    check_range("tree_to_vertex", &conn.tree_to_vertex, 0, conn.num_vertices)?;

    check_faces(conn)?;
    check_edges(conn)?;
    check_corners(conn)
}

/// Boolean form of [`validate`]; the violation is logged at `warn`.
pub fn is_valid<D: Dimension>(conn: &Connectivity<D>) -> bool {
    match validate(conn) {
        Ok(()) => true,
        Err(e) => {
            warn!("connectivity rejected: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::canonical;

    #[test]
    fn canonical_meshes_pass() {
        assert_eq!(validate(&canonical::unit_square()), Ok(()));
        assert_eq!(validate(&canonical::periodic()), Ok(()));
        assert_eq!(validate(&canonical::rotwrap()), Ok(()));
        assert_eq!(validate(&canonical::corner()), Ok(()));
        assert_eq!(validate(&canonical::moebius()), Ok(()));
        assert_eq!(validate(&canonical::star()), Ok(()));
        assert_eq!(validate(&canonical::unit_cube()), Ok(()));
        assert_eq!(validate(&canonical::two_cubes()), Ok(()));
        assert_eq!(validate(&canonical::periodic_cube()), Ok(()));
    }

    #[test]
    fn broken_reciprocity_is_reported() {
        let mut conn = canonical::corner();
        // tree 2 face 0 points at tree 1, not back at tree 0
        conn.tree_to_tree[0] = 2;
        conn.tree_to_face[0] = 0;
        assert!(matches!(
            validate(&conn),
            Err(ConnectivityViolation::FaceReciprocity { tree: 0, face: 0, .. })
        ));
    }

    #[test]
    fn self_face_with_orientation_is_rejected() {
        let mut conn = canonical::unit_square();
        conn.tree_to_face[2] = 2 + 4;
        assert_eq!(
            validate(&conn),
            Err(ConnectivityViolation::SelfFaceOrientation {
                tree: 0,
                face: 2,
                orientation: 1
            })
        );
        assert!(!is_valid(&conn));
    }

    #[test]
    fn out_of_range_entries_are_rejected() {
        let mut conn = canonical::periodic();
        conn.corner_to_corner[3] = 4;
        assert!(matches!(
            validate(&conn),
            Err(ConnectivityViolation::EntryRange {
                table: "corner_to_corner",
                index: 3,
                ..
            })
        ));

        let mut conn = canonical::unit_square();
        conn.tree_to_vertex[1] = 4;
        assert!(matches!(
            validate(&conn),
            Err(ConnectivityViolation::EntryRange {
                table: "tree_to_vertex",
                ..
            })
        ));
    }

    #[test]
    fn duplicated_identity_is_rejected() {
        let mut conn = canonical::periodic();
        // the list now names (tree 0, corner 0) twice and never corner 1
        conn.corner_to_corner[1] = 0;
        assert!(matches!(
            validate(&conn),
            Err(ConnectivityViolation::IdentityCount { count: 2, .. })
        ));
    }

    #[test]
    fn unexplained_corner_member_is_rejected() {
        let mut conn = canonical::corner();
        // drop the corner id from all but one tree; the list then has foreign members
        conn.tree_to_corner[2] = -1;
        assert!(matches!(
            validate(&conn),
            Err(ConnectivityViolation::ListMember { .. })
        ));
    }

    #[test]
    fn length_mismatch_is_reported_first() {
        let mut conn = canonical::unit_square();
        conn.tree_to_vertex.pop();
        assert!(matches!(
            validate(&conn),
            Err(ConnectivityViolation::TableLength {
                table: "tree_to_vertex",
                ..
            })
        ));
    }
}
