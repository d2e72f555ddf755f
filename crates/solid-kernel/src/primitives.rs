//! Prism builder on top of truck's topology API.
//!
//! truck has no tapered extrusion, so a prism is assembled face by face from a
//! bottom ring and a top ring with the same vertex count.

use truck_modeling::builder;
use truck_modeling::topology::{Edge, Face, Shell, Solid, Vertex, Wire};
use truck_modeling::Point3;

use crate::types::KernelError;

fn line(v0: &Vertex, v1: &Vertex) -> Edge {
    Edge::new(
        v0,
        v1,
        truck_modeling::geometry::Curve::Line(truck_modeling::geometry::Line(
            v0.point(),
            v1.point(),
        )),
    )
}

fn planar(wire: Wire) -> Result<Face, KernelError> {
    builder::try_attach_plane(&[wire]).map_err(|e| KernelError::ExtrudeFailed {
        reason: format!("failed to create planar face: {}", e),
    })
}

/// Closed prism between two counter-clockwise rings (seen from above the top ring).
///
/// Ring `i` of the bottom is joined to ring `i` of the top, so side faces are
/// planar only when each top edge is parallel to its bottom edge, which holds
/// for straight and mitred-offset rings.
pub fn make_prism(bottom: &[Point3], top: &[Point3]) -> Result<Solid, KernelError> {
    let n = bottom.len();
    if n < 3 || top.len() != n {
        return Err(KernelError::ExtrudeFailed {
            reason: format!("prism rings must match, got {} and {}", n, top.len()),
        });
    }

    // Create all vertices first so edges share endpoints.
    let vb: Vec<Vertex> = bottom.iter().map(|&p| builder::vertex(p)).collect();
    let vt: Vec<Vertex> = top.iter().map(|&p| builder::vertex(p)).collect();
    let be: Vec<Edge> = (0..n).map(|i| line(&vb[i], &vb[(i + 1) % n])).collect();
    let te: Vec<Edge> = (0..n).map(|i| line(&vt[i], &vt[(i + 1) % n])).collect();
    let se: Vec<Edge> = (0..n).map(|i| line(&vb[i], &vt[i])).collect();

    let mut faces = Vec::with_capacity(n + 2);
    faces.push(planar(Wire::from_iter(be.iter().rev().map(|e| e.inverse())))?);
    faces.push(planar(Wire::from_iter(te.iter().cloned()))?);
    for i in 0..n {
        let j = (i + 1) % n;
        let wire = Wire::from(vec![
            be[i].clone(),
            se[j].clone(),
            te[i].inverse(),
            se[i].inverse(),
        ]);
        faces.push(planar(wire)?);
    }

    Solid::try_new(vec![Shell::from(faces)]).map_err(|e| KernelError::ExtrudeFailed {
        reason: format!("prism shell is not a closed solid: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_prism_topology() {
        let bottom = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let top = bottom.map(|p| Point3::new(p.x, p.y, 2.0));
        let solid = make_prism(&bottom, &top).unwrap();

        let boundaries = solid.boundaries();
        assert_eq!(boundaries.len(), 1, "Prism should have 1 shell");
        let shell = &boundaries[0];
        let faces: Vec<_> = shell.face_iter().collect();
        let mut edge_ids = std::collections::HashSet::new();
        for edge in shell.edge_iter() {
            edge_ids.insert(edge.id());
        }
        assert_eq!(faces.len(), 6, "Prism should have 6 faces");
        assert_eq!(edge_ids.len(), 12, "Prism should have 12 edges");
    }

    #[test]
    fn test_mismatched_rings_rejected() {
        let ring = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert!(make_prism(&ring, &ring[..2]).is_err());
    }
}
