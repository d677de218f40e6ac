use glam::Vec3;
use ring_road::shape::{MeshData, RingShape};

fn triangle_normal(mesh: &MeshData, tri: usize) -> Vec3 {
    let corner = |i: usize| Vec3::from_array(mesh.vertices[mesh.indices[tri * 3 + i] as usize].position);
    let (a, b, c) = (corner(0), corner(1), corner(2));
    (b - a).cross(c - a)
}

#[cfg(test)]
mod ring_tessellation_tests {
    use super::*;

    #[test]
    fn test_counts_for_every_candidate() {
        for segments in [3, 4, 5, 6, 8, 40] {
            let mesh = RingShape::new(7.0, 7.2, segments).tessellate();
            let n = segments as usize;
            assert_eq!(mesh.vertices.len(), 2 * (n + 1));
            assert_eq!(mesh.indices.len(), 6 * n);
            assert_eq!(mesh.triangle_count(), 2 * n);
            assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        }
    }

    #[test]
    fn test_vertices_sit_on_both_radii() {
        let mesh = RingShape::new(7.0, 7.2, 6).tessellate();
        let (inner, outer) = mesh.vertices.split_at(7);
        for v in inner {
            assert!((Vec3::from_array(v.position).length() - 7.0).abs() < 1e-4);
        }
        for v in outer {
            assert!((Vec3::from_array(v.position).length() - 7.2).abs() < 1e-4);
        }
        assert!(mesh.vertices.iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn test_triangles_wind_counter_clockwise() {
        let mesh = RingShape::new(7.0, 7.2, 5).tessellate();
        for tri in 0..mesh.triangle_count() {
            assert!(
                triangle_normal(&mesh, tri).z > 0.0,
                "triangle {tri} faces away from +z"
            );
        }
    }

    #[test]
    fn test_segment_count_changes_shape_not_node() {
        let triangle = RingShape::new(7.0, 7.2, 3);
        let round = RingShape::new(7.0, 7.2, 40);
        assert_ne!(triangle, round);
        assert_eq!(triangle.inner_radius(), round.inner_radius());
    }
}
