use glam::Vec3;
use rand::{rngs::StdRng, SeedableRng};
use std::f32::consts::FRAC_PI_2;

use ring_road::config::SceneParams;
use ring_road::scene::{compose_scene, Material, NodeId};
use ring_road::shape::Shape;

fn compose(seed: u64) -> ring_road::Composition {
    compose_scene(&SceneParams::default(), 16.0 / 9.0, &mut StdRng::seed_from_u64(seed))
}

#[cfg(test)]
mod composition_tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = compose(1).scene.camera;
        assert_eq!(camera.position, Vec3::new(0.0, 3.0, 20.0));
        assert_eq!(camera.rotation.x, -0.2);
        assert_eq!(camera.fov_degrees, 45.0);
        assert_eq!((camera.near, camera.far), (0.1, 300.0));
    }

    #[test]
    fn test_road_lies_ahead_of_camera() {
        let road = compose(1).scene.road;
        assert_eq!(road.id, NodeId(0));
        assert_eq!(road.transform.position, Vec3::new(0.0, 0.0, -30.0));
        assert!((road.transform.rotation.x + FRAC_PI_2).abs() < 1e-6);
        assert!(matches!(road.material, Material::Standard { .. }));
        match road.shape.as_ref() {
            Shape::Plane(plane) => assert_eq!((plane.width, plane.height), (4.0, 100.0)),
            other => panic!("road should be a plane, got {:?}", other),
        }
    }

    #[test]
    fn test_initial_ring() {
        let composition = compose(1);
        let ring = &composition.ring;
        assert_eq!(ring.id, NodeId(2));
        assert_eq!(ring.transform.position.z, 40.0);
        assert!(matches!(ring.material, Material::Basic { .. }));

        let shape = ring.shape.as_ring().expect("ring shape");
        assert_eq!(shape.theta_segments(), 40);
        assert_eq!(shape.inner_radius(), 7.0);
        assert!((shape.outer_radius() - 7.2).abs() < 1e-6);
        assert_eq!(composition.next_id, NodeId(3));
    }

    #[test]
    fn test_lights() {
        let scene = compose(1).scene;
        assert_eq!(scene.ambient.intensity, 0.12);
        assert_eq!(scene.point_light.intensity, 0.4);
        assert_eq!(scene.point_light.range, 10.0);
        assert_eq!(scene.point_light.decay, 2.0);
        assert_eq!(scene.point_light.position, Vec3::new(0.0, 4.0, 20.0));
    }
}

#[cfg(test)]
mod starfield_tests {
    use super::*;

    #[test]
    fn test_star_count_and_bounds() {
        let stars = compose(9).scene.stars;
        let cloud = stars.shape.as_points().expect("point cloud");
        assert_eq!(cloud.len(), 3000);

        for star in &cloud.points {
            let [x, y, z] = star.position;
            let radius = (x * x + y * y).sqrt();
            assert!(radius <= 150.0 + 1e-3, "radius {radius} beyond half the far plane");
            assert!(z > -80.0 - 1e-3 && z <= 20.0, "z {z} outside the road span");
        }
    }

    #[test]
    fn test_starfield_depends_only_on_seed() {
        let a = compose(5).scene.stars;
        let b = compose(5).scene.stars;
        let c = compose(6).scene.stars;
        assert_eq!(a.shape, b.shape);
        assert_ne!(a.shape, c.shape);
    }

    #[test]
    fn test_star_material() {
        let stars = compose(1).scene.stars;
        assert_eq!(stars.id, NodeId(1));
        match stars.material {
            Material::Points { size, .. } => assert_eq!(size, 0.5),
            other => panic!("stars should use a points material, got {:?}", other),
        }
    }
}
