use warpkit_core::image::VolumeGeometry;
use warpkit_core::spatial::{Direction3, Point3, Spacing3};
use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use proptest::prelude::*;

type Backend = NdArray<f32>;

fn make_rotation(angle_x: f64, angle_y: f64, angle_z: f64) -> Direction3 {
    let (sx, cx) = angle_x.sin_cos();
    let (sy, cy) = angle_y.sin_cos();
    let (sz, cz) = angle_z.sin_cos();

    let rz = nalgebra::Matrix3::new(
        cz, -sz, 0.0,
        sz, cz, 0.0,
        0.0, 0.0, 1.0,
    );
    let ry = nalgebra::Matrix3::new(
        cy, 0.0, sy,
        0.0, 1.0, 0.0,
        -sy, 0.0, cy,
    );
    let rx = nalgebra::Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, cx, -sx,
        0.0, sx, cx,
    );

    Direction3::from_matrix(rx * ry * rz)
}

proptest! {
    #[test]
    fn test_coordinate_roundtrip(
        ox in -100.0f64..100.0, oy in -100.0f64..100.0, oz in -100.0f64..100.0,
        sx in 0.1f64..5.0, sy in 0.1f64..5.0, sz in 0.1f64..5.0,
        ax in -3.14f64..3.14, ay in -3.14f64..3.14, az in -3.14f64..3.14,
        px in -50.0f64..50.0, py in -50.0f64..50.0, pz in -50.0f64..50.0
    ) {
        let geometry = VolumeGeometry::new(
            Point3::new([ox, oy, oz]),
            Spacing3::new([sx, sy, sz]),
            make_rotation(ax, ay, az),
        ).unwrap();
        let point = Point3::new([px, py, pz]);

        let index = geometry.point_to_index(&point);
        let recovered = geometry.index_to_point(&index);

        prop_assert!((point[0] - recovered[0]).abs() < 1e-8, "X mismatch: {} vs {}", point[0], recovered[0]);
        prop_assert!((point[1] - recovered[1]).abs() < 1e-8, "Y mismatch: {} vs {}", point[1], recovered[1]);
        prop_assert!((point[2] - recovered[2]).abs() < 1e-8, "Z mismatch: {} vs {}", point[2], recovered[2]);
    }

    #[test]
    fn test_tensor_batch_consistency(
        ox in -10.0f64..10.0,
        sx in 0.5f64..2.0,
        px in -10.0f64..10.0,
        angle in -1.5f64..1.5
    ) {
        let device = Default::default();
        let geometry = VolumeGeometry::new(
            Point3::new([ox, -ox, 0.5 * ox]),
            Spacing3::new([sx, 2.0 * sx, sx]),
            make_rotation(0.0, 0.0, angle),
        ).unwrap();

        let point = Point3::new([px, 0.5 * px, -px]);
        let expected = geometry.point_to_index(&point);

        let points = Tensor::<Backend, 2>::from_floats(
            [[point[0] as f32, point[1] as f32, point[2] as f32]],
            &device,
        );
        let indices = geometry.world_to_index_tensor(points).into_data();
        let indices = indices.as_slice::<f32>().unwrap();

        for i in 0..3 {
            prop_assert!((indices[i] - expected[i] as f32).abs() < 1e-3);
        }
    }
}
