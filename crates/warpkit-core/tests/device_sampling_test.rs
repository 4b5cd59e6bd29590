use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use warpkit_core::{
    AffineTransform, DeviceDisplacementField, DisplacementField, Point3, UpdateRule, Vector3,
};
use proptest::prelude::*;

type Backend = NdArray<f32>;

fn swirl_field() -> DisplacementField {
    let mut field = DisplacementField::zeros([6, 5, 4]);
    for z in 0..4 {
        for y in 0..5 {
            for x in 0..6 {
                let (fx, fy, fz) = (x as f64, y as f64, z as f64);
                field.set([x, y, z], Vector3::new([0.2 * fy, -0.3 * fx + 0.1 * fz, 0.05 * fx * fy]));
            }
        }
    }
    let rotation = nalgebra::Matrix3::new(
        0.0, -1.0, 0.0,
        1.0, 0.0, 0.0,
        0.0, 0.0, 1.0,
    );
    field.set_affine_transform(
        AffineTransform::new(rotation, Vector3::new([0.5, 0.0, -0.5]))
            .with_center(Point3::new([2.5, 2.0, 1.5])),
    );
    field
}

proptest! {
    #[test]
    fn test_device_sampling_matches_host(
        px in -3.0f64..9.0, py in -3.0f64..8.0, pz in -3.0f64..7.0
    ) {
        let device = Default::default();
        let host = swirl_field();
        let field = DeviceDisplacementField::<Backend>::from_host(&host, UpdateRule::Additive, &device).unwrap();

        let points = Tensor::<Backend, 2>::from_floats([[px as f32, py as f32, pz as f32]], &device);
        let sampled = field.sample_points(points).into_data();
        let sampled = sampled.as_slice::<f32>().unwrap();
        let expected = host.get_point(Point3::new([px, py, pz]));

        for c in 0..3 {
            prop_assert!(
                (sampled[c] as f64 - expected[c]).abs() < 1e-3,
                "component {}: {} vs {}", c, sampled[c], expected[c]
            );
        }
    }
}

#[test]
fn test_download_after_host_update() {
    let device = Default::default();
    let mut host = swirl_field();
    let mut update = DisplacementField::zeros_like(&host);
    update.fill(Vector3::new([0.25, 0.0, 0.0]));
    host.update(&update, UpdateRule::Additive).unwrap();

    let field = DeviceDisplacementField::<Backend>::from_host(&host, UpdateRule::Compositive, &device).unwrap();
    let back = field.to_host().unwrap();
    assert_eq!(back.affine(), host.affine());
    for (a, b) in back.volume().as_slice().iter().zip(host.volume().as_slice()) {
        assert!((*a - *b).norm() < 1e-6);
    }
}
