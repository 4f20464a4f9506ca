//! A description renders the same picture at every resolution.

use gradient_studio::compare::compare_surfaces;
use gradient_studio::{
    render_to_surface, render_to_surface_with_options, BlendMode, Blob, Color, Gradient, MeshGradient,
    RenderOptions, Surface,
};

fn downsampled_diff(gradient: &Gradient, small: (u32, u32), large: (u32, u32)) -> f64 {
    let options = RenderOptions::seeded(3);
    let a = render_to_surface_with_options(gradient, small.0, small.1, &options).unwrap();
    let b = render_to_surface_with_options(gradient, large.0, large.1, &options).unwrap();
    let b = b.downsample(small.0, small.1).unwrap();
    let result = compare_surfaces(&a, &b).unwrap();
    result.mean_channel_diff
}

fn quiet_mesh() -> Gradient {
    match Gradient::default_mesh() {
        Gradient::Mesh(m) => Gradient::Mesh(m.with_noise(0.0)),
        other => other,
    }
}

#[test]
fn mesh_is_resolution_independent() {
    let diff = downsampled_diff(&quiet_mesh(), (256, 144), (1024, 576));
    assert!(diff < 2.0, "mean diff {diff}");
}

#[test]
fn linear_is_resolution_independent() {
    let diff = downsampled_diff(&Gradient::default_linear(), (160, 90), (640, 360));
    assert!(diff < 1.5, "mean diff {diff}");
}

#[test]
fn radial_is_resolution_independent() {
    let diff = downsampled_diff(&Gradient::default_radial(), (160, 90), (640, 360));
    assert!(diff < 1.5, "mean diff {diff}");
}

#[test]
fn noisy_mesh_stays_close_on_average() {
    // Uniform jitter of +-7.65 leaves a mean absolute difference near 3.6.
    let g = match Gradient::default_mesh() {
        Gradient::Mesh(m) => Gradient::Mesh(m.with_noise(0.03)),
        other => other,
    };
    let diff = downsampled_diff(&g, (128, 72), (512, 288));
    assert!(diff < 6.0, "mean diff {diff}");
}

#[test]
fn additive_overlap_is_yellow_at_any_size() {
    let mesh = MeshGradient {
        background: Color::BLACK,
        blobs: vec![
            Blob::new(0.5, 0.5, 0.4, Color::new(255, 0, 0), 1.0),
            Blob::new(0.5, 0.5, 0.4, Color::new(0, 255, 0), 1.0),
        ],
        blend_mode: BlendMode::Additive,
        softness: Some(0.2),
        noise: Some(0.0),
        vignette: Some(false),
    };
    let g = Gradient::Mesh(mesh.clone());
    for (w, h) in [(50, 50), (333, 200), (1000, 601)] {
        let s = render_to_surface(&g, w, h).unwrap();
        let off = (w / 2) as usize * 4;
        assert_eq!(&s.row(h / 2)[off..off + 4], &[255, 255, 0, 255], "{w}x{h}");
    }

    let normal = Gradient::Mesh(mesh.with_blend_mode(BlendMode::Normal));
    let s = render_to_surface(&normal, 50, 50).unwrap();
    assert_eq!(&s.row(25)[100..104], &[0, 255, 0, 255]);
}

#[test]
fn every_pixel_is_opaque() {
    for g in [quiet_mesh(), Gradient::default_linear(), Gradient::default_radial()] {
        let s: Surface = render_to_surface(&g, 37, 23).unwrap();
        assert!(s.as_bytes().chunks_exact(4).all(|p| p[3] == 255), "{:?}", g.kind());
    }
}
