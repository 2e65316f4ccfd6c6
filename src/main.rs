use dwi_normalize::AxisInfo;
use dwi_normalize::KeyValueStore;
use dwi_normalize::Normalizer;
use dwi_normalize::NormalizerConfig;
use dwi_normalize::RawVolume;
use dwi_normalize::SpaceFrame;
use dwi_normalize::logger;
use ndarray::ArrayD;
use ndarray::IxDyn;
use tracing::info;

const DIRECTIONS: [&str; 8] = [
    "0 0 0",
    "1 0 0",
    "0 1 0",
    "0 0 0",
    "0 0 1",
    "0.7071 0.7071 0",
    "0 0.7071 0.7071",
    "0.7071 0 0.7071",
];

/// Synthetic phantom: a fiber along x in the left half, free water elsewhere
fn phantom() -> Result<RawVolume<u16>, Box<dyn std::error::Error>> {
    let (nx, ny, nz) = (8, 8, 4);
    let mut key_values = KeyValueStore::new();
    key_values.insert("modality", "DWMRI")?;
    key_values.insert("DWMRI_b-value", "1000")?;

    let mut directions = Vec::with_capacity(DIRECTIONS.len());
    for (index, direction) in DIRECTIONS.iter().enumerate() {
        key_values.insert(format!("DWMRI_gradient_{index:04}"), *direction)?;
        let g: Vec<f64> = direction
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()?;
        directions.push(g);
    }

    // x, y, z spatial and the gradient list last, as scanners commonly write it
    let data = ArrayD::from_shape_fn(IxDyn(&[nx, ny, nz, DIRECTIONS.len()]), |index| {
        let (x, h) = (index[0], index[3]);
        let s0 = 1000.0;
        let g = &directions[h];
        let b = if g.iter().all(|c| *c == 0.0) { 0.0 } else { 1.0 };
        let attenuation = if x < nx / 2 {
            // stick along x
            (-b * (1.7 * g[0] * g[0] + 0.3 * (g[1] * g[1] + g[2] * g[2]))).exp()
        } else {
            (-b * 3.0f64).exp()
        };
        (s0 * attenuation) as u16
    });

    let axes = vec![
        AxisInfo::space([-2.0, 0.0, 0.0]),
        AxisInfo::space([0.0, -2.0, 0.0]),
        AxisInfo::space([0.0, 0.0, 2.5]),
        AxisInfo::list(),
    ];

    Ok(RawVolume::new(data, axes)
        .with_space(SpaceFrame::LeftPosteriorSuperior)
        .with_space_origin([90.0, 120.0, -60.0])
        .with_key_values(key_values)
        .with_content("synthetic phantom"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;

    info!("Building synthetic DWI phantom");
    let raw = phantom()?;

    let normalizer = Normalizer::new(NormalizerConfig::default());
    let (normalized, timings) = normalizer.normalize_with_timings(&raw)?;

    info!("Normalized volume: {:?}", normalized.dim());
    for (key, value) in normalized.key_values.iter() {
        info!("{key}:={value}");
    }

    let ga = normalized.generalized_anisotropy_map();
    info!(
        "GA fiber voxel: {:.3}, free water voxel: {:.3}",
        ga[[0, 0, 0]],
        ga[[normalized.dim().1 - 1, 0, 0]]
    );
    info!(
        "Total: {:.3}ms",
        timings.total_duration().as_secs_f64() * 1000.0
    );

    Ok(())
}
