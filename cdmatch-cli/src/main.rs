use clap::Parser;
use cdmatch::image::io::{load_image, load_rgb_image};
use cdmatch::transform::{gradient_image, z_gap_mask};
use cdmatch::{
    search_targets, search_targets_par, AlignmentSpace, CdMatchResult, Image,
    MatchRecord, NegativeQuery, PixelMatchConfig, PixelMatchProvider, SearchTarget,
    ShapeMatchConfig, ShapeMatchProvider, VariantKind, Variants,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Color depth MIP search CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PixelMatchJson {
    query_threshold: i32,
    target_threshold: i32,
    z_tolerance: f64,
    xy_shift: usize,
    mirror: bool,
}

impl Default for PixelMatchJson {
    fn default() -> Self {
        let cfg = PixelMatchConfig::default();
        Self {
            query_threshold: cfg.query_threshold,
            target_threshold: cfg.target_threshold,
            z_tolerance: cfg.z_tolerance,
            xy_shift: cfg.xy_shift,
            mirror: cfg.mirror,
        }
    }
}

impl From<&PixelMatchJson> for PixelMatchConfig {
    fn from(value: &PixelMatchJson) -> Self {
        Self {
            query_threshold: value.query_threshold,
            target_threshold: value.target_threshold,
            z_tolerance: value.z_tolerance,
            xy_shift: value.xy_shift,
            mirror: value.mirror,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ShapeMatchJson {
    enabled: bool,
    query_threshold: i32,
    target_threshold: i32,
    mirror: bool,
    negative_radius: f64,
    flux: i32,
    gap_noise: i64,
    /// Compute missing gradient and z-gap variants from the target.
    generate_variants: bool,
}

impl Default for ShapeMatchJson {
    fn default() -> Self {
        let cfg = ShapeMatchConfig::default();
        Self {
            enabled: false,
            query_threshold: cfg.query_threshold,
            target_threshold: cfg.target_threshold,
            mirror: cfg.mirror,
            negative_radius: cfg.negative_radius,
            flux: cfg.flux,
            gap_noise: cfg.gap_noise,
            generate_variants: true,
        }
    }
}

impl From<&ShapeMatchJson> for ShapeMatchConfig {
    fn from(value: &ShapeMatchJson) -> Self {
        Self {
            query_threshold: value.query_threshold,
            target_threshold: value.target_threshold,
            mirror: value.mirror,
            negative_radius: value.negative_radius,
            flux: value.flux,
            gap_noise: value.gap_noise,
            ..ShapeMatchConfig::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct NegativeJson {
    image_path: String,
    #[serde(default = "default_negative_threshold")]
    threshold: i32,
    #[serde(default)]
    mirror: bool,
}

fn default_negative_threshold() -> i32 {
    PixelMatchConfig::default().query_threshold
}

#[derive(Debug, Deserialize)]
struct TargetJson {
    image_path: String,
    gradient_path: Option<String>,
    z_gap_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    query_path: String,
    roi_path: Option<String>,
    negative: Option<NegativeJson>,
    targets: Vec<TargetJson>,
    alignment_space: Option<String>,
    output_path: Option<String>,
    topk: Option<usize>,
    parallel: bool,
    pixel_match: PixelMatchJson,
    shape_match: ShapeMatchJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_path: String::new(),
            roi_path: None,
            negative: None,
            targets: Vec::new(),
            alignment_space: None,
            output_path: None,
            topk: None,
            parallel: false,
            pixel_match: PixelMatchJson::default(),
            shape_match: ShapeMatchJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RecordJson {
    image_path: String,
    match_count: i64,
    ratio: f64,
    mirrored: bool,
    gradient_area_gap: Option<i64>,
    high_expression_area: Option<i64>,
    negative_score: Option<i64>,
    normalized_score: f64,
}

impl RecordJson {
    fn new(record: &MatchRecord, targets: &[TargetJson]) -> Self {
        Self {
            image_path: targets[record.target_index].image_path.clone(),
            match_count: record.pixel.match_count,
            ratio: record.pixel.ratio,
            mirrored: record.pixel.mirrored,
            gradient_area_gap: record.shape.map(|s| s.gradient_area_gap),
            high_expression_area: record.shape.map(|s| s.high_expression_area),
            negative_score: record.shape.map(|s| s.negative_score()),
            normalized_score: record.normalized_score,
        }
    }
}

#[derive(Debug, Serialize)]
struct FailureJson {
    image_path: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct Output {
    records: Vec<RecordJson>,
    failures: Vec<FailureJson>,
}

/// Logs a failed variant load; the variant is then treated as absent.
fn variant_or_warn(path: &str, loaded: CdMatchResult<Image>) -> Option<Image> {
    match loaded {
        Ok(image) => Some(image),
        Err(err) => {
            tracing::warn!(path, error = %err, "failed to load variant image");
            None
        }
    }
}

/// Variant suppliers for one target: files when given, generated otherwise.
fn target_variants<'a>(
    target: &TargetJson,
    image: &Image,
    shape: &ShapeMatchJson,
) -> Variants<'a> {
    let mut variants = Variants::new();
    if let Some(path) = target.gradient_path.clone() {
        variants = variants.with_supplier(VariantKind::Gradient, move || {
            variant_or_warn(&path, load_image(&path))
        });
    } else if shape.generate_variants {
        let image = image.clone();
        let threshold = shape.target_threshold;
        variants = variants.with_supplier(VariantKind::Gradient, move || {
            gradient_image(&image, threshold).ok()
        });
    }
    if let Some(path) = target.z_gap_path.clone() {
        variants = variants.with_supplier(VariantKind::ZGap, move || {
            variant_or_warn(&path, load_rgb_image(&path))
        });
    } else if shape.generate_variants {
        let image = image.clone();
        let threshold = shape.target_threshold;
        let radius = shape.negative_radius;
        variants = variants.with_supplier(VariantKind::ZGap, move || {
            z_gap_mask(&image, threshold, radius).ok()
        });
    }
    variants
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("cdmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.query_path.is_empty() || config.targets.is_empty() {
        return Err("query_path and at least one target must be set in the config".into());
    }

    let space = config
        .alignment_space
        .as_deref()
        .map(AlignmentSpace::lookup)
        .transpose()?;

    let query = load_rgb_image(&config.query_path)?;
    if let Some(space) = space {
        space.check_image(&query)?;
    }
    let roi = config.roi_path.as_deref().map(load_image).transpose()?;
    let negative_image = config
        .negative
        .as_ref()
        .map(|neg| load_rgb_image(&neg.image_path))
        .transpose()?;

    let pixel_provider = PixelMatchProvider::new((&config.pixel_match).into())?;
    let negative = match (&config.negative, &negative_image) {
        (Some(neg), Some(image)) => Some(NegativeQuery {
            image,
            threshold: neg.threshold,
            mirror: neg.mirror,
        }),
        _ => None,
    };
    let pixel = pixel_provider.create_algorithm(&query, negative)?;
    let shape = if config.shape_match.enabled {
        let provider = ShapeMatchProvider::new((&config.shape_match).into())?;
        Some(provider.create_algorithm(&query, roi.as_ref())?)
    } else {
        None
    };

    let mut targets = Vec::with_capacity(config.targets.len());
    for target in &config.targets {
        let image = load_rgb_image(&target.image_path)?;
        let variants = target_variants(target, &image, &config.shape_match);
        targets.push(SearchTarget::with_variants(image, variants));
    }

    let outcome = if config.parallel {
        search_targets_par(&pixel, shape.as_ref(), &targets, config.topk)
    } else {
        search_targets(&pixel, shape.as_ref(), &targets, config.topk)
    };
    tracing::info!(
        targets = targets.len(),
        kept = outcome.records.len(),
        failed = outcome.failures.len(),
        "search finished"
    );

    let output = Output {
        records: outcome
            .records
            .iter()
            .map(|record| RecordJson::new(record, &config.targets))
            .collect(),
        failures: outcome
            .failures
            .iter()
            .map(|(index, err)| FailureJson {
                image_path: config.targets[*index].image_path.clone(),
                error: err.to_string(),
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{variant_or_warn, Image};
    use cdmatch::CdMatchError;

    #[test]
    fn unreadable_variant_becomes_absent() {
        let failed = Err(CdMatchError::ImageIo {
            reason: "truncated file".into(),
        });
        assert!(variant_or_warn("gradient.png", failed).is_none());

        let image = Image::from_gray8(vec![0; 4], 2, 2).unwrap();
        assert_eq!(variant_or_warn("gradient.png", Ok(image.clone())), Some(image));
    }
}
