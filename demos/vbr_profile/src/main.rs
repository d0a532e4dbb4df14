use std::path::PathBuf;

use argh::FromArgs;

use vbr::d3::io::stl;
use vbr::orient::{BatchProfileBuilder, EstimatorConfig, SkippedEntry};

#[derive(FromArgs, Debug)]
/// Compute the pitch, roll and yaw of every STL model in a directory.
struct Args {
    /// path to the directory containing the STL files
    #[argh(option, short = 'i')]
    stl_dir: PathBuf,

    /// number of threads to use
    #[argh(option, short = 'n', default = "4")]
    num_threads: usize,

    /// optional path to write the profile as JSON
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// optional JSON file with the estimator configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// estimate on the calling thread only
    #[argh(switch)]
    sequential: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.num_threads)
        .build_global()?;

    let config = match &args.config {
        Some(path) => serde_json::from_str::<EstimatorConfig>(&std::fs::read_to_string(path)?)?,
        None => EstimatorConfig::default(),
    };
    log::debug!("Estimator config: {:?}", config);

    // Walk through the directory and collect the paths of the STL files
    let stl_paths: Vec<PathBuf> = walkdir::WalkDir::new(&args.stl_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("stl"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();

    if stl_paths.is_empty() {
        println!("No STL files found in the directory");
        return Ok(());
    }

    log::info!("Found {} STL files", stl_paths.len());

    // files that cannot be read are reported with the degenerate point clouds
    let mut inputs = Vec::with_capacity(stl_paths.len());
    let mut unreadable = Vec::new();
    for path in &stl_paths {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        match stl::read_stl(path) {
            Ok(cloud) => inputs.push((name, cloud)),
            Err(err) => {
                log::warn!("Skipping {}: {}", name, err);
                unreadable.push(SkippedEntry::unreadable(name, err));
            }
        }
    }

    let mut batch = BatchProfileBuilder::new(config)
        .with_parallel(!args.sequential)
        .build_sorted_by_key(inputs, |name| name.to_string());
    batch.add_skipped(unreadable);

    for profile in batch.profiles() {
        println!("File: {}", profile.identifier());
        println!(
            "Pitch: {:.2}°, Roll: {:.2}°, Yaw: {:.2}°",
            profile.pitch(),
            profile.roll(),
            profile.yaw()
        );
        println!("Centroid: {:?}\n", profile.centroid());
    }

    if !batch.skipped().is_empty() {
        println!("Skipped {} files", batch.skipped().len());
    }

    if let Some(output) = &args.output {
        std::fs::write(output, serde_json::to_string_pretty(&batch)?)?;
        log::info!("Profile written to {}", output.display());
    }

    Ok(())
}
