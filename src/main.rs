//! Noisescape - renders audio-driven spectral noise to PNG frames.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use noisescape::audio::WavLoader;
use noisescape::cli::Args;
use noisescape::progress::{ProgressBoard, ProgressReporter, REPORT_INTERVAL};
use noisescape::rendering::PngSequenceSink;
use noisescape::schedule::{render_partitions, FramePartition, FramePlan};
use noisescape::session::RenderSession;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = args.render_settings();
    settings.validate()?;

    let (scene, base_dir) = args.load_scene()?;
    let session = RenderSession::build(
        &scene,
        &base_dir,
        settings.width,
        settings.height,
        &WavLoader,
    )?;

    let sink = PngSequenceSink::create(&settings.output_dir)?;
    let plan = FramePlan::new(settings.frame_rate, session.duration_s());
    let partitions = FramePartition::for_settings(&settings);

    let board = Arc::new(ProgressBoard::new(settings.workers));
    let reporter = ProgressReporter::spawn(Arc::clone(&board), REPORT_INTERVAL);

    let start = Instant::now();
    let result = render_partitions(&session, &plan, &partitions, &sink, &board);
    reporter.finish();
    let frames = result?;

    log::info!(
        "rendered {} frames to {} in {:.1}s",
        frames,
        settings.output_dir.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
