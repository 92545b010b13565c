//! Frame scheduling across worker partitions.
//!
//! Frames are numbered from 1 and sampled at the middle of their interval.
//! Partition `i` of `n` owns every frame `f` with `f % n == i`, so
//! partitions never overlap and together cover every frame.

use rayon::prelude::*;

use crate::error::RenderError;
use crate::params::RenderSettings;
use crate::progress::{status_line, ProgressBoard, ProgressMessage};
use crate::rendering::FrameSink;
use crate::session::RenderSession;

/// One slice of the frame range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePartition {
    pub index: usize,
    pub total: usize,
}

impl FramePartition {
    pub fn new(index: usize, total: usize) -> Self {
        let total = total.max(1);
        Self {
            index: index % total,
            total,
        }
    }

    /// Every partition of a `total`-way split
    pub fn all(total: usize) -> Vec<Self> {
        (0..total.max(1)).map(|i| Self::new(i, total)).collect()
    }

    /// The partitions this process renders
    pub fn for_settings(settings: &RenderSettings) -> Vec<Self> {
        match settings.worker_index {
            Some(index) => vec![Self::new(index, settings.workers)],
            None => Self::all(settings.workers),
        }
    }

    pub fn owns(&self, frame: u64) -> bool {
        frame % self.total as u64 == self.index as u64
    }
}

/// Frame timing for a render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    pub frame_rate: f64,
    pub duration_s: f64,
}

impl FramePlan {
    pub fn new(frame_rate: f64, duration_s: f64) -> Self {
        Self {
            frame_rate,
            duration_s,
        }
    }

    pub fn frame_time(&self, frame: u64) -> f64 {
        (frame as f64 - 0.5) / self.frame_rate
    }

    /// Frames 1, 2, ... while the frame time is inside the duration
    pub fn frames(&self) -> impl Iterator<Item = u64> + '_ {
        (1..).take_while(move |&frame| self.frame_time(frame) < self.duration_s)
    }

    pub fn frames_for(&self, partition: FramePartition) -> impl Iterator<Item = u64> + '_ {
        self.frames().filter(move |&frame| partition.owns(frame))
    }

    pub fn frame_count(&self) -> u64 {
        self.frames().count() as u64
    }
}

/// Render one partition sequentially, returning the number of frames written
pub fn render_partition<S: FrameSink + ?Sized>(
    session: &RenderSession,
    plan: &FramePlan,
    partition: FramePartition,
    sink: &S,
    board: &ProgressBoard,
) -> Result<u64, RenderError> {
    let mut written = 0;
    for frame in plan.frames_for(partition) {
        let time = plan.frame_time(frame);
        board.post(
            partition.index,
            ProgressMessage {
                frame,
                line: status_line(frame, time, plan.duration_s, board.elapsed()),
            },
        );

        log::debug!("frame {} at {:.3}s", frame, time);
        let image = session.render_frame(time)?;
        sink.write(frame, &image)?;
        written += 1;
    }
    if written == 0 {
        log::warn!(
            "partition {}/{} owns no frames",
            partition.index,
            partition.total
        );
    }
    log::debug!(
        "partition {}/{} finished: {} frames",
        partition.index,
        partition.total,
        written
    );
    Ok(written)
}

/// Render the given partitions in parallel; the first error aborts the rest
pub fn render_partitions<S: FrameSink + ?Sized>(
    session: &RenderSession,
    plan: &FramePlan,
    partitions: &[FramePartition],
    sink: &S,
    board: &ProgressBoard,
) -> Result<u64, RenderError> {
    log::info!(
        "rendering {} partition(s) of {} frames at {} fps",
        partitions.len(),
        plan.frame_count(),
        plan.frame_rate
    );
    partitions
        .par_iter()
        .map(|&partition| render_partition(session, plan, partition, sink, board))
        .try_reduce(|| 0, |a, b| Ok(a + b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::WavLoader;
    use crate::compositor::Frame;
    use crate::error::SinkError;
    use crate::params::{LayerSpec, SceneConfig};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySink(Mutex<Vec<(u64, Frame)>>);

    impl FrameSink for MemorySink {
        fn write(&self, frame_index: u64, frame: &Frame) -> Result<(), SinkError> {
            self.0.lock().unwrap().push((frame_index, frame.clone()));
            Ok(())
        }
    }

    struct FailingSink;

    impl FrameSink for FailingSink {
        fn write(&self, _frame_index: u64, _frame: &Frame) -> Result<(), SinkError> {
            Err(SinkError::CreateDir {
                path: PathBuf::from("nowhere"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        }
    }

    fn background_session(duration: f64) -> RenderSession {
        let mut scene = SceneConfig::single_wav(PathBuf::from("unused.wav"));
        scene.layers = vec![LayerSpec {
            rgb: Some([0, 0, 0]),
            duration: Some(duration),
            ..Default::default()
        }];
        RenderSession::build(&scene, Path::new(""), 16, 9, &WavLoader).unwrap()
    }

    #[test]
    fn test_partition_ownership() {
        let partition = FramePartition::new(1, 3);
        let owned: Vec<u64> = (1..=12).filter(|&f| partition.owns(f)).collect();
        assert_eq!(owned, vec![1, 4, 7, 10]);

        let zero = FramePartition::new(0, 3);
        let owned: Vec<u64> = (1..=12).filter(|&f| zero.owns(f)).collect();
        assert_eq!(owned, vec![3, 6, 9, 12]);
    }

    #[test]
    fn test_frame_count_and_times() {
        let plan = FramePlan::new(30.0, 2.0);
        assert_eq!(plan.frame_count(), 60);
        assert_eq!(plan.frames().next(), Some(1));
        assert!((plan.frame_time(1) - 0.5 / 30.0).abs() < 1e-15);

        assert_eq!(FramePlan::new(30.0, 0.0).frame_count(), 0);
        // 0.02s still catches the first half-frame
        assert_eq!(FramePlan::new(30.0, 0.02).frame_count(), 1);
    }

    #[test]
    fn test_partitions_cover_every_frame_once() {
        let plan = FramePlan::new(30.0, 2.0);
        let mut seen: Vec<u64> = FramePartition::all(3)
            .into_iter()
            .flat_map(|p| plan.frames_for(p).collect::<Vec<_>>())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (1..=60).collect::<Vec<u64>>());
    }

    #[test]
    fn test_for_settings() {
        let mut settings = RenderSettings::new(PathBuf::from("out"));
        settings.workers = 4;
        assert_eq!(FramePartition::for_settings(&settings).len(), 4);
        settings.worker_index = Some(2);
        assert_eq!(
            FramePartition::for_settings(&settings),
            vec![FramePartition::new(2, 4)]
        );
        // Out-of-range index wraps: 4 of 4 owns the same frames as 0 of 4
        settings.worker_index = Some(4);
        assert!(settings.validate().is_ok());
        let wrapped = FramePartition::for_settings(&settings);
        assert_eq!(wrapped, vec![FramePartition::new(0, 4)]);
        let plan = FramePlan::new(30.0, 1.0);
        let owned: Vec<u64> = plan.frames_for(wrapped[0]).collect();
        assert_eq!(owned, vec![4, 8, 12, 16, 20, 24, 28]);

        settings.workers = 3;
        settings.worker_index = Some(4);
        assert!(settings.validate().is_ok());
        let owned: Vec<u64> = plan
            .frames_for(FramePartition::for_settings(&settings)[0])
            .take(3)
            .collect();
        assert_eq!(owned, vec![1, 4, 7]);
    }

    #[test]
    fn test_render_all_partitions() {
        let session = background_session(0.5);
        let plan = FramePlan::new(10.0, session.duration_s());
        let sink = MemorySink::default();
        let board = ProgressBoard::new(2);

        let written =
            render_partitions(&session, &plan, &FramePartition::all(2), &sink, &board).unwrap();
        assert_eq!(written, 5);

        let mut frames = sink.0.into_inner().unwrap();
        frames.sort_by_key(|(index, _)| *index);
        let indices: Vec<u64> = frames.iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert!(frames.iter().all(|(_, f)| f.width == 16 && f.height == 9));
    }

    #[test]
    fn test_single_worker_index() {
        let session = background_session(0.5);
        let plan = FramePlan::new(10.0, session.duration_s());
        let sink = MemorySink::default();
        let board = ProgressBoard::new(2);

        let written =
            render_partitions(&session, &plan, &[FramePartition::new(1, 2)], &sink, &board)
                .unwrap();
        assert_eq!(written, 3);
        let mut indices: Vec<u64> = sink.0.into_inner().unwrap().iter().map(|(i, _)| *i).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![1, 3, 5]);
    }

    #[test]
    fn test_sink_error_aborts() {
        let session = background_session(0.5);
        let plan = FramePlan::new(10.0, session.duration_s());
        let board = ProgressBoard::new(1);
        let result = render_partitions(&session, &plan, &FramePartition::all(1), &FailingSink, &board);
        assert!(matches!(result, Err(RenderError::Sink(_))));
    }
}
