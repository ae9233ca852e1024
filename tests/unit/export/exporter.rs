use std::time::{Duration, Instant};

use crate::{
    export::sink::InMemorySink,
    foundation::core::GridSize,
    layout::kind::LayoutKind,
    render::{
        frame::FrameImage,
        preview::{PreviewRenderer, PreviewSettings},
    },
    timeline::keyframe::{CameraPose, FrameConfig, Keyframe, SceneTuning},
};

use super::*;

fn key(time: f64, layout: LayoutKind, n: u32, radius: f32) -> Keyframe {
    Keyframe {
        time,
        camera: CameraPose {
            radius,
            theta: 0.2,
            phi: 1.1,
        },
        config: FrameConfig {
            layout,
            n: GridSize::new(n).unwrap(),
            spacing: 1.0,
            cube_size: 0.8,
            start_hour: 0.0,
        },
    }
}

fn timeline() -> Timeline {
    Timeline::new(
        vec![
            key(0.0, LayoutKind::Cube, 4, 20.0),
            key(0.5, LayoutKind::Sphere, 5, 14.0),
            key(1.0, LayoutKind::Cylinder, 5, 18.0),
        ],
        SceneTuning::default(),
    )
    .unwrap()
}

fn fps30() -> Fps {
    Fps::whole(30).unwrap()
}

/// Surface that counts passes and returns a frame tagged with the render count.
#[derive(Default)]
struct CountingSurface {
    renders: u64,
    return_none: bool,
}

impl RenderSurface for CountingSurface {
    fn size(&self) -> (u32, u32) {
        (2, 2)
    }

    fn render(&mut self, _field: &CubeField) -> CubefieldResult<()> {
        self.renders += 1;
        Ok(())
    }

    fn capture(&mut self) -> CubefieldResult<Option<FrameImage>> {
        if self.return_none {
            return Ok(None);
        }
        Ok(Some(FrameImage::solid(2, 2, [self.renders as u8, 0, 0, 255])))
    }
}

#[derive(Clone, Debug)]
struct PersistCall {
    index: u64,
    started: Instant,
    finished: Instant,
}

/// Sink that sleeps inside `persist` and can be told to fail on one frame.
#[derive(Default)]
struct SlowSink {
    delay: Duration,
    fail_at: Option<u64>,
    calls: Vec<PersistCall>,
    ended: bool,
    aborted: bool,
}

impl FrameSink for SlowSink {
    fn begin(&mut self, _cfg: &SinkConfig) -> CubefieldResult<()> {
        Ok(())
    }

    fn persist(&mut self, key: &FrameKey, _frame: &FrameImage) -> CubefieldResult<()> {
        let started = Instant::now();
        std::thread::sleep(self.delay);
        self.calls.push(PersistCall {
            index: key.index.0,
            started,
            finished: Instant::now(),
        });
        if self.fail_at == Some(key.index.0) {
            return Err(CubefieldError::persist("backend rejected frame"));
        }
        Ok(())
    }

    fn end(&mut self) -> CubefieldResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn persists_are_strictly_sequential() {
    let tl = timeline();
    let mut field = CubeField::new(3);
    let mut surface = CountingSurface::default();
    let mut sink = SlowSink {
        delay: Duration::from_millis(2),
        ..SlowSink::default()
    };
    let exporter = FrameExporter::new(ExportConfig::new("seq", 30, fps30()));
    let report = exporter.run(&tl, &mut field, &mut surface, &mut sink, &mut |_| {});

    assert_eq!(report.state, ExportState::Completed);
    assert_eq!(report.frames_written, 30);
    assert!(sink.ended);
    assert_eq!(sink.calls.len(), 30);
    for (i, call) in sink.calls.iter().enumerate() {
        assert_eq!(call.index, i as u64);
    }
    for pair in sink.calls.windows(2) {
        assert!(pair[1].started > pair[0].started);
        assert!(pair[1].started >= pair[0].finished);
    }
}

#[test]
fn each_frame_gets_the_configured_render_passes() {
    let tl = timeline();
    let mut field = CubeField::new(1);
    let mut surface = CountingSurface::default();
    let mut sink = InMemorySink::new();
    let exporter = FrameExporter::new(ExportConfig::new("seq", 4, fps30()));
    let report = exporter.run(&tl, &mut field, &mut surface, &mut sink, &mut |_| {});
    assert_eq!(report.state, ExportState::Completed);
    assert_eq!(surface.renders, 4 * u64::from(DEFAULT_RENDER_PASSES));
    // Each capture follows both passes of its own frame.
    assert_eq!(sink.frames[0].1.pixel(0, 0), Some([2, 0, 0, 255]));
    assert_eq!(sink.frames[3].1.pixel(0, 0), Some([8, 0, 0, 255]));
}

#[test]
fn persist_failure_stops_before_next_frame() {
    let tl = timeline();
    let mut field = CubeField::new(1);
    let mut surface = CountingSurface::default();
    let mut sink = SlowSink {
        fail_at: Some(5),
        ..SlowSink::default()
    };
    let exporter = FrameExporter::new(ExportConfig::new("seq", 30, fps30()));
    let report = exporter.run(&tl, &mut field, &mut surface, &mut sink, &mut |_| {});

    assert_eq!(report.state, ExportState::Failed);
    assert_eq!(report.frames_written, 5);
    assert!(matches!(report.last_error, Some(CubefieldError::Persist(_))));
    assert_eq!(sink.calls.last().map(|c| c.index), Some(5));
    assert!(sink.calls.iter().all(|c| c.index <= 5));
    assert!(sink.aborted);
    assert!(!sink.ended);
    // Rendering stopped with frame 5.
    assert_eq!(surface.renders, 6 * u64::from(DEFAULT_RENDER_PASSES));
}

#[test]
fn missing_capture_fails_the_export() {
    let tl = timeline();
    let mut field = CubeField::new(1);
    let mut surface = CountingSurface {
        return_none: true,
        ..CountingSurface::default()
    };
    let mut sink = InMemorySink::new();
    let exporter = FrameExporter::new(ExportConfig::new("seq", 10, fps30()));
    let report = exporter.run(&tl, &mut field, &mut surface, &mut sink, &mut |_| {});

    assert_eq!(report.state, ExportState::Failed);
    assert_eq!(report.frames_written, 0);
    assert!(matches!(report.last_error, Some(CubefieldError::Capture(_))));
    assert!(sink.frames.is_empty());
    assert!(sink.aborted);
    assert!(report.into_result().is_err());
}

#[test]
fn cancel_stops_at_next_frame_boundary() {
    let tl = timeline();
    let mut field = CubeField::new(1);
    let mut surface = CountingSurface::default();
    let mut sink = InMemorySink::new();
    let exporter = FrameExporter::new(ExportConfig::new("seq", 30, fps30()));
    let cancel = exporter.cancel_handle();
    let report = exporter.run(&tl, &mut field, &mut surface, &mut sink, &mut |p| {
        if p.frames_done == 3 {
            cancel.stop();
        }
    });

    assert_eq!(report.state, ExportState::Cancelled);
    assert_eq!(report.frames_written, 3);
    assert_eq!(sink.frames.len(), 3);
    assert!(sink.aborted);
    let report = report.into_result().unwrap();
    assert!(report.last_error.is_none());
}

#[test]
fn progress_reaches_one_hundred_percent() {
    let tl = timeline();
    let mut field = CubeField::new(1);
    let mut surface = CountingSurface::default();
    let mut sink = InMemorySink::new();
    let mut seen = Vec::new();
    let exporter = FrameExporter::new(ExportConfig::new("seq", 4, fps30()));
    exporter.run(&tl, &mut field, &mut surface, &mut sink, &mut |p| {
        seen.push(p.percent());
    });
    assert_eq!(seen, vec![25.0, 50.0, 75.0, 100.0]);
}

#[test]
fn export_is_reproducible() {
    let tl = timeline();
    let run = || {
        let mut field = CubeField::new(3);
        let mut surface = PreviewRenderer::new(
            PreviewSettings {
                width: 32,
                height: 24,
                ..PreviewSettings::default()
            },
            vec![[200, 40, 40, 255], [40, 200, 40, 255], [40, 40, 200, 255]],
        )
        .unwrap();
        let mut sink = InMemorySink::new();
        let exporter = FrameExporter::new(ExportConfig::new("seq", 31, fps30()));
        let report = exporter.run(&tl, &mut field, &mut surface, &mut sink, &mut |_| {});
        assert_eq!(report.state, ExportState::Completed);
        (sink.frames, field.eye())
    };
    let (a, eye_a) = run();
    let (b, eye_b) = run();
    assert_eq!(a, b);
    assert_eq!(eye_a, eye_b);
    // Frame 30 at 30 fps lands on the final keyframe.
    assert_eq!(eye_a, tl.sample(1.0).eye);
}

#[test]
fn invalid_config_fails_without_touching_the_sink() {
    let tl = timeline();
    let mut field = CubeField::new(1);
    let mut surface = CountingSurface::default();
    let mut sink = SlowSink::default();
    let exporter = FrameExporter::new(ExportConfig::new("bad/name", 3, fps30()));
    let report = exporter.run(&tl, &mut field, &mut surface, &mut sink, &mut |_| {});
    assert_eq!(report.state, ExportState::Failed);
    assert!(matches!(report.last_error, Some(CubefieldError::Validation(_))));
    assert!(sink.calls.is_empty());
    assert_eq!(surface.renders, 0);
}
