//! # Cubefield guide
//!
//! A walkthrough of how a scene turns into frames. For command-line usage see `README.md`.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`SceneFile`](crate::SceneFile): the authored JSON (images, tuning, keyframes)
//! - [`Timeline`](crate::Timeline): validated keyframes sampled at a time
//! - [`TimelineSample`](crate::TimelineSample): camera, layout config and progress for one instant
//! - [`CubeField`](crate::CubeField): the live instance buffer plus start/target positions
//! - [`RenderSurface`](crate::RenderSurface): draws a field and hands back an image
//! - [`FrameExporter`](crate::FrameExporter): steps a virtual clock and persists every frame
//!
//! One tick is always the same three steps:
//!
//! 1. Sample the timeline: [`Timeline::sample_with`](crate::Timeline::sample_with)
//! 2. Apply the sample: [`CubeField::apply`](crate::CubeField::apply)
//! 3. Draw: [`RenderSurface::render`](crate::RenderSurface::render)
//!
//! Live playback feeds step 1 with a [`WallClock`](crate::WallClock); export feeds it with a
//! [`VirtualClock`](crate::VirtualClock) so output never depends on how fast frames render.
//!
//! ---
//!
//! ## Layouts
//!
//! A [`LayoutKind`](crate::LayoutKind) maps every instance to a unit position. Grid layouts
//! walk an `N×N×N` index cube, normalise each axis into `[0, 1]` and push it through a
//! coordinate-system formula (elliptic cylindrical, prolate spheroidal, bispherical and so
//! on). `Sphere`, `Cylinder` and `Scatter` use the flat instance index instead.
//!
//! `start_hour` shifts one axis cyclically by `start_hour / 24`: the third grid axis for grid
//! layouts, the flat index for the others. Hour 24 is the same layout as hour 0.
//!
//! Every formula clamps its inputs away from singular points, so the generator always returns
//! finite positions for `N` in `1..=24`.
//!
//! ---
//!
//! ## Morphing
//!
//! Layout targets are regenerated only when the layout, `N` or `start_hour` change. At that
//! moment the current positions become the new start, so a change mid-transition continues
//! from where the cubes are. Crossing a keyframe boundary without a key change settles the
//! running morph on its target, so the next segment starts from the finished layout.
//!
//! Each tick blends `start → target` by the sample's `config_progress`, scales by the live
//! spacing and writes 16-float transforms straight into the buffer.
//!
//! Layouts whose [`orients_to_origin`](crate::LayoutKind::orients_to_origin) is true build a
//! look-at rotation per cube. Everything else takes the scale-and-translate path.
//!
//! ---
//!
//! ## Timeline sampling
//!
//! Within a segment the first `hold_delay_secs` are pinned at progress 0, the rest is eased
//! with the scene [`Ease`](crate::Ease). An optional [`Snap`](crate::Snap) gives the layout morph
//! its own faster curve while the camera keeps the scene ease. Past the final keyframe the
//! sample is frozen at that keyframe and `finished` is set.
//!
//! ---
//!
//! ## Atlas
//!
//! [`build_atlas`](crate::build_atlas) loads every image in parallel through an
//! [`ImageSource`](crate::ImageSource) and packs them into a `ceil(√n)` column grid. A failed load
//! is logged and leaves its cell blank; nothing else changes. Instance `i` samples image
//! `i % n`.
//!
//! ---
//!
//! ## Export
//!
//! ```no_run
//! use cubefield::{
//!     CubeField, DirectorySink, ExportConfig, FrameExporter, PreviewRenderer, PreviewSettings,
//!     SceneFile,
//! };
//!
//! # fn main() -> cubefield::CubefieldResult<()> {
//! let scene = SceneFile::load(std::path::Path::new("scene.json"))?;
//! let timeline = scene.timeline()?;
//! let mut field = CubeField::new(scene.images.len());
//! let mut surface = PreviewRenderer::new(PreviewSettings::default(), Vec::new())?;
//! let mut sink = DirectorySink::new("frames");
//!
//! let exporter = FrameExporter::new(ExportConfig::new(
//!     scene.name.as_str(),
//!     scene.total_frames()?,
//!     scene.fps()?,
//! ));
//! let report = exporter.run(&timeline, &mut field, &mut surface, &mut sink, &mut |p| {
//!     eprintln!("{:.0}%", p.percent());
//! });
//! report.into_result()?;
//! # Ok(())
//! # }
//! ```
//!
//! `persist` is synchronous, so a slow sink slows the export down instead of queueing
//! frames. The first capture or persist error ends the run with
//! [`ExportState::Failed`](crate::ExportState::Failed) and the sink is told to abort.
