//! Rendering surface seam and a CPU preview implementation.
pub mod frame;
pub mod preview;

use crate::{foundation::error::CubefieldResult, render::frame::FrameImage, scene::field::CubeField};

/// Something that draws a [`CubeField`] and can hand back what it drew.
pub trait RenderSurface {
    /// Output size in pixels.
    fn size(&self) -> (u32, u32);

    fn render(&mut self, field: &CubeField) -> CubefieldResult<()>;

    /// Latest rendered image, or `None` if the surface has nothing to give.
    fn capture(&mut self) -> CubefieldResult<Option<FrameImage>>;
}
