pub mod clock;
pub mod ease;
pub mod keyframe;
pub mod playback;
pub mod track;
