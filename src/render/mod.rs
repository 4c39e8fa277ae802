//! Rendering backends implementing [`Renderer`](crate::project::Renderer).
//!
//! All geometry (scaling, flipping, clipping, dropping) is done by
//! [`project::paint`](crate::project::paint); backends only open the
//! document, expose page sizes, draw rectangles and save.

#[cfg(feature = "pdf")]
pub mod pdf;
