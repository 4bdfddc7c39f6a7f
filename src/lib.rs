//! Statcard is a deterministic card-compositing engine.
//!
//! It assembles game "stat cards" (character sheets, roster overviews,
//! end-game challenge summaries) from store-provisioned bitmap assets,
//! text, and procedural decorations, and flattens each card to a
//! fixed-parameter JPEG byte stream. Identical inputs always produce
//! byte-identical output; the test suite holds the pipeline to that.
//!
//! The pipeline: a [`CardContext`] enters [`CardRenderer::render`], the
//! concurrent assembler resolves every required asset through the
//! [`AssetStore`], the family's draw program executes in fixed layer order,
//! and the encoder emits the final bytes. Every decoded asset is tracked
//! and released before the call returns, on every exit path.
#![forbid(unsafe_code)]

pub mod assemble;
pub mod canvas;
pub mod cards;
pub mod color;
pub mod encode;
pub mod error;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod palette;
pub mod raster;
pub mod slots;
pub mod store;
pub mod text;

pub use assemble::{AssetBundle, AssetHandle, CancelToken, DisposalTracker};
pub use canvas::Canvas;
pub use cards::{CardRenderer, RenderOpts};
pub use color::Rgba;
pub use error::{StatcardError, StatcardResult};
pub use layout::{CellPosition, GridLayout, GridSpec, compute_layout};
pub use model::{CardContext, CardRequest, Profile};
pub use normalize::{NormalizeOpts, normalize};
pub use store::{AssetStore, FsAssetStore, MemoryAssetStore};
pub use text::Font;
