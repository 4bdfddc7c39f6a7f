use std::sync::Arc;

use crate::{
    assemble::{CancelToken, DisposalTracker},
    error::{StatcardError, StatcardResult},
    model::{CardContext, CardRequest},
    normalize::NormalizeOpts,
    store::AssetStore,
    text::Font,
};

pub mod challenge;
pub mod character;
pub mod roster;

/// Rendering knobs shared by every card family.
#[derive(Clone, Copy, Debug)]
pub struct RenderOpts {
    /// Portrait normalization targets for the character sheet.
    pub portrait: NormalizeOpts,
    /// Rounded-corner mask radius applied as the final draw step.
    pub corner_radius: f32,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            portrait: NormalizeOpts::default(),
            corner_radius: 30.0,
        }
    }
}

/// Entry point of the compositing pipeline: dispatches a [`CardContext`] to
/// its family's draw program and returns the encoded byte stream.
///
/// Renders are independent; one renderer may serve many concurrent renders.
pub struct CardRenderer {
    pub(crate) store: Arc<dyn AssetStore>,
    pub(crate) font: Font,
    pub(crate) tracker: Arc<DisposalTracker>,
    pub(crate) opts: RenderOpts,
}

impl CardRenderer {
    pub fn new(store: Arc<dyn AssetStore>, font_bytes: &[u8]) -> StatcardResult<Self> {
        Self::with_opts(store, font_bytes, RenderOpts::default())
    }

    pub fn with_opts(
        store: Arc<dyn AssetStore>,
        font_bytes: &[u8],
        opts: RenderOpts,
    ) -> StatcardResult<Self> {
        Ok(Self {
            store,
            font: Font::from_bytes(font_bytes)?,
            tracker: DisposalTracker::new(),
            opts,
        })
    }

    /// Observability hook for the disposal invariant: after any `render`
    /// call returns, `tracker().live()` is zero.
    pub fn tracker(&self) -> &Arc<DisposalTracker> {
        &self.tracker
    }

    /// Render one card. All-or-nothing: on failure no bytes are produced
    /// and the error is the single wrapped card-generation failure (or
    /// `Canceled` when the upstream token fired).
    #[tracing::instrument(skip_all, fields(user_id = ctx.user_id, uid = %ctx.profile.uid))]
    pub fn render(&self, ctx: &CardContext, cancel: &CancelToken) -> StatcardResult<Vec<u8>> {
        let family = match &ctx.request {
            CardRequest::Character(_) => "character",
            CardRequest::Roster(_) => "roster",
            CardRequest::Challenge(_) => "challenge",
        };
        tracing::info!(family, "rendering card");

        let result = match &ctx.request {
            CardRequest::Character(info) => character::render(self, ctx, info, cancel),
            CardRequest::Roster(data) => roster::render(self, ctx, data, cancel),
            CardRequest::Challenge(data) => challenge::render(self, ctx, data, cancel),
        };

        match result {
            Ok(bytes) => {
                tracing::info!(family, bytes = bytes.len(), "card rendered");
                Ok(bytes)
            }
            Err(err) => {
                if err.is_canceled() {
                    tracing::info!(family, "card render canceled");
                } else if matches!(err, StatcardError::Data(_)) {
                    let payload = serde_json::to_string(&ctx.request).unwrap_or_default();
                    tracing::error!(family, %err, %payload, "card data violated draw assumptions");
                } else {
                    tracing::error!(family, %err, "card render failed");
                }
                Err(err.into_card_generation())
            }
        }
    }
}
