use std::{
    collections::{BTreeSet, HashMap},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use image::RgbaImage;
use rayon::prelude::*;

use crate::{
    error::{StatcardError, StatcardResult},
    store::{AssetStore, decode_rgba},
};

/// Counts every asset handle acquired and released across renders.
///
/// The leak invariant of the pipeline: after any render returns — success,
/// failure or cancellation — `live()` is zero. Handles release through RAII,
/// so the tracker is the observable witness, not the mechanism.
#[derive(Debug, Default)]
pub struct DisposalTracker {
    acquired: AtomicU64,
    released: AtomicU64,
}

impl DisposalTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> u64 {
        self.acquired
            .load(Ordering::SeqCst)
            .saturating_sub(self.released.load(Ordering::SeqCst))
    }

    fn register(self: &Arc<Self>) -> DisposalGuard {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        DisposalGuard {
            tracker: Arc::clone(self),
        }
    }
}

#[derive(Debug)]
struct DisposalGuard {
    tracker: Arc<DisposalTracker>,
}

impl Drop for DisposalGuard {
    fn drop(&mut self) {
        self.tracker.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Decoded bitmap bound to one render invocation.
///
/// The owning compositor may mutate the bitmap (resize, dim) freely; the
/// registration guard releases exactly once when the handle drops.
#[derive(Debug)]
pub struct AssetHandle {
    name: String,
    pub image: RgbaImage,
    _guard: DisposalGuard,
}

impl AssetHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Upstream cancellation signal, honored between the fetch and draw phases.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> StatcardResult<()> {
        if self.is_canceled() {
            Err(StatcardError::Canceled)
        } else {
            Ok(())
        }
    }
}

/// Fetch and decode one required asset, registering it for disposal.
pub fn fetch_asset(
    store: &dyn AssetStore,
    tracker: &Arc<DisposalTracker>,
    name: &str,
) -> StatcardResult<AssetHandle> {
    let bytes = store.open_read(name)?;
    let image = decode_rgba(name, &bytes)?;
    tracing::trace!(asset = name, width = image.width(), height = image.height(), "decoded asset");
    Ok(AssetHandle {
        name: name.to_string(),
        image,
        _guard: tracker.register(),
    })
}

/// Optional-asset policy hook: a missing blob yields `None` so the call site
/// substitutes its placeholder; a decode failure still aborts.
pub fn fetch_optional(
    store: &dyn AssetStore,
    tracker: &Arc<DisposalTracker>,
    name: &str,
) -> StatcardResult<Option<AssetHandle>> {
    match fetch_asset(store, tracker, name) {
        Ok(handle) => Ok(Some(handle)),
        Err(e) if e.is_not_found() => {
            tracing::debug!(asset = name, "optional asset missing, using placeholder");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Keyed collection of decoded assets produced by one fan-out.
#[derive(Debug, Default)]
pub struct AssetBundle {
    handles: HashMap<String, AssetHandle>,
}

impl AssetBundle {
    /// Fan out fetch+decode for every name concurrently and join all.
    ///
    /// The first failure aborts the whole bundle; every handle decoded
    /// before the abort is already registered with the tracker and released
    /// on the way out. Result keying is by logical name, independent of
    /// completion order.
    pub fn fetch_all(
        store: &dyn AssetStore,
        tracker: &Arc<DisposalTracker>,
        names: impl IntoIterator<Item = String>,
    ) -> StatcardResult<Self> {
        let unique: BTreeSet<String> = names.into_iter().collect();
        tracing::debug!(count = unique.len(), "fetching asset bundle");

        let handles = unique
            .par_iter()
            .map(|name| fetch_asset(store, tracker, name))
            .collect::<StatcardResult<Vec<AssetHandle>>>()?;

        Ok(Self {
            handles: handles
                .into_iter()
                .map(|h| (h.name.clone(), h))
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn get(&self, name: &str) -> StatcardResult<&AssetHandle> {
        self.handles
            .get(name)
            .ok_or_else(|| StatcardError::asset(format!("asset '{name}' missing from bundle")))
    }

    pub fn get_mut(&mut self, name: &str) -> StatcardResult<&mut AssetHandle> {
        self.handles
            .get_mut(name)
            .ok_or_else(|| StatcardError::asset(format!("asset '{name}' missing from bundle")))
    }

    pub fn take(&mut self, name: &str) -> Option<AssetHandle> {
        self.handles.remove(name)
    }
}
