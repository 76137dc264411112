use std::path::Path;
use std::sync::Arc;

use egui::ColorImage;
use tracing::debug;

use crate::animation::{Animation, SharedAnimation};
use crate::cache::{AnimationCache, DEFAULT_CAPACITY};
use crate::decode;
use crate::Result;

/// What a thumbnail shows
pub enum Thumbnail {
    /// Play it, the animation is in the cache
    Animated(SharedAnimation),
    /// Draw it as is. Always a single frame.
    Still(Animation),
}

fn allowed(path: &Path, mime_type: Option<&str>) -> bool {
    match mime_type {
        Some(mime) => decode::is_supported(mime),
        None => decode::guess_mime(path).is_some_and(|mime| decode::is_supported(&mime)),
    }
}

fn first_frame(animation: Animation) -> Animation {
    if animation.is_static() {
        return animation;
    }

    match animation.frame(0) {
        Some(frame) => Animation::still(ColorImage::clone(&frame.image)),
        None => animation,
    }
}

/// Owns the animation cache for a file view. Create it when the view comes
/// up and [`AnimatedThumbnails::shutdown`] it when the view goes away.
pub struct AnimatedThumbnails {
    cache: AnimationCache,
}

impl Default for AnimatedThumbnails {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AnimatedThumbnails {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: AnimationCache::new(capacity),
        }
    }

    pub fn cache(&self) -> &AnimationCache {
        &self.cache
    }

    /// The animation to play for the thumbnail of `uri`, or `None` if it
    /// should be shown as a still image. That is the case for mime types
    /// outside the allow list, files that fail to decode and single frame
    /// images. Only animated results are cached.
    pub fn animation_for(
        &self,
        uri: &str,
        path: &Path,
        mime_type: Option<&str>,
    ) -> Option<SharedAnimation> {
        if !allowed(path, mime_type) {
            return None;
        }

        match self.cached_or_decoded(uri, path) {
            Ok(Thumbnail::Animated(animation)) => Some(animation),
            Ok(Thumbnail::Still(_)) | Err(_) => None,
        }
    }

    /// Like [`Self::animation_for`], but hands back the decoded still instead
    /// of dropping it, so a caller that shows stills too decodes each file once.
    /// Files outside the allow list are always stills.
    pub fn thumbnail_for(
        &self,
        uri: &str,
        path: &Path,
        mime_type: Option<&str>,
    ) -> Result<Thumbnail> {
        if !allowed(path, mime_type) {
            return decode::load(path).map(|anim| Thumbnail::Still(first_frame(anim)));
        }

        self.cached_or_decoded(uri, path)
    }

    fn cached_or_decoded(&self, uri: &str, path: &Path) -> Result<Thumbnail> {
        if let Some(animation) = self.cache.get(uri) {
            return Ok(Thumbnail::Animated(animation));
        }

        let animation = decode::load(path)?;
        if animation.is_static() {
            debug!("{uri} is a single frame, showing it as a still");
            return Ok(Thumbnail::Still(animation));
        }

        let animation = Arc::new(animation);
        self.cache.put(uri, animation.clone());
        Ok(Thumbnail::Animated(animation))
    }

    /// Forget a file that changed or went away
    pub fn invalidate(&self, uri: &str) {
        self.cache.remove(uri);
    }

    pub fn shutdown(self) {
        self.cache.clear();
    }
}
