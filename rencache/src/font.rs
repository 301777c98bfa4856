use crate::hash::fnv1a;
use crate::FONT_FALLBACK_MAX;
use std::rc::Rc;

/// A sized font face consumed by the cache.
///
/// The cache needs group metrics up front (to compute a text command's
/// screen footprint) and text drawing only at replay, through the renderer.
/// The tab size is mutable state on the face; the cache records it with
/// every text command and restores it before replaying the draw.
pub trait Font {
    /// Line height in pixels.
    fn height(&self) -> i32;

    fn tab_size(&self) -> i32;

    fn set_tab_size(&self, n: i32);

    /// Advance width of `text` in pixels.
    fn width(&self, text: &str) -> f32;
}

/// A primary font plus up to [`FONT_FALLBACK_MAX`]` - 1` fallbacks.
///
/// Group metrics come from the primary face. Command identity uses the
/// handle addresses, so two frames drawing with the same group hash the
/// same way.
#[derive(Clone)]
pub struct FontGroup {
    fonts: [Option<Rc<dyn Font>>; FONT_FALLBACK_MAX],
}

impl Default for FontGroup {
    fn default() -> Self {
        FontGroup {
            fonts: std::array::from_fn(|_| None),
        }
    }
}

impl FontGroup {
    pub fn new(primary: Rc<dyn Font>) -> FontGroup {
        let mut group = FontGroup::default();
        group.fonts[0] = Some(primary);
        group
    }

    /// Builds a group from up to [`FONT_FALLBACK_MAX`] faces; extras are
    /// dropped.
    pub fn with_fallbacks(fonts: impl IntoIterator<Item = Rc<dyn Font>>) -> FontGroup {
        let mut group = FontGroup::default();
        for (slot, font) in group.fonts.iter_mut().zip(fonts) {
            *slot = Some(font);
        }
        group
    }

    pub fn primary(&self) -> Option<&Rc<dyn Font>> {
        self.fonts[0].as_ref()
    }

    pub fn height(&self) -> i32 {
        self.primary().map_or(0, |font| font.height())
    }

    pub fn width(&self, text: &str) -> f32 {
        self.primary().map_or(0.0, |font| font.width(text))
    }

    pub fn tab_size(&self) -> i32 {
        self.primary().map_or(0, |font| font.tab_size())
    }

    /// Sets the tab size on every face of the group.
    pub fn set_tab_size(&self, n: i32) {
        for font in self.fonts.iter().flatten() {
            font.set_tab_size(n);
        }
    }

    /// Folds the handle addresses into the command hash state.
    pub(crate) fn fold(&self, h: &mut u32) {
        for slot in &self.fonts {
            let address = slot
                .as_ref()
                .map_or(0, |font| Rc::as_ptr(font) as *const () as usize);
            fnv1a(h, &address.to_le_bytes());
        }
    }
}
