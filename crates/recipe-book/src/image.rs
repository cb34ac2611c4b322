//! Contract with the platform photo collaborators (camera, photo library).
//!
//! The book never captures images itself; it only needs a picker that
//! eventually calls back with encoded bytes, or with nothing if the user
//! cancelled.

use tokio::sync::oneshot;

/// Where a photo comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSource {
    Camera,
    Library,
}

impl ImageSource {
    pub const ALL: [ImageSource; 2] = [ImageSource::Camera, ImageSource::Library];

    pub fn label(self) -> &'static str {
        match self {
            ImageSource::Camera => "Camera",
            ImageSource::Library => "Photo Library",
        }
    }
}

/// Completion callback handed to a picker.
pub type ImageCallback = Box<dyn FnOnce(Option<Vec<u8>>) + Send>;

pub trait ImagePicker {
    fn is_available(&self, source: ImageSource) -> bool;

    /// Present the picker for `source` and call `on_done` exactly once.
    fn pick(&self, source: ImageSource, on_done: ImageCallback);
}

/// Sources the photo chooser should offer; empty means hide the chooser.
pub fn available_sources<P: ImagePicker + ?Sized>(picker: &P) -> Vec<ImageSource> {
    ImageSource::ALL
        .into_iter()
        .filter(|s| picker.is_available(*s))
        .collect()
}

/// Ask `picker` for a photo and wait for its callback.
///
/// Resolves to `None` when the user cancels, when the source is unavailable,
/// or when the picker drops the callback without calling it.
pub async fn request_image<P: ImagePicker + ?Sized>(
    picker: &P,
    source: ImageSource,
) -> Option<Vec<u8>> {
    if !picker.is_available(source) {
        tracing::debug!(source = source.label(), "image source unavailable");
        return None;
    }

    let (tx, rx) = oneshot::channel();
    picker.pick(
        source,
        Box::new(move |bytes| {
            let _ = tx.send(bytes);
        }),
    );

    rx.await.ok().flatten()
}
