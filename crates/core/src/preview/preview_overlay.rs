/// Absolute URL of an image shown in the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Part of the overlay that received a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dimmed area around the enlarged image.
    Backdrop,
    /// The enlarged image or its frame.
    Image,
    CloseButton,
}

/// Full-size preview of a single image. Opening always replaces whatever is
/// shown; there is no stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PreviewOverlay {
    #[default]
    Closed,
    Open(ImageRef),
}

impl PreviewOverlay {
    pub fn open(&mut self, image: ImageRef) {
        *self = PreviewOverlay::Open(image);
    }

    pub fn close(&mut self) {
        *self = PreviewOverlay::Closed;
    }

    /// Clicks on the image itself are contained; anything else closes.
    pub fn click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Image => {}
            ClickTarget::Backdrop | ClickTarget::CloseButton => self.close(),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, PreviewOverlay::Open(_))
    }

    pub fn image(&self) -> Option<&ImageRef> {
        match self {
            PreviewOverlay::Open(image) => Some(image),
            PreviewOverlay::Closed => None,
        }
    }
}
