//! Clickable image.

use std::fmt;

use horizon_forms_core::{ObjectId, RefreshSignal, Signal};

/// Mouse state reported by the host with a click.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseEventArgs {
    /// Horizontal position in the viewport.
    pub client_x: f64,
    /// Vertical position in the viewport.
    pub client_y: f64,
    /// Pressed button; 0 is the main button.
    pub button: i16,
    /// Number of consecutive clicks.
    pub detail: i64,
    /// Alt held.
    pub alt_key: bool,
    /// Ctrl held.
    pub ctrl_key: bool,
    /// Shift held.
    pub shift_key: bool,
    /// Meta held.
    pub meta_key: bool,
}

/// An image whose clicks are forwarded to the application.
pub struct Image {
    id: ObjectId,
    path: Option<String>,
    refresh: RefreshSignal,
    /// Raised with the host's mouse state on click.
    pub click: Signal<MouseEventArgs>,
}

impl Image {
    /// Create an image showing `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            path: Some(path.into()),
            refresh: RefreshSignal::new(),
            click: Signal::new(),
        }
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The image source.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Change the image source.
    pub fn set_path(&mut self, path: Option<String>) {
        if self.path != path {
            self.path = path;
            self.refresh.request();
        }
    }

    /// The widget's refresh signal.
    pub fn refresh(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// Forward a host click.
    pub fn on_click(&self, args: MouseEventArgs) {
        self.click.emit(args);
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_click_forwards_args() {
        let image = Image::new("logo.png");
        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();
        image.click.connect(move |args: &MouseEventArgs| *s.lock() = Some(*args));

        let args = MouseEventArgs {
            client_x: 12.0,
            client_y: 4.0,
            detail: 1,
            ..Default::default()
        };
        image.on_click(args);
        assert_eq!(*seen.lock(), Some(args));
    }

    #[test]
    fn test_path_change_refreshes() {
        let mut image = Image::new("a.png");
        image.set_path(Some("a.png".into()));
        assert!(!image.refresh().is_pending());
        image.set_path(None);
        assert!(image.refresh().take());
        assert_eq!(image.path(), None);
    }
}
