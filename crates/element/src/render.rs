//! The contract a UI framework supplies to project a widget onto an element.

use crate::error::ElementError;

/// Props handed to [`RenderCapability::mount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountProps {
    /// Value of the element's location attribute at connect time (empty when absent).
    pub location: String,
    /// Tag of the element being mounted.
    pub tag: String,
}

/// Mounts and unmounts a widget.
///
/// The bridge calls `unmount` at most once per handle returned by `mount`.
pub trait RenderCapability {
    type Handle;

    /// # Errors
    /// Returns [`ElementError::Render`] when the widget cannot be rendered.
    fn mount(&self, props: &MountProps) -> Result<Self::Handle, ElementError>;

    fn unmount(&self, handle: Self::Handle);
}
