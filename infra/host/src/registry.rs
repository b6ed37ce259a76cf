//! Custom element registry and per-element attribute access.

use crate::error::HostError;
use std::rc::Rc;

/// Process-wide mapping from tag names to element classes, owned by the host.
pub trait TagRegistry {
    /// What the host registers under a tag (a constructor in the browser).
    type Class;

    fn has_tag(&self, name: &str) -> bool;

    /// Registers `class` under `name`.
    ///
    /// # Errors
    /// Returns [`HostError::AlreadyDefined`] when `name` is taken and
    /// [`HostError::InvalidTag`] when it is not a valid custom element name.
    fn define(&self, name: &str, class: Self::Class) -> Result<(), HostError>;
}

impl<T: TagRegistry + ?Sized> TagRegistry for Rc<T> {
    type Class = T::Class;

    fn has_tag(&self, name: &str) -> bool {
        (**self).has_tag(name)
    }

    fn define(&self, name: &str, class: Self::Class) -> Result<(), HostError> {
        (**self).define(name, class)
    }
}

/// Attribute read access on one element instance.
pub trait ElementHost {
    fn attribute(&self, name: &str) -> Option<String>;
}

impl<T: ElementHost + ?Sized> ElementHost for Rc<T> {
    fn attribute(&self, name: &str) -> Option<String> {
        (**self).attribute(name)
    }
}
