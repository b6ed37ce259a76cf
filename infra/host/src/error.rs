use hatch_kernel::TagGuardError;
use std::borrow::Cow;

/// Errors reported by a host backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    /// The tag name is not a valid custom element name.
    #[error("Invalid tag{}: {source}", format_context(.context))]
    InvalidTag { source: TagGuardError, context: Option<Cow<'static, str>> },

    /// The registry already holds a class under this tag.
    #[error("Tag already defined{}: {message}", format_context(.context))]
    AlreadyDefined { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The node id does not refer to a node attached to the document.
    #[error("Node not found{}: {message}", format_context(.context))]
    NodeNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A platform object (window, document head, registry) is missing.
    #[error("Host unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An exception thrown by the JavaScript side.
    #[error("JavaScript error{}: {message}", format_context(.context))]
    Js { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<TagGuardError> for HostError {
    fn from(source: TagGuardError) -> Self {
        Self::InvalidTag { source, context: None }
    }
}

impl HostError {
    /// Attaches context to variants that carry it.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        match &mut self {
            Self::InvalidTag { context: c, .. }
            | Self::AlreadyDefined { context: c, .. }
            | Self::NodeNotFound { context: c, .. }
            | Self::Unavailable { context: c, .. }
            | Self::Js { context: c, .. } => *c = Some(context.into()),
        }
        self
    }
}

pub(crate) fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
