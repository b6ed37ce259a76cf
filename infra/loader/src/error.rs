use hatch_host::HostError;
use std::borrow::Cow;

/// Errors that can occur while acquiring a capability.
///
/// Every caller joining a shared acquisition receives a clone of its outcome.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    /// The script source is empty.
    #[error("Invalid script source{}: {message}", format_context(.context))]
    InvalidSource { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The host reported an error event for the script node.
    #[error("Script load failed{}: \"{src}\"", format_context(.context))]
    ScriptLoadFailed { src: String, context: Option<Cow<'static, str>> },

    /// Neither load nor error arrived within the allowed time.
    #[error("Script load timeout{}: \"{src}\"", format_context(.context))]
    ScriptLoadTimeout { src: String, context: Option<Cow<'static, str>> },

    /// Acquisition succeeded but the capability check still fails.
    #[error("Feature not available after loading source{}: {feature}", format_context(.context))]
    FeatureUnavailable { feature: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A caller-supplied loader failed.
    #[error("Loader failed{}: {message}", format_context(.context))]
    Loader { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The host refused the script node.
    #[error("Host error{}: {source}", format_context(.context))]
    Host { source: HostError, context: Option<Cow<'static, str>> },
}

impl From<HostError> for LoadError {
    fn from(source: HostError) -> Self {
        Self::Host { source, context: None }
    }
}

impl LoadError {
    /// Shorthand for a [`LoadError::Loader`] without context.
    pub fn loader(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Loader { message: message.into(), context: None }
    }

    /// `true` for the timeout outcome of a script injection.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::ScriptLoadTimeout { .. })
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        match &mut self {
            Self::InvalidSource { context: c, .. }
            | Self::ScriptLoadFailed { context: c, .. }
            | Self::ScriptLoadTimeout { context: c, .. }
            | Self::FeatureUnavailable { context: c, .. }
            | Self::Loader { context: c, .. }
            | Self::Host { context: c, .. } => *c = Some(context.into()),
        }
        self
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
