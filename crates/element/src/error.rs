use hatch_host::HostError;
use hatch_kernel::TagGuardError;
use hatch_loader::LoadError;
use std::borrow::Cow;

/// Errors raised while defining element types or mounting instances.
#[derive(Debug, thiserror::Error)]
pub enum ElementError {
    /// The tag is not a valid custom element name.
    #[error("Invalid tag{}: {source}", format_context(.context))]
    InvalidTag { source: TagGuardError, context: Option<Cow<'static, str>> },

    /// The capability gating the definition could not be acquired.
    #[error("Feature unavailable for <{tag}>{}: {source}", format_context(.context))]
    FeatureUnavailable { tag: String, source: LoadError, context: Option<Cow<'static, str>> },

    /// The host registry refused the element class.
    #[error("Registration of <{tag}> failed{}: {source}", format_context(.context))]
    Registration { tag: String, source: HostError, context: Option<Cow<'static, str>> },

    /// The widget module could not be loaded.
    #[error("Dependency load failed{}: {message}", format_context(.context))]
    DependencyLoadFailed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The render capability failed to mount.
    #[error("Render failed{}: {message}", format_context(.context))]
    Render { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<TagGuardError> for ElementError {
    fn from(source: TagGuardError) -> Self {
        Self::InvalidTag { source, context: None }
    }
}

impl From<LoadError> for ElementError {
    fn from(error: LoadError) -> Self {
        Self::DependencyLoadFailed { message: error.to_string().into(), context: None }
    }
}

impl ElementError {
    /// Shorthand for a [`ElementError::Render`] without context.
    pub fn render(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Render { message: message.into(), context: None }
    }

    /// Shorthand for a [`ElementError::DependencyLoadFailed`] without context.
    pub fn dependency(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DependencyLoadFailed { message: message.into(), context: None }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        match &mut self {
            Self::InvalidTag { context: c, .. }
            | Self::FeatureUnavailable { context: c, .. }
            | Self::Registration { context: c, .. }
            | Self::DependencyLoadFailed { context: c, .. }
            | Self::Render { context: c, .. } => *c = Some(context.into()),
        }
        self
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
