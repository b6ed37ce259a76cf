//! Script nodes in the host document.

use crate::error::HostError;
use hatch_domain::constants::{SCRIPT_CHARSET, SCRIPT_TYPE};
use std::fmt;
use std::rc::Rc;

/// Identifies one script node attached by a [`ScriptHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Attributes of an external script reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRequest {
    pub src: String,
    pub is_async: bool,
    pub script_type: &'static str,
    pub charset: &'static str,
}

impl ScriptRequest {
    /// A non-blocking `text/javascript` reference to `src`.
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into(), is_async: true, script_type: SCRIPT_TYPE, charset: SCRIPT_CHARSET }
    }
}

/// Event a script node reports once its fetch is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEvent {
    Load,
    Error,
}

/// Receives the load/error notifications of one script node.
pub trait ScriptListener {
    fn on_event(&self, event: ScriptEvent);
}

/// Document tree able to carry external script references.
///
/// Implementations must deliver events only while the listener is attached:
/// after [`ScriptHost::detach_listener`] the listener is never called again.
pub trait ScriptHost {
    /// Creates a script node for `request`, installs `listener` and appends the node to the
    /// document head.
    ///
    /// # Errors
    /// Returns [`HostError::Unavailable`] if the document cannot take the node.
    fn append_script(
        &self,
        request: &ScriptRequest,
        listener: Rc<dyn ScriptListener>,
    ) -> Result<NodeId, HostError>;

    /// Drops the listener of `node`. Unknown nodes are ignored.
    fn detach_listener(&self, node: NodeId);

    /// Removes `node` from the document.
    ///
    /// # Errors
    /// Returns [`HostError::NodeNotFound`] if the node is not attached.
    fn remove_script(&self, node: NodeId) -> Result<(), HostError>;
}

impl<T: ScriptHost + ?Sized> ScriptHost for Rc<T> {
    fn append_script(
        &self,
        request: &ScriptRequest,
        listener: Rc<dyn ScriptListener>,
    ) -> Result<NodeId, HostError> {
        (**self).append_script(request, listener)
    }

    fn detach_listener(&self, node: NodeId) {
        (**self).detach_listener(node);
    }

    fn remove_script(&self, node: NodeId) -> Result<(), HostError> {
        (**self).remove_script(node)
    }
}
