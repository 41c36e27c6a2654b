//! Scene node data.
//!
//! A [`SceneNode`] is plain data stored in the [`Scene`](crate::Scene)
//! arena. Relationships are handles, never references:
//!
//! - `parent` and `children` are two views of one relationship and are only
//!   mutated together by [`hierarchy`](crate::hierarchy)
//! - `components` lists attached component handles in attachment order
//! - the [`Transform`] is owned inline and always present

use arbor_core::ids::InstanceId;

use crate::transform::Transform;
use crate::{ComponentHandle, NodeHandle};

#[derive(Debug)]
pub struct SceneNode {
    pub(crate) id: InstanceId,
    pub(crate) name: String,
    pub(crate) tag: String,
    pub(crate) active: bool,
    /// Root of the scene or descendant of one.
    pub(crate) attached: bool,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
    pub(crate) components: Vec<ComponentHandle>,

    pub(crate) transform: Transform,
}

impl SceneNode {
    pub(crate) fn new(id: InstanceId, name: String) -> Self {
        Self {
            id,
            name,
            tag: String::new(),
            active: true,
            attached: false,
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
            transform: Transform::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// User tag, empty when unset.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The node's own active flag, ignoring ancestors.
    #[inline]
    #[must_use]
    pub fn is_active_self(&self) -> bool {
        self.active
    }

    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn components(&self) -> &[ComponentHandle] {
        &self.components
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}
