use crate::scene::ObjectRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no object is selected")]
    NothingSelected,
    #[error("selection {0:?} no longer refers to a live object")]
    Stale(ObjectRef),
}

/// The single selected object, if any.
///
/// Holds a `(type, index)` reference; it is re-resolved against the scene on
/// every access because removals move objects between indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<ObjectRef>,
}

impl Selection {
    pub fn select(&mut self, object: ObjectRef) {
        self.current = Some(object);
    }

    pub fn deselect(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<ObjectRef> {
        self.current
    }

    pub fn has_selection(&self) -> bool {
        self.current.is_some()
    }

    /// The selected reference or [`SelectionError::NothingSelected`].
    pub fn require(&self) -> Result<ObjectRef, SelectionError> {
        self.current.ok_or(SelectionError::NothingSelected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ObjectKind;

    #[test]
    fn select_overwrites_previous() {
        let mut selection = Selection::default();
        selection.select(ObjectRef::new(ObjectKind::Cube, 2));
        selection.select(ObjectRef::new(ObjectKind::Spotlight, 0));
        assert_eq!(
            selection.current(),
            Some(ObjectRef::new(ObjectKind::Spotlight, 0))
        );
    }

    #[test]
    fn deselect_clears() {
        let mut selection = Selection::default();
        selection.select(ObjectRef::new(ObjectKind::Plane, 1));
        selection.deselect();
        assert!(!selection.has_selection());
        assert_eq!(selection.require(), Err(SelectionError::NothingSelected));
    }
}
