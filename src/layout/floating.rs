use super::{Arrangement, Layout, LayoutInput};

/// The null layout: clients keep whatever geometry they were given.
pub struct FloatingLayout;

impl Layout for FloatingLayout {
    fn name(&self) -> &'static str {
        "floating"
    }

    fn symbol(&self) -> &'static str {
        "><>"
    }

    fn arrange(&self, _input: &LayoutInput) -> Arrangement {
        Arrangement::default()
    }

    fn arranges(&self) -> bool {
        false
    }
}
