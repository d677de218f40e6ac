use crate::camera::Walk;

/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    ArrowUp,
    ArrowDown,
    KeyW,
    KeyS,
    Escape,
}

impl Button {
    /// Walking direction bound to this button, if any
    pub fn walk(self) -> Option<Walk> {
        match self {
            Button::ArrowUp | Button::KeyW => Some(Walk::Forward),
            Button::ArrowDown | Button::KeyS => Some(Walk::Backward),
            Button::Escape => None,
        }
    }
}

/// What a raw window event means for the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// One key-down (or auto-repeat) step along the travel axis
    Walk(Walk),
    /// Pointer offset from the viewport center, y up
    Look { x: f32, y: f32 },
    ToggleFullscreen,
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_bindings() {
        assert_eq!(Button::ArrowUp.walk(), Some(Walk::Forward));
        assert_eq!(Button::KeyW.walk(), Some(Walk::Forward));
        assert_eq!(Button::ArrowDown.walk(), Some(Walk::Backward));
        assert_eq!(Button::KeyS.walk(), Some(Walk::Backward));
        assert_eq!(Button::Escape.walk(), None);
    }

    #[test]
    fn test_button_debug() {
        assert_eq!(format!("{:?}", Button::KeyW), "KeyW");
        assert_eq!(format!("{:?}", Button::ArrowUp), "ArrowUp");
    }
}
