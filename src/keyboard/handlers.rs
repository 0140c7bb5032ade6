use serde::Deserialize;
use x11rb::protocol::xproto::KeyButMask;

use super::keysyms::Keysym;
use crate::tags::TagMask;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum KeyAction {
    Spawn,
    KillClient,
    FocusStack,
    PushStack,
    Zoom,
    View,
    ToggleView,
    Tag,
    ToggleTag,
    SwapTags,
    ShiftView,
    ShiftTag,
    SetLayout,
    CycleLayout,
    LayoutMenu,
    SetMfact,
    IncNMaster,
    ToggleFloating,
    ToggleFullScreen,
    ToggleSticky,
    ToggleScratch,
    ToggleBar,
    FocusMonitor,
    TagMonitor,
    IncGaps,
    ToggleGaps,
    DefaultGaps,
    Hide,
    MoveMouse,
    ResizeMouse,
    SigStatus,
    Quit,
    Restart,
    None,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Arg {
    #[default]
    None,
    Int(i32),
    Float(f32),
    Str(String),
    Array(Vec<String>),
    /// Raw tag bits, as produced by bar clicks.
    Mask(TagMask),
}

impl Arg {
    pub fn as_int(&self) -> i32 {
        match self {
            Arg::Int(value) => *value,
            Arg::Float(value) => *value as i32,
            Arg::Mask(mask) => *mask as i32,
            _ => 0,
        }
    }

    pub fn as_float(&self) -> f32 {
        match self {
            Arg::Float(value) => *value,
            Arg::Int(value) => *value as f32,
            _ => 0.0,
        }
    }

    /// Tag bits named by the argument: `Int(i)` selects tag `i`, a negative
    /// index selects every tag.
    pub fn as_tag_mask(&self) -> TagMask {
        match self {
            Arg::Mask(mask) => *mask,
            Arg::Int(index) if *index < 0 => !0,
            Arg::Int(index) if *index < TagMask::BITS as i32 => 1 << index,
            _ => 0,
        }
    }

    /// Command line for `Spawn`.
    pub fn as_command(&self) -> Option<Vec<String>> {
        match self {
            Arg::Str(command) => Some(vec!["sh".into(), "-c".into(), command.clone()]),
            Arg::Array(argv) if !argv.is_empty() => Some(argv.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Key {
    pub modifiers: Vec<KeyButMask>,
    pub keysym: Keysym,
    pub action: KeyAction,
    pub arg: Arg,
}

impl Key {
    pub fn new(modifiers: Vec<KeyButMask>, keysym: Keysym, action: KeyAction, arg: Arg) -> Self {
        Self {
            modifiers,
            keysym,
            action,
            arg,
        }
    }

    pub fn mask(&self) -> u16 {
        modifiers_to_mask(&self.modifiers)
    }
}

/// Bar or window region a mouse binding applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Click {
    TagBar,
    LtSymbol,
    StatusText,
    WinTitle,
    ClientWin,
    RootWin,
}

#[derive(Debug, Clone)]
pub struct Button {
    pub click: Click,
    pub modifiers: Vec<KeyButMask>,
    pub button: u8,
    pub action: KeyAction,
    pub arg: Arg,
}

impl Button {
    pub fn new(
        click: Click,
        modifiers: Vec<KeyButMask>,
        button: u8,
        action: KeyAction,
        arg: Arg,
    ) -> Self {
        Self {
            click,
            modifiers,
            button,
            action,
            arg,
        }
    }

    pub fn mask(&self) -> u16 {
        modifiers_to_mask(&self.modifiers)
    }
}

pub fn modifiers_to_mask(modifiers: &[KeyButMask]) -> u16 {
    modifiers
        .iter()
        .fold(0u16, |acc, &modifier| acc | u16::from(modifier))
}

/// Every binding matching the pressed key; `state` must already be cleaned
/// of lock modifiers.
pub fn handle_key_press<'a>(
    keysym: Keysym,
    state: u16,
    keybindings: &'a [Key],
) -> impl Iterator<Item = (KeyAction, &'a Arg)> {
    keybindings
        .iter()
        .filter(move |key| key.keysym == keysym && key.mask() == state)
        .map(|key| (key.action, &key.arg))
}

/// Bindings for a click on `click` with `button` and cleaned `state`.
pub fn handle_button_press<'a>(
    click: Click,
    button: u8,
    state: u16,
    buttons: &'a [Button],
) -> impl Iterator<Item = &'a Button> {
    buttons.iter().filter(move |binding| {
        binding.click == click && binding.button == button && binding.mask() == state
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::keysyms;

    #[test]
    fn test_key_press_matches_exact_modifiers() {
        let keys = vec![
            Key::new(vec![KeyButMask::MOD4], keysyms::XK_J, KeyAction::FocusStack, Arg::Int(1)),
            Key::new(
                vec![KeyButMask::MOD4, KeyButMask::SHIFT],
                keysyms::XK_J,
                KeyAction::PushStack,
                Arg::Int(1),
            ),
        ];
        let mod4 = u16::from(KeyButMask::MOD4);
        let matched: Vec<KeyAction> = handle_key_press(keysyms::XK_J, mod4, &keys)
            .map(|(action, _)| action)
            .collect();
        assert_eq!(matched, vec![KeyAction::FocusStack]);
    }

    #[test]
    fn test_tag_mask_argument() {
        assert_eq!(Arg::Int(3).as_tag_mask(), 1 << 3);
        assert_eq!(Arg::Int(-1).as_tag_mask(), !0);
        assert_eq!(Arg::Mask(0b101).as_tag_mask(), 0b101);
        assert_eq!(Arg::None.as_tag_mask(), 0);
    }

    #[test]
    fn test_string_command_runs_through_shell() {
        assert_eq!(
            Arg::Str("st -e htop".into()).as_command(),
            Some(vec!["sh".into(), "-c".into(), "st -e htop".into()])
        );
        assert_eq!(Arg::Array(vec![]).as_command(), None);
    }

    #[test]
    fn test_button_press_filters_by_click() {
        let buttons = vec![
            Button::new(Click::TagBar, vec![], 1, KeyAction::View, Arg::None),
            Button::new(Click::RootWin, vec![], 1, KeyAction::Spawn, Arg::None),
        ];
        let matched: Vec<KeyAction> = handle_button_press(Click::TagBar, 1, 0, &buttons)
            .map(|binding| binding.action)
            .collect();
        assert_eq!(matched, vec![KeyAction::View]);
    }
}
