pub mod bar;
pub mod client;
pub mod config;
pub mod display;
pub mod errors;
pub mod geometry;
pub mod keyboard;
pub mod layout;
pub mod monitor;
pub mod process;
pub mod rules;
pub mod tags;
pub mod window_manager;

#[cfg(test)]
pub(crate) mod testing;

use x11rb::protocol::xproto::KeyButMask;

use crate::display::{BUTTON_LEFT, BUTTON_MIDDLE, BUTTON_RIGHT, BUTTON_SCROLL_DOWN, BUTTON_SCROLL_UP};
use crate::errors::ConfigError;
use crate::keyboard::keysyms::{self, Keysym};
use crate::keyboard::{Arg, Button, Click, Key, KeyAction};
use crate::layout::{GapConfig, LayoutEntry, LayoutKind};
use crate::rules::Rule;
use crate::tags::TagSpace;

pub mod prelude {
    pub use crate::keyboard::{Arg, Button, Click, Key, KeyAction, keysyms};
    pub use crate::layout::{GapConfig, LayoutEntry, LayoutKind};
    pub use crate::rules::Rule;
    pub use crate::{ColorScheme, Config, Launcher, Schemes, Scratchpad};
    pub use x11rb::protocol::xproto::KeyButMask;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub foreground: u32,
    pub background: u32,
    pub border: u32,
}

impl ColorScheme {
    pub const fn new(foreground: u32, background: u32, border: u32) -> Self {
        Self {
            foreground,
            background,
            border,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schemes {
    /// Unfocused client borders and the bar background.
    pub normal: ColorScheme,
    /// Focused client border.
    pub selected: ColorScheme,
    pub status: ColorScheme,
    pub tags_normal: ColorScheme,
    pub tags_selected: ColorScheme,
    pub info: ColorScheme,
    pub optimal: ColorScheme,
    pub critical: ColorScheme,
    /// Border of clients demanding attention.
    pub urgent: u32,
}

/// Bar button that runs a command when clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    pub name: String,
    pub command: Vec<String>,
}

/// Toggleable floating utility window. `name` is the instance its window
/// announces, `command` starts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scratchpad {
    pub name: String,
    pub command: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Appearance
    pub border_width: u32,
    pub snap: i32,
    pub font: String,
    pub schemes: Schemes,

    // Gaps
    pub gaps: GapConfig,
    pub gaps_enabled: bool,
    pub smart_gaps: bool,

    // Bar
    pub show_bar: bool,
    pub top_bar: bool,
    pub bar_height: i32,
    /// Horizontal and vertical space between the bar and the screen edge.
    pub bar_padding: (i32, i32),
    pub status_program: String,
    pub launchers: Vec<Launcher>,

    // Layout
    pub mfact: f32,
    pub nmaster: i32,
    pub resize_hints: bool,
    pub layouts: Vec<LayoutEntry>,
    pub layout_menu_command: String,

    // Tags
    pub tags: Vec<String>,
    pub scratchpads: Vec<Scratchpad>,

    // Swallowing
    pub terminal: String,
    pub terminal_class: String,
    pub swallow_floating: bool,

    // Bindings
    pub modkey: KeyButMask,
    pub keybindings: Vec<Key>,
    pub buttons: Vec<Button>,

    pub rules: Vec<Rule>,
    pub autostart: Vec<String>,
}

const MOD2KEY: KeyButMask = KeyButMask::MOD1;
const SHIFT: KeyButMask = KeyButMask::SHIFT;
const CONTROL: KeyButMask = KeyButMask::CONTROL;

const BLACK: u32 = 0x1e1e2e;
const GRAY: u32 = 0x45475a;
const WHITE: u32 = 0xcdd6f4;
const BLUE: u32 = 0x89b4fa;
const BLUE2: u32 = 0x74c7ec;
const GREEN: u32 = 0xa6e3a1;
const RED: u32 = 0xf38ba8;

impl Config {
    pub fn tag_space(&self) -> TagSpace {
        TagSpace::new(self.tags.len(), self.scratchpads.len())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let total = self.tags.len() + self.scratchpads.len();
        if self.tags.is_empty() || total > 31 {
            return Err(ConfigError::InvalidTagCount(total));
        }
        if self.layouts.is_empty() {
            return Err(ConfigError::UnknownLayout("no layouts configured".to_string()));
        }
        Ok(())
    }

    /// Compiled-in rules followed by the user's.
    pub fn all_rules(&self) -> Vec<Rule> {
        let names: Vec<String> = self.scratchpads.iter().map(|pad| pad.name.clone()).collect();
        let mut rules =
            rules::default_rules(&self.terminal_class, &names, self.tag_space().scratch_mask());
        rules.extend(self.rules.iter().cloned());
        rules
    }

    /// Stack and tag bindings every configuration carries, followed by the
    /// user's.
    pub fn all_keys(&self) -> Vec<Key> {
        let mut keys = self.base_keybindings();
        keys.extend(self.keybindings.iter().cloned());
        keys
    }

    fn base_keybindings(&self) -> Vec<Key> {
        let modkey = self.modkey;
        let mut keys = vec![
            Key::new(vec![modkey], keysyms::XK_J, KeyAction::FocusStack, Arg::Int(1)),
            Key::new(vec![modkey], keysyms::XK_K, KeyAction::FocusStack, Arg::Int(-1)),
            Key::new(vec![modkey, SHIFT], keysyms::XK_J, KeyAction::PushStack, Arg::Int(1)),
            Key::new(vec![modkey, SHIFT], keysyms::XK_K, KeyAction::PushStack, Arg::Int(-1)),
            Key::new(vec![modkey, SHIFT], keysyms::XK_V, KeyAction::PushStack, Arg::Int(0)),
        ];

        for (index, keysym) in TAG_KEYS.iter().take(self.tags.len()).enumerate() {
            let arg = Arg::Int(index as i32);
            keys.extend([
                Key::new(vec![modkey], *keysym, KeyAction::View, arg.clone()),
                Key::new(vec![modkey, CONTROL], *keysym, KeyAction::ToggleView, arg.clone()),
                Key::new(vec![modkey, SHIFT], *keysym, KeyAction::Tag, arg.clone()),
                Key::new(
                    vec![modkey, CONTROL, SHIFT],
                    *keysym,
                    KeyAction::ToggleTag,
                    arg.clone(),
                ),
                Key::new(vec![modkey, MOD2KEY], *keysym, KeyAction::SwapTags, arg),
            ]);
        }
        keys
    }
}

const TAG_KEYS: [Keysym; 9] = [
    keysyms::XK_1,
    keysyms::XK_2,
    keysyms::XK_3,
    keysyms::XK_4,
    keysyms::XK_5,
    keysyms::XK_6,
    keysyms::XK_7,
    keysyms::XK_8,
    keysyms::XK_9,
];

impl Default for Config {
    fn default() -> Self {
        const MODKEY: KeyButMask = KeyButMask::MOD4;
        const TERMINAL: &str = "st";

        let argv = |parts: &[&str]| parts.iter().map(|part| part.to_string()).collect::<Vec<_>>();

        let mut keybindings = vec![
            Key::new(vec![MODKEY], keysyms::XK_0, KeyAction::View, Arg::Int(-1)),
            Key::new(vec![MODKEY], keysyms::XK_Q, KeyAction::KillClient, Arg::None),
            Key::new(vec![MODKEY], keysyms::XK_S, KeyAction::ToggleSticky, Arg::None),
            Key::new(
                vec![MODKEY, SHIFT],
                keysyms::XK_D,
                KeyAction::Spawn,
                Arg::Array(argv(&["dmenu_run", "-m", "{monitor}"])),
            ),
            Key::new(vec![MODKEY], keysyms::XK_F, KeyAction::ToggleFullScreen, Arg::None),
            Key::new(vec![MODKEY], keysyms::XK_H, KeyAction::SetMfact, Arg::Float(-0.05)),
            Key::new(vec![MODKEY], keysyms::XK_L, KeyAction::SetMfact, Arg::Float(0.05)),
            Key::new(vec![MOD2KEY], keysyms::XK_H, KeyAction::TagMonitor, Arg::Int(-1)),
            Key::new(vec![MOD2KEY], keysyms::XK_L, KeyAction::TagMonitor, Arg::Int(1)),
            Key::new(vec![MOD2KEY], keysyms::XK_J, KeyAction::FocusMonitor, Arg::Int(-1)),
            Key::new(vec![MOD2KEY], keysyms::XK_K, KeyAction::FocusMonitor, Arg::Int(1)),
            Key::new(vec![MODKEY], keysyms::XK_G, KeyAction::ToggleGaps, Arg::None),
            Key::new(vec![MODKEY, SHIFT], keysyms::XK_G, KeyAction::DefaultGaps, Arg::None),
            Key::new(vec![MODKEY], keysyms::XK_X, KeyAction::IncGaps, Arg::Int(3)),
            Key::new(vec![MODKEY, SHIFT], keysyms::XK_X, KeyAction::IncGaps, Arg::Int(-3)),
            Key::new(
                vec![MODKEY],
                keysyms::XK_RETURN,
                KeyAction::Spawn,
                Arg::Array(argv(&[TERMINAL])),
            ),
            Key::new(
                vec![MODKEY, SHIFT],
                keysyms::XK_RETURN,
                KeyAction::ToggleScratch,
                Arg::Int(0),
            ),
            Key::new(vec![MODKEY], keysyms::XK_B, KeyAction::ToggleBar, Arg::None),
            Key::new(vec![MODKEY], keysyms::XK_M, KeyAction::IncNMaster, Arg::Int(1)),
            Key::new(vec![MODKEY, SHIFT], keysyms::XK_M, KeyAction::IncNMaster, Arg::Int(-1)),
            Key::new(vec![MODKEY], keysyms::XK_SPACE, KeyAction::Zoom, Arg::None),
            Key::new(
                vec![MODKEY, SHIFT],
                keysyms::XK_SPACE,
                KeyAction::ToggleFloating,
                Arg::None,
            ),
            Key::new(vec![MODKEY], keysyms::XK_LEFT, KeyAction::CycleLayout, Arg::Int(-1)),
            Key::new(vec![MODKEY], keysyms::XK_RIGHT, KeyAction::CycleLayout, Arg::Int(1)),
            Key::new(vec![MODKEY, SHIFT], keysyms::XK_Q, KeyAction::Quit, Arg::None),
            Key::new(vec![MODKEY, SHIFT], keysyms::XK_R, KeyAction::Restart, Arg::None),
        ];
        for (index, keysym) in TAG_KEYS.iter().enumerate() {
            keybindings.push(Key::new(
                vec![MOD2KEY],
                *keysym,
                KeyAction::SetLayout,
                Arg::Int(index as i32),
            ));
        }

        let mut buttons = vec![
            Button::new(Click::WinTitle, vec![], BUTTON_MIDDLE, KeyAction::Zoom, Arg::None),
            Button::new(Click::ClientWin, vec![MODKEY], BUTTON_LEFT, KeyAction::MoveMouse, Arg::None),
            Button::new(
                Click::ClientWin,
                vec![MODKEY],
                BUTTON_RIGHT,
                KeyAction::ResizeMouse,
                Arg::None,
            ),
            Button::new(Click::ClientWin, vec![MOD2KEY], BUTTON_LEFT, KeyAction::Hide, Arg::Int(-1)),
            Button::new(Click::LtSymbol, vec![], BUTTON_RIGHT, KeyAction::LayoutMenu, Arg::None),
            Button::new(
                Click::RootWin,
                vec![MODKEY],
                BUTTON_SCROLL_UP,
                KeyAction::ShiftView,
                Arg::Int(1),
            ),
            Button::new(
                Click::RootWin,
                vec![MODKEY],
                BUTTON_SCROLL_DOWN,
                KeyAction::ShiftView,
                Arg::Int(-1),
            ),
            Button::new(Click::TagBar, vec![], BUTTON_LEFT, KeyAction::View, Arg::None),
            Button::new(Click::TagBar, vec![], BUTTON_RIGHT, KeyAction::ToggleView, Arg::None),
            Button::new(Click::TagBar, vec![MODKEY], BUTTON_LEFT, KeyAction::Tag, Arg::None),
            Button::new(Click::TagBar, vec![MODKEY], BUTTON_RIGHT, KeyAction::ToggleTag, Arg::None),
            Button::new(Click::TagBar, vec![], BUTTON_SCROLL_UP, KeyAction::ShiftView, Arg::Int(-1)),
            Button::new(
                Click::TagBar,
                vec![],
                BUTTON_SCROLL_DOWN,
                KeyAction::ShiftView,
                Arg::Int(1),
            ),
        ];
        for button in BUTTON_LEFT..=BUTTON_SCROLL_DOWN {
            buttons.push(Button::new(
                Click::StatusText,
                vec![],
                button,
                KeyAction::SigStatus,
                Arg::Int(i32::from(button)),
            ));
        }

        Self {
            border_width: 3,
            snap: 25,
            font: "-misc-fixed-bold-r-normal--18-*-*-*-*-*-iso8859-1".to_string(),
            schemes: Schemes {
                normal: ColorScheme::new(BLACK, BLACK, GRAY),
                selected: ColorScheme::new(BLUE2, GREEN, BLUE),
                status: ColorScheme::new(WHITE, BLACK, 0),
                tags_normal: ColorScheme::new(BLUE, BLACK, 0),
                tags_selected: ColorScheme::new(BLACK, BLUE, 0),
                info: ColorScheme::new(BLUE, BLACK, 0),
                optimal: ColorScheme::new(GREEN, BLACK, 0),
                critical: ColorScheme::new(RED, BLACK, 0),
                urgent: RED,
            },
            gaps: GapConfig {
                inner_horizontal: 20,
                inner_vertical: 10,
                outer_horizontal: 15,
                outer_vertical: 8,
            },
            gaps_enabled: true,
            smart_gaps: false,
            show_bar: true,
            top_bar: true,
            bar_height: 40,
            bar_padding: (12, 12),
            status_program: "dwmblocks".to_string(),
            launchers: vec![Launcher {
                name: "Keys".to_string(),
                command: argv(&[
                    TERMINAL,
                    "-n",
                    "key_pdf",
                    "-g",
                    "120x34",
                    "-e",
                    "zathura",
                    "/usr/share/tagwm/keys.pdf",
                ]),
            }],
            mfact: 0.55,
            nmaster: 1,
            resize_hints: true,
            layouts: vec![
                LayoutEntry::new(LayoutKind::Tile),
                LayoutEntry::new(LayoutKind::BottomStack),
                LayoutEntry::new(LayoutKind::Monocle),
                LayoutEntry::new(LayoutKind::Deck),
                LayoutEntry::new(LayoutKind::Spiral),
                LayoutEntry::new(LayoutKind::Dwindle),
                LayoutEntry::new(LayoutKind::CenteredMaster),
                LayoutEntry::new(LayoutKind::CenteredFloatingMaster),
                LayoutEntry::new(LayoutKind::Floating),
            ],
            layout_menu_command: "tagwm-layoutmenu".to_string(),
            tags: (1..=9).map(|tag| tag.to_string()).collect(),
            scratchpads: vec![Scratchpad {
                name: "spterm".to_string(),
                command: argv(&[TERMINAL, "-n", "spterm", "-g", "120x34"]),
            }],
            terminal: TERMINAL.to_string(),
            terminal_class: "St".to_string(),
            swallow_floating: false,
            modkey: MODKEY,
            keybindings,
            buttons,
            rules: vec![Rule {
                is_floating: true,
                is_terminal: true,
                is_centered: true,
                ..Rule::instance("key_pdf")
            }],
            autostart: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tag_space().scratch_mask(), 1 << 9);
    }

    #[test]
    fn test_base_keys_come_first() {
        let config = Config::default();
        let keys = config.all_keys();
        assert_eq!(keys[0].action, KeyAction::FocusStack);
        let tag_keys = keys
            .iter()
            .filter(|key| key.action == KeyAction::SwapTags)
            .count();
        assert_eq!(tag_keys, 9);
    }

    #[test]
    fn test_default_rules_precede_user_rules() {
        let config = Config::default();
        let rules = config.all_rules();
        assert_eq!(rules[0].class.as_deref(), Some("St"));
        assert_eq!(rules.last().and_then(|rule| rule.instance.as_deref()), Some("key_pdf"));
    }

    #[test]
    fn test_too_many_tags_rejected() {
        let config = Config {
            tags: (0..31).map(|tag| tag.to_string()).collect(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTagCount(32))
        ));
    }
}
