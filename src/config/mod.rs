mod lua;
mod lua_api;

use crate::errors::ConfigError;
use crate::keyboard::keysyms::{self, Keysym};
use crate::keyboard::{Arg, Button, Click, Key, KeyAction};
use crate::layout::{GapConfig, LayoutEntry, LayoutKind};
use crate::rules::Rule;
use crate::{ColorScheme, Config, Launcher, Schemes, Scratchpad};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use x11rb::protocol::xproto::KeyButMask;

pub use lua::parse_lua_config;

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum ModKey {
    /// Whatever `modkey` is set to.
    Mod,
    Mod1,
    Mod2,
    Mod3,
    Mod4,
    Mod5,
    Shift,
    Control,
}

impl ModKey {
    fn to_keybut_mask(self, modkey: KeyButMask) -> KeyButMask {
        match self {
            ModKey::Mod => modkey,
            ModKey::Mod1 => KeyButMask::MOD1,
            ModKey::Mod2 => KeyButMask::MOD2,
            ModKey::Mod3 => KeyButMask::MOD3,
            ModKey::Mod4 => KeyButMask::MOD4,
            ModKey::Mod5 => KeyButMask::MOD5,
            ModKey::Shift => KeyButMask::SHIFT,
            ModKey::Control => KeyButMask::CONTROL,
        }
    }
}

/// `$XDG_CONFIG_HOME/tagwm`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tagwm"))
}

/// Reads `path`, or `config.lua` then `config.ron` from [`config_dir`].
/// Without any file the compiled-in configuration is returned.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => config_dir().and_then(|dir| {
            ["config.lua", "config.ron"]
                .into_iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.exists())
        }),
    };

    let Some(path) = path else {
        tracing::info!("no configuration file found, using defaults");
        return Ok(Config::default());
    };

    let input = std::fs::read_to_string(&path)
        .map_err(|e| ConfigError::Unreadable(path.display().to_string(), e))?;
    tracing::info!("loading configuration from {}", path.display());

    let config = if path.extension().is_some_and(|ext| ext == "lua") {
        parse_lua_config(&input, path.parent())?
    } else {
        parse_config(&input)?
    };
    config.validate()?;
    Ok(config)
}

fn preprocess_variables(input: &str) -> Result<String, ConfigError> {
    let mut variables: HashMap<String, String> = HashMap::new();
    let mut result = String::new();

    for line in input.lines() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("#DEFINE") {
            let Some((var_name, value)) = rest.split_once('=') else {
                return Err(ConfigError::InvalidDefine(trimmed.to_string()));
            };
            let var_name = var_name.trim();
            let value = value.trim().trim_end_matches(',');

            if !var_name.starts_with('$') {
                return Err(ConfigError::InvalidVariableName(var_name.to_string()));
            }

            variables.insert(var_name.to_string(), value.to_string());
            result.push('\n');
        } else {
            // longest names first so `$mod` never clobbers `$mod_shift`
            let mut names: Vec<&String> = variables.keys().collect();
            names.sort_by_key(|name| std::cmp::Reverse(name.len()));
            let mut processed_line = line.to_string();
            for name in names {
                processed_line = processed_line.replace(name.as_str(), &variables[name]);
            }
            result.push_str(&processed_line);
            result.push('\n');
        }
    }

    for line in result.lines() {
        if let Some(var_start) = line.find('$') {
            let rest = &line[var_start..];
            let var_end = rest[1..]
                .find(|c: char| !c.is_alphanumeric() && c != '_')
                .unwrap_or(rest.len() - 1)
                + 1;
            let undefined_var = &rest[..var_end];
            return Err(ConfigError::UndefinedVariable(undefined_var.to_string()));
        }
    }
    Ok(result)
}

/// Parses a RON configuration. Every field is optional and falls back to
/// the compiled-in value.
pub fn parse_config(input: &str) -> Result<Config, ConfigError> {
    let preprocessed = preprocess_variables(input)?;
    let config_data: ConfigData = ron::from_str(&preprocessed)?;
    config_data_to_config(config_data)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigData {
    border_width: Option<u32>,
    snap: Option<i32>,
    font: Option<String>,
    schemes: Option<SchemesData>,

    gaps: Option<GapData>,
    gaps_enabled: Option<bool>,
    smart_gaps: Option<bool>,

    show_bar: Option<bool>,
    top_bar: Option<bool>,
    bar_height: Option<i32>,
    bar_padding: Option<(i32, i32)>,
    status_program: Option<String>,
    launchers: Option<Vec<CommandData>>,

    mfact: Option<f32>,
    nmaster: Option<i32>,
    resize_hints: Option<bool>,
    layouts: Option<Vec<LayoutData>>,
    layout_menu_command: Option<String>,

    tags: Option<Vec<String>>,
    scratchpads: Option<Vec<CommandData>>,

    terminal: Option<String>,
    terminal_class: Option<String>,
    swallow_floating: Option<bool>,

    modkey: Option<ModKey>,
    keybindings: Option<Vec<KeybindingData>>,
    buttons: Option<Vec<ButtonData>>,

    rules: Option<Vec<Rule>>,
    autostart: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GapData {
    inner_horizontal: i32,
    inner_vertical: i32,
    outer_horizontal: i32,
    outer_vertical: i32,
}

#[derive(Debug, Deserialize)]
struct CommandData {
    name: String,
    command: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LayoutData {
    kind: LayoutKind,
    #[serde(default)]
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeybindingData {
    #[serde(default)]
    modifiers: Vec<ModKey>,
    key: String,
    action: KeyAction,
    #[serde(default)]
    arg: ArgData,
}

#[derive(Debug, Deserialize)]
struct ButtonData {
    click: Click,
    #[serde(default)]
    modifiers: Vec<ModKey>,
    button: u8,
    action: KeyAction,
    #[serde(default)]
    arg: ArgData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum ArgData {
    #[default]
    None,
    Int(i32),
    Float(f32),
    String(String),
    Array(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct ColorSchemeData {
    foreground: u32,
    background: u32,
    #[serde(default)]
    border: u32,
}

impl From<ColorSchemeData> for ColorScheme {
    fn from(data: ColorSchemeData) -> Self {
        ColorScheme::new(data.foreground, data.background, data.border)
    }
}

#[derive(Debug, Deserialize)]
struct SchemesData {
    normal: ColorSchemeData,
    selected: ColorSchemeData,
    status: ColorSchemeData,
    tags_normal: ColorSchemeData,
    tags_selected: ColorSchemeData,
    info: ColorSchemeData,
    optimal: ColorSchemeData,
    critical: ColorSchemeData,
    urgent: u32,
}

fn parse_key(name: &str) -> Result<Keysym, ConfigError> {
    keysyms::keysym_from_str(name).ok_or_else(|| ConfigError::UnknownKey(name.to_string()))
}

fn config_data_to_config(data: ConfigData) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    let modkey = data
        .modkey
        .map_or(config.modkey, |key| key.to_keybut_mask(KeyButMask::MOD4));
    config.modkey = modkey;

    let masks = |modifiers: &[ModKey]| -> Vec<KeyButMask> {
        modifiers
            .iter()
            .map(|modifier| modifier.to_keybut_mask(modkey))
            .collect()
    };

    if let Some(keybindings) = data.keybindings {
        config.keybindings = keybindings
            .into_iter()
            .map(|kb| {
                Ok(Key::new(
                    masks(&kb.modifiers),
                    parse_key(&kb.key)?,
                    kb.action,
                    arg_data_to_arg(kb.arg),
                ))
            })
            .collect::<Result<_, ConfigError>>()?;
    }

    if let Some(buttons) = data.buttons {
        config.buttons = buttons
            .into_iter()
            .map(|button| {
                Button::new(
                    button.click,
                    masks(&button.modifiers),
                    button.button,
                    button.action,
                    arg_data_to_arg(button.arg),
                )
            })
            .collect();
    }

    if let Some(layouts) = data.layouts {
        config.layouts = layouts
            .into_iter()
            .map(|layout| match layout.symbol {
                Some(symbol) => LayoutEntry::with_symbol(layout.kind, &symbol),
                None => LayoutEntry::new(layout.kind),
            })
            .collect();
    }

    if let Some(gaps) = data.gaps {
        config.gaps = GapConfig {
            inner_horizontal: gaps.inner_horizontal,
            inner_vertical: gaps.inner_vertical,
            outer_horizontal: gaps.outer_horizontal,
            outer_vertical: gaps.outer_vertical,
        };
    }

    if let Some(schemes) = data.schemes {
        config.schemes = Schemes {
            normal: schemes.normal.into(),
            selected: schemes.selected.into(),
            status: schemes.status.into(),
            tags_normal: schemes.tags_normal.into(),
            tags_selected: schemes.tags_selected.into(),
            info: schemes.info.into(),
            optimal: schemes.optimal.into(),
            critical: schemes.critical.into(),
            urgent: schemes.urgent,
        };
    }

    if let Some(launchers) = data.launchers {
        config.launchers = launchers
            .into_iter()
            .map(|launcher| Launcher {
                name: launcher.name,
                command: launcher.command,
            })
            .collect();
    }

    if let Some(scratchpads) = data.scratchpads {
        config.scratchpads = scratchpads
            .into_iter()
            .map(|pad| Scratchpad {
                name: pad.name,
                command: pad.command,
            })
            .collect();
    }

    macro_rules! take {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(value) = data.$field {
                    config.$field = value;
                }
            )*
        };
    }
    take!(
        border_width,
        snap,
        font,
        gaps_enabled,
        smart_gaps,
        show_bar,
        top_bar,
        bar_height,
        bar_padding,
        status_program,
        mfact,
        nmaster,
        resize_hints,
        layout_menu_command,
        tags,
        terminal,
        terminal_class,
        swallow_floating,
        rules,
        autostart,
    );

    Ok(config)
}

fn arg_data_to_arg(data: ArgData) -> Arg {
    match data {
        ArgData::None => Arg::None,
        ArgData::Int(n) => Arg::Int(n),
        ArgData::Float(f) => Arg::Float(f),
        ArgData::String(s) => Arg::Str(s),
        ArgData::Array(arr) => Arg::Array(arr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_keeps_defaults() {
        let config = parse_config("()").unwrap();
        let defaults = Config::default();
        assert_eq!(config.border_width, defaults.border_width);
        assert_eq!(config.tags, defaults.tags);
        assert_eq!(config.keybindings.len(), defaults.keybindings.len());
    }

    #[test]
    fn test_define_substitution() {
        let input = r#"
#DEFINE $term = "alacritty",
#DEFINE $terminal_class = "Alacritty",
(
    terminal: Some($term),
    terminal_class: Some($terminal_class),
    mfact: Some(0.6),
)
"#;
        let config = parse_config(input).unwrap();
        assert_eq!(config.terminal, "alacritty");
        assert_eq!(config.terminal_class, "Alacritty");
        assert_eq!(config.mfact, 0.6);
    }

    #[test]
    fn test_undefined_variable_is_reported() {
        let err = parse_config("(terminal: Some($term))").unwrap_err();
        assert!(matches!(err, ConfigError::UndefinedVariable(name) if name == "$term"));
    }

    #[test]
    fn test_keybindings_resolve_mod() {
        let input = r#"(
    modkey: Some(Mod1),
    keybindings: Some([
        (modifiers: [Mod, Shift], key: "Return", action: Spawn, arg: ["st"]),
        (modifiers: [Mod], key: "h", action: SetMfact, arg: -0.05),
    ]),
)"#;
        let config = parse_config(input).unwrap();
        assert_eq!(config.keybindings.len(), 2);
        let spawn = &config.keybindings[0];
        assert_eq!(spawn.modifiers, vec![KeyButMask::MOD1, KeyButMask::SHIFT]);
        assert_eq!(spawn.keysym, keysyms::XK_RETURN);
        assert_eq!(spawn.arg, Arg::Array(vec!["st".into()]));
        assert_eq!(config.keybindings[1].arg, Arg::Float(-0.05));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let input = r#"(keybindings: Some([(key: "Hyper", action: Quit)]))"#;
        assert!(matches!(
            parse_config(input),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_rules_and_layouts() {
        let input = r#"(
    rules: Some([(class: Some("Gimp"), tags: 4, is_floating: true)]),
    layouts: Some([(kind: Monocle, symbol: Some("[=]")), (kind: Tile)]),
)"#;
        let config = parse_config(input).unwrap();
        assert_eq!(config.rules.len(), 1);
        assert!(config.rules[0].is_floating);
        assert_eq!(config.layouts[0].symbol, "[=]");
        assert_eq!(config.layouts[1].symbol, "[]=");
    }
}
