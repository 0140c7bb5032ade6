use crate::errors::ConfigError;
use mlua::Lua;

use super::lua_api;

/// Runs a Lua configuration against the `tagwm` API. Settings the script
/// never touches keep their compiled-in values.
pub fn parse_lua_config(
    input: &str,
    config_dir: Option<&std::path::Path>,
) -> Result<crate::Config, ConfigError> {
    let lua = Lua::new();

    if let Some(dir_str) = config_dir.and_then(|dir| dir.to_str()) {
        let setup_code = format!("package.path = '{}/?.lua;' .. package.path", dir_str);
        lua.load(&setup_code)
            .exec()
            .map_err(|e| ConfigError::LuaError(format!("Failed to set package.path: {}", e)))?;
    }

    let builder = lua_api::register_api(&lua)?;

    lua.load(input)
        .exec()
        .map_err(|e| ConfigError::LuaError(format!("{}", e)))?;

    let config = builder.borrow().clone();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{Arg, KeyAction, keysyms};
    use crate::layout::LayoutKind;
    use x11rb::protocol::xproto::KeyButMask;

    #[test]
    fn test_template_parses() {
        let config = parse_lua_config(include_str!("../../templates/config.lua"), None).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.terminal, "st");
        assert!(!config.keybindings.is_empty());
    }

    #[test]
    fn test_settings_and_bindings() {
        let script = r#"
tagwm.set_terminal("alacritty", "Alacritty")
tagwm.set_modkey("Mod1")
tagwm.border.set_width(1)
tagwm.gaps.set_inner(4, 6)
tagwm.key.clear()
tagwm.key.bind({ "Mod1", "Shift" }, "q", tagwm.quit())
tagwm.key.bind({ "Mod1" }, "h", tagwm.layout.set_mfact(-0.05))
tagwm.rule({ class = "Gimp", tags = 2, floating = true })
"#;
        let config = parse_lua_config(script, None).unwrap();
        assert_eq!(config.terminal, "alacritty");
        assert_eq!(config.terminal_class, "Alacritty");
        assert_eq!(config.modkey, KeyButMask::MOD1);
        assert_eq!(config.border_width, 1);
        assert_eq!(config.gaps.inner_horizontal, 4);
        assert_eq!(config.gaps.inner_vertical, 6);
        assert_eq!(config.keybindings.len(), 2);
        assert_eq!(config.keybindings[0].action, KeyAction::Quit);
        assert_eq!(config.keybindings[0].keysym, keysyms::XK_Q);
        assert_eq!(config.keybindings[1].arg, Arg::Float(-0.05));
        let rule = config.rules.last().unwrap();
        assert_eq!(rule.class.as_deref(), Some("Gimp"));
        assert_eq!(rule.tags, 1 << 1);
        assert!(rule.is_floating);
    }

    #[test]
    fn test_layout_catalog() {
        let script = r#"
tagwm.layout.set_layouts({ "monocle", "tile" })
tagwm.layout.set_symbol("monocle", "[=]")
"#;
        let config = parse_lua_config(script, None).unwrap();
        assert_eq!(config.layouts.len(), 2);
        assert_eq!(config.layouts[0].kind, LayoutKind::Monocle);
        assert_eq!(config.layouts[0].symbol, "[=]");
    }

    #[test]
    fn test_function_reference_is_rejected() {
        let script = r#"tagwm.key.bind({ "Mod4" }, "q", tagwm.quit)"#;
        assert!(parse_lua_config(script, None).is_err());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let script = r#"tagwm.key.bind({ "Mod4" }, "Hyper", tagwm.quit())"#;
        assert!(parse_lua_config(script, None).is_err());
    }
}
