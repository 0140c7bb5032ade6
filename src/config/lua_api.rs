use mlua::{Lua, Table, Value};
use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::ConfigError;
use crate::keyboard::keysyms::{self, Keysym};
use crate::keyboard::{Arg, Button, Click, Key, KeyAction};
use crate::layout::{LayoutEntry, LayoutKind};
use crate::rules::Rule;
use crate::{ColorScheme, Config, Launcher, Scratchpad};
use x11rb::protocol::xproto::KeyButMask;

type SharedBuilder = Rc<RefCell<Config>>;

/// Installs the `tagwm` global. Setters write into the returned builder,
/// which starts out as the compiled-in configuration.
pub fn register_api(lua: &Lua) -> Result<SharedBuilder, ConfigError> {
    let builder = Rc::new(RefCell::new(Config::default()));

    let tagwm_table = lua
        .create_table()
        .map_err(|e| ConfigError::LuaError(format!("Failed to create tagwm table: {}", e)))?;

    register_spawn(lua, &tagwm_table)?;
    register_key_module(lua, &tagwm_table, builder.clone())?;
    register_mouse_module(lua, &tagwm_table, builder.clone())?;
    register_gaps_module(lua, &tagwm_table, builder.clone())?;
    register_border_module(lua, &tagwm_table, builder.clone())?;
    register_client_module(lua, &tagwm_table)?;
    register_layout_module(lua, &tagwm_table, builder.clone())?;
    register_tag_module(lua, &tagwm_table)?;
    register_monitor_module(lua, &tagwm_table)?;
    register_bar_module(lua, &tagwm_table, builder.clone())?;
    register_scratchpad_module(lua, &tagwm_table, builder.clone())?;
    register_misc(lua, &tagwm_table, builder.clone())?;

    lua.globals()
        .set("tagwm", tagwm_table)
        .map_err(|e| ConfigError::LuaError(format!("Failed to set tagwm global: {}", e)))?;

    Ok(builder)
}

/// Registers functions that only build an action table: `(lua name,
/// action, takes an argument)`.
fn register_actions(
    lua: &Lua,
    table: &Table,
    actions: &[(&str, &'static str, bool)],
) -> Result<(), ConfigError> {
    for &(name, action, takes_arg) in actions {
        let function = if takes_arg {
            lua.create_function(move |lua, arg: Value| create_action_table(lua, action, arg))?
        } else {
            lua.create_function(move |lua, ()| create_action_table(lua, action, Value::Nil))?
        };
        table
            .set(name, function)
            .map_err(|e| ConfigError::LuaError(format!("Failed to set {}: {}", name, e)))?;
    }
    Ok(())
}

fn register_spawn(lua: &Lua, parent: &Table) -> Result<(), ConfigError> {
    register_actions(lua, parent, &[("spawn", "Spawn", true)])
}

fn register_key_module(lua: &Lua, parent: &Table, builder: SharedBuilder) -> Result<(), ConfigError> {
    let key_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let bind = lua.create_function(move |lua, (mods, key, action): (Value, String, Value)| {
        let modkey = builder_clone.borrow().modkey;
        let modifiers = parse_modifiers_value(mods, modkey)?;
        let keysym = parse_keysym(&key)?;
        let (key_action, arg) = parse_action_value(lua, action)?;

        builder_clone
            .borrow_mut()
            .keybindings
            .push(Key::new(modifiers, keysym, key_action, arg));
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let clear = lua.create_function(move |_, ()| {
        builder_clone.borrow_mut().keybindings.clear();
        Ok(())
    })?;

    key_table.set("bind", bind)?;
    key_table.set("clear", clear)?;
    parent.set("key", key_table)?;
    Ok(())
}

fn register_mouse_module(lua: &Lua, parent: &Table, builder: SharedBuilder) -> Result<(), ConfigError> {
    let mouse_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let bind = lua.create_function(
        move |lua, (click, mods, button, action): (String, Value, u8, Value)| {
            let click = parse_click(&click)?;
            let modkey = builder_clone.borrow().modkey;
            let modifiers = parse_modifiers_value(mods, modkey)?;
            let (key_action, arg) = parse_action_value(lua, action)?;

            builder_clone
                .borrow_mut()
                .buttons
                .push(Button::new(click, modifiers, button, key_action, arg));
            Ok(())
        },
    )?;

    let builder_clone = builder.clone();
    let clear = lua.create_function(move |_, ()| {
        builder_clone.borrow_mut().buttons.clear();
        Ok(())
    })?;

    register_actions(
        lua,
        &mouse_table,
        &[
            ("move", "MoveMouse", false),
            ("resize", "ResizeMouse", false),
        ],
    )?;
    mouse_table.set("bind", bind)?;
    mouse_table.set("clear", clear)?;
    parent.set("mouse", mouse_table)?;
    Ok(())
}

fn register_gaps_module(lua: &Lua, parent: &Table, builder: SharedBuilder) -> Result<(), ConfigError> {
    let gaps_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let set_enabled = lua.create_function(move |_, enabled: bool| {
        builder_clone.borrow_mut().gaps_enabled = enabled;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_smart = lua.create_function(move |_, smart: bool| {
        builder_clone.borrow_mut().smart_gaps = smart;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_inner = lua.create_function(move |_, (h, v): (i32, i32)| {
        let mut b = builder_clone.borrow_mut();
        b.gaps.inner_horizontal = h;
        b.gaps.inner_vertical = v;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_outer = lua.create_function(move |_, (h, v): (i32, i32)| {
        let mut b = builder_clone.borrow_mut();
        b.gaps.outer_horizontal = h;
        b.gaps.outer_vertical = v;
        Ok(())
    })?;

    gaps_table.set("set_enabled", set_enabled)?;
    gaps_table.set("set_smart", set_smart)?;
    gaps_table.set("set_inner", set_inner)?;
    gaps_table.set("set_outer", set_outer)?;
    register_actions(
        lua,
        &gaps_table,
        &[
            ("toggle", "ToggleGaps", false),
            ("reset", "DefaultGaps", false),
            ("increase", "IncGaps", true),
        ],
    )?;
    parent.set("gaps", gaps_table)?;
    Ok(())
}

fn register_border_module(lua: &Lua, parent: &Table, builder: SharedBuilder) -> Result<(), ConfigError> {
    let border_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let set_width = lua.create_function(move |_, width: u32| {
        builder_clone.borrow_mut().border_width = width;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_focused_color = lua.create_function(move |_, color: Value| {
        let color_u32 = parse_color_value(color)?;
        builder_clone.borrow_mut().schemes.selected.border = color_u32;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_unfocused_color = lua.create_function(move |_, color: Value| {
        let color_u32 = parse_color_value(color)?;
        builder_clone.borrow_mut().schemes.normal.border = color_u32;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_urgent_color = lua.create_function(move |_, color: Value| {
        let color_u32 = parse_color_value(color)?;
        builder_clone.borrow_mut().schemes.urgent = color_u32;
        Ok(())
    })?;

    border_table.set("set_width", set_width)?;
    border_table.set("set_focused_color", set_focused_color)?;
    border_table.set("set_unfocused_color", set_unfocused_color)?;
    border_table.set("set_urgent_color", set_urgent_color)?;
    parent.set("border", border_table)?;
    Ok(())
}

fn register_client_module(lua: &Lua, parent: &Table) -> Result<(), ConfigError> {
    let client_table = lua.create_table()?;
    register_actions(
        lua,
        &client_table,
        &[
            ("kill", "KillClient", false),
            ("toggle_fullscreen", "ToggleFullScreen", false),
            ("toggle_floating", "ToggleFloating", false),
            ("toggle_sticky", "ToggleSticky", false),
            ("zoom", "Zoom", false),
            ("hide", "Hide", false),
            ("focus_stack", "FocusStack", true),
            ("push_stack", "PushStack", true),
        ],
    )?;
    parent.set("client", client_table)?;
    Ok(())
}

fn register_layout_module(lua: &Lua, parent: &Table, builder: SharedBuilder) -> Result<(), ConfigError> {
    let layout_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let set_layouts = lua.create_function(move |_, names: Vec<String>| {
        let layouts = names
            .iter()
            .map(|name| parse_layout(name).map(LayoutEntry::new))
            .collect::<mlua::Result<Vec<_>>>()?;
        builder_clone.borrow_mut().layouts = layouts;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_symbol = lua.create_function(move |_, (name, symbol): (String, String)| {
        let kind = parse_layout(&name)?;
        for entry in builder_clone
            .borrow_mut()
            .layouts
            .iter_mut()
            .filter(|entry| entry.kind == kind)
        {
            entry.symbol = symbol.clone();
        }
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_master = lua.create_function(move |_, (mfact, nmaster): (f32, i32)| {
        if !(0.05..=0.95).contains(&mfact) {
            return Err(mlua::Error::RuntimeError(format!(
                "tagwm.layout.set_master: mfact {} must be between 0.05 and 0.95",
                mfact
            )));
        }
        let mut b = builder_clone.borrow_mut();
        b.mfact = mfact;
        b.nmaster = nmaster.max(0);
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_resize_hints = lua.create_function(move |_, respect: bool| {
        builder_clone.borrow_mut().resize_hints = respect;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_menu = lua.create_function(move |_, command: String| {
        builder_clone.borrow_mut().layout_menu_command = command;
        Ok(())
    })?;

    layout_table.set("set_layouts", set_layouts)?;
    layout_table.set("set_symbol", set_symbol)?;
    layout_table.set("set_master", set_master)?;
    layout_table.set("set_resize_hints", set_resize_hints)?;
    layout_table.set("set_menu", set_menu)?;
    register_actions(
        lua,
        &layout_table,
        &[
            ("set", "SetLayout", true),
            ("cycle", "CycleLayout", true),
            ("menu", "LayoutMenu", false),
            ("set_mfact", "SetMfact", true),
            ("inc_nmaster", "IncNMaster", true),
        ],
    )?;
    parent.set("layout", layout_table)?;
    Ok(())
}

fn register_tag_module(lua: &Lua, parent: &Table) -> Result<(), ConfigError> {
    let tag_table = lua.create_table()?;
    register_actions(
        lua,
        &tag_table,
        &[
            ("view", "View", true),
            ("toggle_view", "ToggleView", true),
            ("move_to", "Tag", true),
            ("toggle", "ToggleTag", true),
            ("swap", "SwapTags", true),
            ("shift_view", "ShiftView", true),
            ("shift", "ShiftTag", true),
        ],
    )?;

    let view_all = lua.create_function(|lua, ()| {
        create_action_table(lua, "View", Value::Integer(-1))
    })?;
    tag_table.set("view_all", view_all)?;
    parent.set("tag", tag_table)?;
    Ok(())
}

fn register_monitor_module(lua: &Lua, parent: &Table) -> Result<(), ConfigError> {
    let monitor_table = lua.create_table()?;
    register_actions(
        lua,
        &monitor_table,
        &[("focus", "FocusMonitor", true), ("tag", "TagMonitor", true)],
    )?;
    parent.set("monitor", monitor_table)?;
    Ok(())
}

fn register_bar_module(lua: &Lua, parent: &Table, builder: SharedBuilder) -> Result<(), ConfigError> {
    let bar_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let set_font = lua.create_function(move |_, font: String| {
        builder_clone.borrow_mut().font = font;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_height = lua.create_function(move |_, height: i32| {
        builder_clone.borrow_mut().bar_height = height;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_padding = lua.create_function(move |_, (x, y): (i32, i32)| {
        builder_clone.borrow_mut().bar_padding = (x, y);
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_position = lua.create_function(move |_, position: String| {
        let top = match position.as_str() {
            "top" => true,
            "bottom" => false,
            _ => {
                return Err(mlua::Error::RuntimeError(format!(
                    "tagwm.bar.set_position: '{}' must be top or bottom",
                    position
                )));
            }
        };
        builder_clone.borrow_mut().top_bar = top;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_visible = lua.create_function(move |_, visible: bool| {
        builder_clone.borrow_mut().show_bar = visible;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_status_program = lua.create_function(move |_, program: String| {
        builder_clone.borrow_mut().status_program = program;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let add_launcher = lua.create_function(move |_, (name, command): (String, Value)| {
        let command = command_value(command, "tagwm.bar.add_launcher")?;
        builder_clone
            .borrow_mut()
            .launchers
            .push(Launcher { name, command });
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let clear_launchers = lua.create_function(move |_, ()| {
        builder_clone.borrow_mut().launchers.clear();
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_scheme = lua.create_function(
        move |_, (name, fg, bg, border): (String, Value, Value, Option<Value>)| {
            let scheme = ColorScheme::new(
                parse_color_value(fg)?,
                parse_color_value(bg)?,
                border.map(parse_color_value).transpose()?.unwrap_or(0),
            );
            let mut b = builder_clone.borrow_mut();
            let schemes = &mut b.schemes;
            let slot = match name.as_str() {
                "normal" => &mut schemes.normal,
                "selected" => &mut schemes.selected,
                "status" => &mut schemes.status,
                "tags_normal" => &mut schemes.tags_normal,
                "tags_selected" => &mut schemes.tags_selected,
                "info" => &mut schemes.info,
                "optimal" => &mut schemes.optimal,
                "critical" => &mut schemes.critical,
                _ => {
                    return Err(mlua::Error::RuntimeError(format!(
                        "tagwm.bar.set_scheme: unknown scheme '{}'. valid schemes: normal, selected, status, tags_normal, tags_selected, info, optimal, critical",
                        name
                    )));
                }
            };
            *slot = scheme;
            Ok(())
        },
    )?;

    bar_table.set("set_font", set_font)?;
    bar_table.set("set_height", set_height)?;
    bar_table.set("set_padding", set_padding)?;
    bar_table.set("set_position", set_position)?;
    bar_table.set("set_visible", set_visible)?;
    bar_table.set("set_status_program", set_status_program)?;
    bar_table.set("add_launcher", add_launcher)?;
    bar_table.set("clear_launchers", clear_launchers)?;
    bar_table.set("set_scheme", set_scheme)?;
    register_actions(
        lua,
        &bar_table,
        &[("toggle", "ToggleBar", false), ("signal_status", "SigStatus", true)],
    )?;
    parent.set("bar", bar_table)?;
    Ok(())
}

fn register_scratchpad_module(
    lua: &Lua,
    parent: &Table,
    builder: SharedBuilder,
) -> Result<(), ConfigError> {
    let scratchpad_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let add = lua.create_function(move |_, (name, command): (String, Value)| {
        let command = command_value(command, "tagwm.scratchpad.add")?;
        builder_clone
            .borrow_mut()
            .scratchpads
            .push(Scratchpad { name, command });
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let clear = lua.create_function(move |_, ()| {
        builder_clone.borrow_mut().scratchpads.clear();
        Ok(())
    })?;

    scratchpad_table.set("add", add)?;
    scratchpad_table.set("clear", clear)?;
    register_actions(lua, &scratchpad_table, &[("toggle", "ToggleScratch", true)])?;
    parent.set("scratchpad", scratchpad_table)?;
    Ok(())
}

fn register_misc(lua: &Lua, parent: &Table, builder: SharedBuilder) -> Result<(), ConfigError> {
    let builder_clone = builder.clone();
    let set_terminal = lua.create_function(move |_, (term, class): (String, Option<String>)| {
        let mut b = builder_clone.borrow_mut();
        b.terminal = term;
        if let Some(class) = class {
            b.terminal_class = class;
        }
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_modkey = lua.create_function(move |_, modkey_str: String| {
        let modkey = parse_modkey_string(&modkey_str)
            .map_err(|e| mlua::Error::RuntimeError(format!("{}", e)))?;
        builder_clone.borrow_mut().modkey = modkey;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_tags = lua.create_function(move |_, tags: Vec<String>| {
        builder_clone.borrow_mut().tags = tags;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_snap = lua.create_function(move |_, snap: i32| {
        builder_clone.borrow_mut().snap = snap;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_swallow_floating = lua.create_function(move |_, swallow: bool| {
        builder_clone.borrow_mut().swallow_floating = swallow;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let rule = lua.create_function(move |_, spec: Table| {
        let rule = parse_rule(&spec)?;
        builder_clone.borrow_mut().rules.push(rule);
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let clear_rules = lua.create_function(move |_, ()| {
        builder_clone.borrow_mut().rules.clear();
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let autostart = lua.create_function(move |_, cmd: String| {
        builder_clone.borrow_mut().autostart.push(cmd);
        Ok(())
    })?;

    parent.set("set_terminal", set_terminal)?;
    parent.set("set_modkey", set_modkey)?;
    parent.set("set_tags", set_tags)?;
    parent.set("set_snap", set_snap)?;
    parent.set("set_swallow_floating", set_swallow_floating)?;
    parent.set("rule", rule)?;
    parent.set("clear_rules", clear_rules)?;
    parent.set("autostart", autostart)?;
    register_actions(
        lua,
        parent,
        &[("quit", "Quit", false), ("restart", "Restart", false)],
    )?;
    Ok(())
}

fn parse_rule(spec: &Table) -> mlua::Result<Rule> {
    let flag = |name: &str| -> mlua::Result<bool> {
        Ok(spec.get::<Option<bool>>(name)?.unwrap_or(false))
    };
    let tags = match spec.get::<Option<u32>>("tags")? {
        Some(0) | None => 0,
        Some(tag) if tag <= 31 => 1 << (tag - 1),
        Some(tag) => {
            return Err(mlua::Error::RuntimeError(format!(
                "tagwm.rule: tag {} is out of range",
                tag
            )));
        }
    };
    Ok(Rule {
        class: spec.get("class")?,
        instance: spec.get("instance")?,
        title: spec.get("title")?,
        tags,
        is_floating: flag("floating")?,
        is_terminal: flag("terminal")?,
        is_centered: flag("centered")?,
        no_swallow: flag("no_swallow")?,
        managed_size: flag("managed_size")?,
        monitor: spec.get("monitor")?,
    })
}

fn parse_modifiers_value(value: Value, modkey: KeyButMask) -> mlua::Result<Vec<KeyButMask>> {
    let parse = |name: &str| match name {
        "Mod" => Ok(modkey),
        _ => parse_modkey_string(name).map_err(|e| {
            mlua::Error::RuntimeError(format!("tagwm.key.bind: invalid modifier - {}", e))
        }),
    };
    match value {
        Value::Table(t) => {
            let mut mods = Vec::new();
            for i in 1..=t.len()? {
                let mod_str: String = t.get(i)?;
                mods.push(parse(&mod_str)?);
            }
            Ok(mods)
        }
        Value::String(s) => Ok(vec![parse(&s.to_str()?)?]),
        Value::Nil => Ok(Vec::new()),
        _ => Err(mlua::Error::RuntimeError(
            "tagwm.key.bind: first argument must be a table of modifiers like {\"Mod4\"} or {\"Mod4\", \"Shift\"}".into(),
        )),
    }
}

fn parse_modkey_string(s: &str) -> Result<KeyButMask, ConfigError> {
    match s {
        "Mod1" => Ok(KeyButMask::MOD1),
        "Mod2" => Ok(KeyButMask::MOD2),
        "Mod3" => Ok(KeyButMask::MOD3),
        "Mod4" => Ok(KeyButMask::MOD4),
        "Mod5" => Ok(KeyButMask::MOD5),
        "Shift" => Ok(KeyButMask::SHIFT),
        "Control" => Ok(KeyButMask::CONTROL),
        _ => Err(ConfigError::InvalidModkey(format!(
            "'{}' is not a valid modifier. Use one of: Mod1, Mod4, Shift, Control",
            s
        ))),
    }
}

fn parse_keysym(key: &str) -> mlua::Result<Keysym> {
    keysyms::keysym_from_str(key).ok_or_else(|| {
        mlua::Error::RuntimeError(format!(
            "unknown key '{}'. valid keys include: Return, space, a-z, 0-9, F1-F12, Left, Right, Up, Down",
            key
        ))
    })
}

fn parse_click(click: &str) -> mlua::Result<Click> {
    match click {
        "tag_bar" => Ok(Click::TagBar),
        "layout_symbol" => Ok(Click::LtSymbol),
        "status" => Ok(Click::StatusText),
        "title" => Ok(Click::WinTitle),
        "client" => Ok(Click::ClientWin),
        "root" => Ok(Click::RootWin),
        _ => Err(mlua::Error::RuntimeError(format!(
            "tagwm.mouse.bind: unknown click region '{}'. valid regions: tag_bar, layout_symbol, status, title, client, root",
            click
        ))),
    }
}

fn parse_layout(name: &str) -> mlua::Result<LayoutKind> {
    LayoutKind::from_str(name).map_err(mlua::Error::RuntimeError)
}

fn command_value(value: Value, context: &str) -> mlua::Result<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec!["sh".into(), "-c".into(), s.to_str()?.to_string()]),
        Value::Table(t) => t.sequence_values::<String>().collect(),
        _ => Err(mlua::Error::RuntimeError(format!(
            "{}: command must be a string or a table of arguments",
            context
        ))),
    }
}

fn parse_action_value(_lua: &Lua, value: Value) -> mlua::Result<(KeyAction, Arg)> {
    match value {
        Value::Function(_) => Err(mlua::Error::RuntimeError(
            "action must be a function call, not a function reference. did you forget ()? example: tagwm.spawn('st') not tagwm.spawn".into(),
        )),
        Value::Table(t) => {
            if let Ok(action_name) = t.get::<String>("__action") {
                let action = string_to_action(&action_name)?;
                let arg = match t.get::<Value>("__arg") {
                    Ok(arg_val) => value_to_arg(arg_val)?,
                    Err(_) => Arg::None,
                };
                return Ok((action, arg));
            }

            Err(mlua::Error::RuntimeError(
                "action must be a table returned by tagwm functions like tagwm.spawn(), tagwm.client.kill(), tagwm.quit(), etc.".into(),
            ))
        }
        _ => Err(mlua::Error::RuntimeError(
            "action must be a table returned by tagwm functions like tagwm.spawn(), tagwm.client.kill(), tagwm.quit(), etc.".into(),
        )),
    }
}

fn string_to_action(s: &str) -> mlua::Result<KeyAction> {
    let action = match s {
        "Spawn" => KeyAction::Spawn,
        "KillClient" => KeyAction::KillClient,
        "FocusStack" => KeyAction::FocusStack,
        "PushStack" => KeyAction::PushStack,
        "Zoom" => KeyAction::Zoom,
        "View" => KeyAction::View,
        "ToggleView" => KeyAction::ToggleView,
        "Tag" => KeyAction::Tag,
        "ToggleTag" => KeyAction::ToggleTag,
        "SwapTags" => KeyAction::SwapTags,
        "ShiftView" => KeyAction::ShiftView,
        "ShiftTag" => KeyAction::ShiftTag,
        "SetLayout" => KeyAction::SetLayout,
        "CycleLayout" => KeyAction::CycleLayout,
        "LayoutMenu" => KeyAction::LayoutMenu,
        "SetMfact" => KeyAction::SetMfact,
        "IncNMaster" => KeyAction::IncNMaster,
        "ToggleFloating" => KeyAction::ToggleFloating,
        "ToggleFullScreen" => KeyAction::ToggleFullScreen,
        "ToggleSticky" => KeyAction::ToggleSticky,
        "ToggleScratch" => KeyAction::ToggleScratch,
        "ToggleBar" => KeyAction::ToggleBar,
        "FocusMonitor" => KeyAction::FocusMonitor,
        "TagMonitor" => KeyAction::TagMonitor,
        "IncGaps" => KeyAction::IncGaps,
        "ToggleGaps" => KeyAction::ToggleGaps,
        "DefaultGaps" => KeyAction::DefaultGaps,
        "Hide" => KeyAction::Hide,
        "MoveMouse" => KeyAction::MoveMouse,
        "ResizeMouse" => KeyAction::ResizeMouse,
        "SigStatus" => KeyAction::SigStatus,
        "Quit" => KeyAction::Quit,
        "Restart" => KeyAction::Restart,
        other => {
            return Err(mlua::Error::RuntimeError(format!(
                "unknown action '{}'. this is an internal error, please report it",
                other
            )));
        }
    };
    Ok(action)
}

fn value_to_arg(value: Value) -> mlua::Result<Arg> {
    match value {
        Value::Nil => Ok(Arg::None),
        Value::String(s) => Ok(Arg::Str(s.to_str()?.to_string())),
        Value::Integer(i) => Ok(Arg::Int(i as i32)),
        Value::Number(n) => Ok(Arg::Float(n as f32)),
        Value::Table(t) => Ok(Arg::Array(t.sequence_values::<String>().collect::<mlua::Result<_>>()?)),
        _ => Ok(Arg::None),
    }
}

fn create_action_table(lua: &Lua, action_name: &str, arg: Value) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    table.set("__action", action_name)?;
    table.set("__arg", arg)?;
    Ok(table)
}

fn parse_color_value(value: Value) -> mlua::Result<u32> {
    match value {
        Value::Integer(i) => Ok(i as u32),
        Value::Number(n) => Ok(n as u32),
        Value::String(s) => {
            let s = s.to_str()?;
            let hex = s.strip_prefix('#').or_else(|| s.strip_prefix("0x"));
            match hex {
                Some(digits) => u32::from_str_radix(digits, 16).map_err(|e| {
                    mlua::Error::RuntimeError(format!(
                        "invalid hex color '{}': {}. use format like #ff0000 or 0xff0000",
                        &*s, e
                    ))
                }),
                None => s.parse::<u32>().map_err(|e| {
                    mlua::Error::RuntimeError(format!(
                        "invalid color '{}': {}. use hex format like 0xff0000 or #ff0000",
                        &*s, e
                    ))
                }),
            }
        }
        _ => Err(mlua::Error::RuntimeError(
            "color must be a number (0xff0000) or string ('#ff0000' or '0xff0000')".into(),
        )),
    }
}
