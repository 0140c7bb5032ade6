use tracing::{debug, info};

use super::{Control, WindowManager};
use crate::display::Display;
use crate::errors::WmResult;
use crate::keyboard::{Arg, KeyAction};

impl<D: Display> WindowManager<D> {
    /// Runs a bound action with its argument.
    pub(super) fn execute(&mut self, action: KeyAction, arg: &Arg) -> WmResult<()> {
        debug!("action {:?} {:?}", action, arg);
        match action {
            KeyAction::Spawn => {
                if let Some(argv) = arg.as_command() {
                    self.spawn(&argv);
                }
                Ok(())
            }
            KeyAction::KillClient => self.kill_client(),
            KeyAction::FocusStack => self.focus_stack(arg.as_int()),
            KeyAction::PushStack => self.push_stack(arg.as_int()),
            KeyAction::Zoom => self.zoom(),
            KeyAction::View => self.view(arg.as_tag_mask()),
            KeyAction::ToggleView => self.toggle_view(arg.as_tag_mask()),
            KeyAction::Tag => self.tag(arg.as_tag_mask()),
            KeyAction::ToggleTag => self.toggle_tag(arg.as_tag_mask()),
            KeyAction::SwapTags => self.swap_tags(arg.as_tag_mask()),
            KeyAction::ShiftView => self.shift_view(arg.as_int()),
            KeyAction::ShiftTag => self.shift_tag(arg.as_int()),
            KeyAction::SetLayout => {
                let layout = self.layout_index(arg);
                self.set_layout(layout)
            }
            KeyAction::CycleLayout => self.cycle_layout(arg.as_int()),
            KeyAction::LayoutMenu => self.layout_menu(),
            KeyAction::SetMfact => self.set_mfact(arg.as_float()),
            KeyAction::IncNMaster => self.inc_nmaster(arg.as_int()),
            KeyAction::ToggleFloating => self.toggle_floating(),
            KeyAction::ToggleFullScreen => self.toggle_fullscreen(),
            KeyAction::ToggleSticky => self.toggle_sticky(),
            KeyAction::ToggleScratch => match usize::try_from(arg.as_int()) {
                Ok(index) => self.toggle_scratch(index),
                Err(_) => Ok(()),
            },
            KeyAction::ToggleBar => self.toggle_bar(),
            KeyAction::FocusMonitor => self.focus_monitor(arg.as_int()),
            KeyAction::TagMonitor => self.tag_monitor(arg.as_int()),
            KeyAction::IncGaps => self.inc_gaps(arg.as_int()),
            KeyAction::ToggleGaps => self.toggle_gaps(),
            KeyAction::DefaultGaps => self.default_gaps(),
            KeyAction::Hide => self.hide(arg.as_int()),
            KeyAction::MoveMouse => self.move_mouse(),
            KeyAction::ResizeMouse => self.resize_mouse(),
            KeyAction::SigStatus => {
                let button = u8::try_from(arg.as_int()).unwrap_or(0);
                self.signaler.send(self.status_signal, button);
                Ok(())
            }
            KeyAction::Quit => {
                info!("quitting");
                self.control = Control::Quit;
                Ok(())
            }
            KeyAction::Restart => {
                info!("restarting");
                self.control = Control::Restart;
                Ok(())
            }
            KeyAction::None => Ok(()),
        }
    }

    pub(super) fn toggle_floating(&mut self) -> WmResult<()> {
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        let client = &mut self.clients[selected];
        if client.is_fullscreen {
            return Ok(());
        }
        client.is_floating = !client.is_floating || client.is_fixed;
        if client.is_floating {
            let geometry = client.geometry;
            self.resize(selected, geometry, false)?;
        }
        self.arrange(Some(self.selmon))
    }

    fn toggle_fullscreen(&mut self) -> WmResult<()> {
        match self.selected() {
            Some(selected) => {
                let fullscreen = !self.clients[selected].is_fullscreen;
                self.set_fullscreen(selected, fullscreen)
            }
            None => Ok(()),
        }
    }

    fn toggle_sticky(&mut self) -> WmResult<()> {
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        let client = &mut self.clients[selected];
        client.is_sticky = !client.is_sticky;
        self.arrange(Some(self.selmon))
    }

    /// Iconifies the selection and moves focus `step` clients along.
    pub(super) fn hide(&mut self, step: i32) -> WmResult<()> {
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        self.hide_window(selected)?;
        self.arrange(Some(self.selmon))?;
        self.focus_stack(step)
    }
}
