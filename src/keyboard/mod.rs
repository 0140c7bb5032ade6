pub mod handlers;
pub mod keysyms;

pub use handlers::{
    Arg, Button, Click, Key, KeyAction, handle_button_press, handle_key_press, modifiers_to_mask,
};
pub use keysyms::Keysym;
