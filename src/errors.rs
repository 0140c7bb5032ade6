use thiserror::Error;

pub type WmResult<T> = Result<T, WmError>;

#[derive(Debug, Error)]
pub enum WmError {
    #[error(transparent)]
    X11(#[from] X11Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum X11Error {
    #[error("{0}")]
    ConnectError(#[from] x11rb::errors::ConnectError),
    #[error("{0}")]
    ConnectionError(#[from] x11rb::errors::ConnectionError),
    #[error("{0}")]
    ReplyError(#[from] x11rb::errors::ReplyError),
    #[error("{0}")]
    ReplyOrIdError(#[from] x11rb::errors::ReplyOrIdError),
    #[error("another window manager is already running")]
    OtherWindowManager,
    #[error("failed to load font: {0}")]
    FontLoadFailed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse RON config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    #[error("Failed to read {0}: {1}")]
    Unreadable(String, std::io::Error),
    #[error("Lua config error: {0}")]
    LuaError(String),
    #[error("Invalid modkey: {0}")]
    InvalidModkey(String),
    #[error("Unknown key: {0}")]
    UnknownKey(String),
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid tag count {0}: between 1 and 31 tags including scratchpads are supported")]
    InvalidTagCount(usize),
    #[error("Invalid variable name '{0}': must start with $")]
    InvalidVariableName(String),
    #[error("Invalid #DEFINE syntax: '{0}'. Expected: #DEFINE $var_name = value")]
    InvalidDefine(String),
    #[error("Undefined variable '{0}': define it with #DEFINE before use")]
    UndefinedVariable(String),
}

macro_rules! x11_error_into_wm {
    ($($source:ty),*) => {
        $(
            impl From<$source> for WmError {
                fn from(value: $source) -> Self {
                    Self::X11(value.into())
                }
            }
        )*
    };
}

x11_error_into_wm!(
    x11rb::errors::ConnectError,
    x11rb::errors::ConnectionError,
    x11rb::errors::ReplyError,
    x11rb::errors::ReplyOrIdError
);

impl From<mlua::Error> for ConfigError {
    fn from(value: mlua::Error) -> Self {
        ConfigError::LuaError(value.to_string())
    }
}
