use std::process::Command;

use tracing::{debug, warn};

/// Segments ending in `%` at or below this value are drawn as critical.
pub const CRITICAL_PERCENT: i32 = 30;

/// Shown when the root window carries no name.
pub fn default_status() -> String {
    format!("tagwm-{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Optimal,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// A one-character icon slot followed by its label.
    Icon { slot: char, label: String },
    /// A percentage reading, colored by level.
    Value { text: String, level: Level },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Signal index of the status block the segment came from.
    pub signal: Option<u8>,
}

impl Segment {
    pub fn text(&self) -> &str {
        match &self.kind {
            SegmentKind::Icon { label, .. } => label,
            SegmentKind::Value { text, .. } => text,
            SegmentKind::Text(text) => text,
        }
    }
}

/// Status text as published on the root window name. Control characters
/// carry the signal index of the block that follows them and never reach
/// the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusText {
    raw: String,
    segments: Vec<Segment>,
}

impl Default for StatusText {
    fn default() -> Self {
        Self::parse(&default_status())
    }
}

impl StatusText {
    pub fn parse(raw: &str) -> Self {
        let mut tokens: Vec<(String, Option<u8>)> = Vec::new();
        let mut signal = None;
        let mut block = String::new();

        for ch in raw.chars() {
            if (ch as u32) < u32::from(b' ') {
                push_tokens(&mut tokens, &block, signal);
                block.clear();
                signal = Some(ch as u8);
            } else {
                block.push(ch);
            }
        }
        push_tokens(&mut tokens, &block, signal);

        let mut segments = Vec::new();
        let mut tokens = tokens.into_iter().peekable();
        while let Some((token, signal)) = tokens.next() {
            let mut chars = token.chars();
            let kind = match (chars.next(), chars.next()) {
                (Some(slot), None) => {
                    let label = tokens.next().map(|(label, _)| label).unwrap_or_default();
                    SegmentKind::Icon { slot, label }
                }
                _ if token.ends_with('%') => SegmentKind::Value {
                    level: percent_level(&token),
                    text: token,
                },
                _ => SegmentKind::Text(token),
            };
            segments.push(Segment { kind, signal });
        }

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Printable text with the control characters stripped.
    pub fn visible(&self) -> String {
        self.raw.chars().filter(|&ch| ch >= ' ').collect()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

fn push_tokens(tokens: &mut Vec<(String, Option<u8>)>, block: &str, signal: Option<u8>) {
    tokens.extend(
        block
            .split('|')
            .filter(|token| !token.is_empty())
            .map(|token| (token.to_string(), signal)),
    );
}

fn percent_level(token: &str) -> Level {
    let start = token.trim_start_matches(|ch: char| !ch.is_ascii());
    if leading_int(start) <= CRITICAL_PERCENT {
        Level::Critical
    } else {
        Level::Optimal
    }
}

/// Parses a leading integer the way `atoi` does, zero when there is none.
fn leading_int(text: &str) -> i32 {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let value = digits
        .chars()
        .map_while(|ch| ch.to_digit(10))
        .fold(0i32, |acc, digit| acc.saturating_mul(10).saturating_add(digit as i32));
    sign * value
}

/// Forwards status bar clicks to the status generator process.
#[derive(Debug)]
pub struct StatusSignaler {
    program: String,
    pid: Option<libc::pid_t>,
}

impl StatusSignaler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            pid: None,
        }
    }

    /// Queues `SIGUSR1` carrying `(signal << 8) | button`. A stale pid is
    /// looked up again once.
    pub fn send(&mut self, signal: u8, button: u8) {
        let value = (i32::from(signal) << 8) | i32::from(button);

        let pid = match self.pid.or_else(|| self.lookup()) {
            Some(pid) => pid,
            None => {
                debug!("status generator {} is not running", self.program);
                return;
            }
        };

        if queue(pid, value).is_ok() {
            return;
        }

        match std::io::Error::last_os_error().raw_os_error() {
            Some(libc::ESRCH) => {
                if let Some(pid) = self.lookup()
                    && queue(pid, value).is_err()
                {
                    warn!("failed to signal status generator pid {}", pid);
                }
            }
            _ => warn!("failed to signal status generator pid {}", pid),
        }
    }

    fn lookup(&mut self) -> Option<libc::pid_t> {
        let output = Command::new("pidof")
            .args(["-s", &self.program])
            .output()
            .ok()?;
        self.pid = String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<libc::pid_t>()
            .ok()
            .filter(|&pid| pid > 0);
        self.pid
    }
}

fn queue(pid: libc::pid_t, value: i32) -> Result<(), ()> {
    let sigval = libc::sigval {
        sival_ptr: value as isize as *mut libc::c_void,
    };
    // SAFETY: sigqueue only reads the value union.
    let result = unsafe { libc::sigqueue(pid, libc::SIGUSR1, sigval) };
    if result == -1 { Err(()) } else { Ok(()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_characters_mark_block_signals() {
        let status = StatusText::parse("\u{1}vol 40%\u{2}mon 12:00");
        let segments = status.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].signal, Some(1));
        assert_eq!(segments[1].signal, Some(2));
        assert_eq!(status.visible(), "vol 40%mon 12:00");
    }

    #[test]
    fn test_single_character_token_is_icon_slot() {
        let status = StatusText::parse("3|wifi|plain");
        assert_eq!(
            status.segments()[0].kind,
            SegmentKind::Icon {
                slot: '3',
                label: "wifi".into()
            }
        );
        assert_eq!(status.segments()[1].kind, SegmentKind::Text("plain".into()));
    }

    #[test]
    fn test_percent_threshold() {
        let status = StatusText::parse("30%|31%|\u{f240} 12%");
        let levels: Vec<Level> = status
            .segments()
            .iter()
            .filter_map(|segment| match segment.kind {
                SegmentKind::Value { level, .. } => Some(level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![Level::Critical, Level::Optimal, Level::Critical]);
    }

    #[test]
    fn test_empty_tokens_are_skipped() {
        let status = StatusText::parse("||a||bc|");
        assert_eq!(status.segments().len(), 1);
        assert_eq!(
            status.segments()[0].kind,
            SegmentKind::Icon {
                slot: 'a',
                label: "bc".into()
            }
        );
    }

    #[test]
    fn test_default_status_names_the_version() {
        let status = StatusText::default();
        assert!(status.raw().starts_with("tagwm-"));
    }

    #[test]
    fn test_leading_int_matches_atoi() {
        assert_eq!(leading_int("  42%"), 42);
        assert_eq!(leading_int("-7"), -7);
        assert_eq!(leading_int("cpu 9%"), 0);
    }
}
