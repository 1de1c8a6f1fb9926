//! Keyboard shortcuts for the timeline.
//!
//! Every key binding resolves to a [`TimelineAction`]. Bindings are plain
//! data so a settings screen can rebind them.

use std::collections::HashMap;
use std::fmt;

// ── Shortcut representation ─────────────────────────────────────

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub command: bool, // ⌘ on macOS
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        command: false,
    };
    pub const SHIFT: Self = Self {
        ctrl: false,
        shift: true,
        alt: false,
        command: false,
    };
}

/// A physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    /// A printable character, stored lowercase.
    Char(char),
}

impl Key {
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_lowercase())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Space => f.write_str("Space"),
            Key::ArrowLeft => f.write_str("←"),
            Key::ArrowRight => f.write_str("→"),
            Key::ArrowUp => f.write_str("↑"),
            Key::ArrowDown => f.write_str("↓"),
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
        }
    }
}

/// A keyboard shortcut (modifier + key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl Shortcut {
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        let key = match key {
            Key::Char(c) => Key::char(c),
            other => other,
        };
        Self { modifiers, key }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(Modifiers::NONE, key)
    }

    pub fn shift(key: Key) -> Self {
        Self::new(Modifiers::SHIFT, key)
    }

    /// Format for display: "Space", "⇧→", "M".
    pub fn display(&self) -> String {
        let mut s = String::new();
        if self.modifiers.ctrl {
            s.push('⌃');
        }
        if self.modifiers.alt {
            s.push('⌥');
        }
        if self.modifiers.shift {
            s.push('⇧');
        }
        if self.modifiers.command {
            s.push('⌘');
        }
        s.push_str(&self.key.to_string());
        s
    }
}

// ── Actions ─────────────────────────────────────────────────────

/// What a shortcut does on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimelineAction {
    TogglePlayback,
    SkipBack,
    SkipForward,
    JumpToStart,
    JumpToEnd,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    ToggleSolo,
}

impl TimelineAction {
    pub const ALL: [TimelineAction; 12] = [
        Self::TogglePlayback,
        Self::SkipBack,
        Self::SkipForward,
        Self::JumpToStart,
        Self::JumpToEnd,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::ResetZoom,
        Self::VolumeUp,
        Self::VolumeDown,
        Self::ToggleMute,
        Self::ToggleSolo,
    ];

    /// Actions that operate on the selected track and are ignored without one.
    pub fn requires_selection(self) -> bool {
        matches!(
            self,
            Self::SkipBack
                | Self::SkipForward
                | Self::JumpToStart
                | Self::JumpToEnd
                | Self::ToggleMute
                | Self::ToggleSolo
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TogglePlayback => "Play/Pause",
            Self::SkipBack => "Skip Back",
            Self::SkipForward => "Skip Forward",
            Self::JumpToStart => "Jump to Start",
            Self::JumpToEnd => "Jump to End",
            Self::ZoomIn => "Zoom In",
            Self::ZoomOut => "Zoom Out",
            Self::ResetZoom => "Reset Zoom",
            Self::VolumeUp => "Volume Up",
            Self::VolumeDown => "Volume Down",
            Self::ToggleMute => "Toggle Mute",
            Self::ToggleSolo => "Toggle Solo",
        }
    }
}

impl fmt::Display for TimelineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Map ─────────────────────────────────────────────────────────

/// Shortcut → action bindings.
#[derive(Debug, Clone)]
pub struct ShortcutMap {
    by_shortcut: HashMap<Shortcut, TimelineAction>,
}

impl ShortcutMap {
    /// Map with the default bindings.
    pub fn new() -> Self {
        let mut map = Self::empty();
        map.register_defaults();
        map
    }

    pub fn empty() -> Self {
        Self {
            by_shortcut: HashMap::new(),
        }
    }

    /// Bind a shortcut, returning the action it was bound to before.
    pub fn bind(&mut self, shortcut: Shortcut, action: TimelineAction) -> Option<TimelineAction> {
        self.by_shortcut.insert(shortcut, action)
    }

    pub fn unbind(&mut self, shortcut: &Shortcut) -> Option<TimelineAction> {
        self.by_shortcut.remove(shortcut)
    }

    /// Resolve a key press.
    ///
    /// Shift on a character key is ignored when the shifted form has no
    /// binding, so `M` and `⇧M` both toggle mute.
    pub fn action_for(&self, shortcut: &Shortcut) -> Option<TimelineAction> {
        if let Some(action) = self.by_shortcut.get(shortcut) {
            return Some(*action);
        }
        match shortcut.key {
            Key::Char(_) if shortcut.modifiers == Modifiers::SHIFT => {
                self.by_shortcut.get(&Shortcut::plain(shortcut.key)).copied()
            }
            _ => None,
        }
    }

    /// All shortcuts bound to `action`, sorted by display text.
    pub fn shortcuts_for(&self, action: TimelineAction) -> Vec<Shortcut> {
        let mut shortcuts: Vec<Shortcut> = self
            .by_shortcut
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(s, _)| *s)
            .collect();
        shortcuts.sort_by_key(|s| s.display());
        shortcuts
    }

    pub fn len(&self) -> usize {
        self.by_shortcut.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_shortcut.is_empty()
    }

    fn register_defaults(&mut self) {
        use TimelineAction::*;

        // ── Transport ────────────────────────────────
        self.bind(Shortcut::plain(Key::Space), TogglePlayback);
        self.bind(Shortcut::plain(Key::ArrowLeft), SkipBack);
        self.bind(Shortcut::plain(Key::ArrowRight), SkipForward);
        self.bind(Shortcut::shift(Key::ArrowLeft), JumpToStart);
        self.bind(Shortcut::shift(Key::ArrowRight), JumpToEnd);

        // ── View ─────────────────────────────────────
        self.bind(Shortcut::plain(Key::Char('=')), ZoomIn);
        self.bind(Shortcut::plain(Key::Char('+')), ZoomIn);
        self.bind(Shortcut::plain(Key::Char('-')), ZoomOut);
        self.bind(Shortcut::plain(Key::Char('0')), ResetZoom);

        // ── Volume & routing ─────────────────────────
        self.bind(Shortcut::plain(Key::ArrowUp), VolumeUp);
        self.bind(Shortcut::plain(Key::ArrowDown), VolumeDown);
        self.bind(Shortcut::plain(Key::char('m')), ToggleMute);
        self.bind(Shortcut::plain(Key::char('s')), ToggleSolo);
    }
}

impl Default for ShortcutMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let map = ShortcutMap::new();
        assert_eq!(
            map.action_for(&Shortcut::plain(Key::Space)),
            Some(TimelineAction::TogglePlayback)
        );
        assert_eq!(
            map.action_for(&Shortcut::shift(Key::ArrowRight)),
            Some(TimelineAction::JumpToEnd)
        );
        assert_eq!(
            map.action_for(&Shortcut::plain(Key::ArrowRight)),
            Some(TimelineAction::SkipForward)
        );
        assert_eq!(map.len(), 13);
    }

    #[test]
    fn test_every_action_has_a_binding() {
        let map = ShortcutMap::new();
        for action in TimelineAction::ALL {
            assert!(!map.shortcuts_for(action).is_empty(), "{} is unbound", action);
        }
    }

    #[test]
    fn test_char_keys_are_case_insensitive() {
        let map = ShortcutMap::new();
        assert_eq!(
            map.action_for(&Shortcut::plain(Key::char('M'))),
            Some(TimelineAction::ToggleMute)
        );
        assert_eq!(
            map.action_for(&Shortcut::shift(Key::char('S'))),
            Some(TimelineAction::ToggleSolo)
        );
    }

    #[test]
    fn test_shift_arrow_does_not_fall_back() {
        let mut map = ShortcutMap::new();
        map.unbind(&Shortcut::shift(Key::ArrowLeft));
        assert_eq!(map.action_for(&Shortcut::shift(Key::ArrowLeft)), None);
    }

    #[test]
    fn test_rebind() {
        let mut map = ShortcutMap::new();
        let previous = map.bind(Shortcut::plain(Key::char('m')), TimelineAction::ToggleSolo);
        assert_eq!(previous, Some(TimelineAction::ToggleMute));
        assert_eq!(
            map.action_for(&Shortcut::plain(Key::char('m'))),
            Some(TimelineAction::ToggleSolo)
        );
    }

    #[test]
    fn test_zoom_bindings() {
        let map = ShortcutMap::new();
        let zoom_in = map.shortcuts_for(TimelineAction::ZoomIn);
        assert_eq!(zoom_in.len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shortcut::shift(Key::ArrowRight).display(), "⇧→");
        assert_eq!(Shortcut::plain(Key::char('m')).display(), "M");
        assert_eq!(Shortcut::plain(Key::Space).display(), "Space");
    }

    #[test]
    fn test_selection_requirements() {
        assert!(TimelineAction::SkipForward.requires_selection());
        assert!(TimelineAction::ToggleSolo.requires_selection());
        assert!(!TimelineAction::TogglePlayback.requires_selection());
        assert!(!TimelineAction::ZoomIn.requires_selection());
        assert!(!TimelineAction::VolumeUp.requires_selection());
    }
}
