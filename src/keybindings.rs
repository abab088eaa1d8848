//! Keybinding registry: maps keys to actions per mounted view, with config
//! overrides.
//!
//! A view's bindings live under its own [`Context`], so only the mounted
//! view's keys are ever looked up.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    ViewSelected,
    MarkAllRead,
    Refresh,
    SwitchView,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::SelectNext => "Next item (marks current read)",
            Self::SelectPrevious => "Previous item",
            Self::ViewSelected => "Open item in browser",
            Self::MarkAllRead => "Mark all read",
            Self::Refresh => "Refresh",
            Self::SwitchView => "Switch unread / archive",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: which view is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Unread,
    Archive,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Unread => "Unread",
            Self::Archive => "Archive",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    /// Build a spec from a terminal event.
    ///
    /// For character keys SHIFT is already encoded in the character's case
    /// and terminals disagree on whether they report it, so it is dropped.
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "?"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Backspace", "Space"
/// - Modifier combos: "Ctrl+d", "Shift+a" (same as "A")
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let c = single_char(rest.trim())?;
        return Some(KeySpec::ctrl(c));
    }

    if let Some(rest) = s.strip_prefix("Shift+") {
        let c = single_char(rest.trim())?;
        return Some(KeySpec::plain(KeyCode::Char(c.to_ascii_uppercase())));
    }

    // Named keys (case-insensitive)
    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    // Function keys
    if let Some(n) = s
        .strip_prefix(&['F', 'f'][..])
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=12)
            .contains(&n)
            .then(|| KeySpec::plain(KeyCode::F(n)));
    }

    single_char(s).map(|c| KeySpec::plain(KeyCode::Char(c)))
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) if c.is_ascii_uppercase() && modifier.is_empty() => {
            format!("Shift+{}", c.to_ascii_lowercase())
        }
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; lookups
/// fall back to Global.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings for help screen enumeration
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        // === Global ===
        self.bind(
            Context::Global,
            KeySpec::plain(KeyCode::Char('q')),
            Action::Quit,
        );
        self.bind(Context::Global, KeySpec::ctrl('c'), Action::Quit);
        self.bind(
            Context::Global,
            KeySpec::plain(KeyCode::Char('r')),
            Action::Refresh,
        );
        self.bind(
            Context::Global,
            KeySpec::plain(KeyCode::Tab),
            Action::SwitchView,
        );
        self.bind(
            Context::Global,
            KeySpec::plain(KeyCode::Char('?')),
            Action::ShowHelp,
        );

        // === Item views ===
        for context in [Context::Unread, Context::Archive] {
            self.bind(
                context,
                KeySpec::plain(KeyCode::Char('j')),
                Action::SelectNext,
            );
            self.bind(
                context,
                KeySpec::plain(KeyCode::Char('k')),
                Action::SelectPrevious,
            );
            self.bind(
                context,
                KeySpec::plain(KeyCode::Char('v')),
                Action::ViewSelected,
            );
        }

        // Bulk mark exists only on the unread queue
        self.bind(
            Context::Unread,
            KeySpec::plain(KeyCode::Char('A')),
            Action::MarkAllRead,
        );
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "select_next").
    /// Values are key strings (e.g., "q", "Ctrl+d", "Shift+a").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let action = match parse_action_name(action_name) {
                Some(a) => a,
                None => {
                    warnings.push(format!("Unknown action '{}', ignoring", action_name));
                    continue;
                }
            };

            let key = match parse_key_string(key_str) {
                Some(k) => k,
                None => {
                    warnings.push(format!(
                        "Cannot parse key '{}' for action '{}', ignoring",
                        key_str, action_name
                    ));
                    continue;
                }
            };

            // Re-bind in every context the action was bound in
            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a key in the mounted view's context, falling
    /// back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// Bindings visible from `context` for the help screen, as
    /// (key_display_string, description) pairs.
    pub fn bindings_for(&self, context: Context) -> Vec<(String, &'static str)> {
        self.bindings
            .iter()
            .filter(|(ctx, _, _)| *ctx == context || *ctx == Context::Global)
            .map(|(_, key, action)| (format_key(key), action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "select_next" | "selectnext" | "next" => Some(Action::SelectNext),
        "select_previous" | "selectprevious" | "previous" | "prev" => {
            Some(Action::SelectPrevious)
        }
        "view_selected" | "viewselected" | "view" | "open" => Some(Action::ViewSelected),
        "mark_all_read" | "markallread" => Some(Action::MarkAllRead),
        "refresh" => Some(Action::Refresh),
        "switch_view" | "switchview" | "archive" => Some(Action::SwitchView),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_keys_in_unread() {
        let reg = KeybindingRegistry::new();
        let lookup = |c| reg.action_for_key(KeyCode::Char(c), KeyModifiers::NONE, Context::Unread);
        assert_eq!(lookup('j'), Some(Action::SelectNext));
        assert_eq!(lookup('k'), Some(Action::SelectPrevious));
        assert_eq!(lookup('v'), Some(Action::ViewSelected));
        assert_eq!(lookup('A'), Some(Action::MarkAllRead));
    }

    #[test]
    fn test_shift_a_matches_with_or_without_shift_flag() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('A'), KeyModifiers::SHIFT, Context::Unread),
            Some(Action::MarkAllRead)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('a'), KeyModifiers::NONE, Context::Unread),
            None
        );
    }

    #[test]
    fn test_archive_has_no_bulk_mark() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('A'), KeyModifiers::SHIFT, Context::Archive),
            None
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('j'), KeyModifiers::NONE, Context::Archive),
            Some(Action::SelectNext)
        );
    }

    #[test]
    fn test_item_keys_not_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('j'), KeyModifiers::NONE, Context::Global),
            None
        );
    }

    #[test]
    fn test_views_fall_back_to_global() {
        let reg = KeybindingRegistry::new();
        for ctx in [Context::Unread, Context::Archive] {
            assert_eq!(
                reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, ctx),
                Some(Action::Quit)
            );
            assert_eq!(
                reg.action_for_key(KeyCode::Tab, KeyModifiers::NONE, ctx),
                Some(Action::SwitchView)
            );
            assert_eq!(
                reg.action_for_key(KeyCode::Char('c'), KeyModifiers::CONTROL, ctx),
                Some(Action::Quit)
            );
        }
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::F(12), KeyModifiers::NONE, Context::Unread),
            None
        );
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Global),
            None
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, Context::Global),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_override_preserves_contexts() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("next".to_string(), "n".to_string());
        assert!(reg.apply_overrides(&overrides).is_empty());

        for ctx in [Context::Unread, Context::Archive] {
            assert_eq!(
                reg.action_for_key(KeyCode::Char('n'), KeyModifiers::NONE, ctx),
                Some(Action::SelectNext)
            );
            assert_eq!(
                reg.action_for_key(KeyCode::Char('j'), KeyModifiers::NONE, ctx),
                None
            );
        }
        // Still not a global key
        assert_eq!(
            reg.action_for_key(KeyCode::Char('n'), KeyModifiers::NONE, Context::Global),
            None
        );
    }

    #[test]
    fn test_override_mark_all_read_with_shift_string() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("mark_all_read".to_string(), "Shift+m".to_string());
        assert!(reg.apply_overrides(&overrides).is_empty());

        assert_eq!(
            reg.action_for_key(KeyCode::Char('M'), KeyModifiers::SHIFT, Context::Unread),
            Some(Action::MarkAllRead)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('M'), KeyModifiers::SHIFT, Context::Archive),
            None
        );
    }

    #[test]
    fn test_apply_overrides_unknown_action() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("nonexistent_action".to_string(), "q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unknown action"));
    }

    #[test]
    fn test_apply_overrides_bad_key() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+Alt+Shift+Q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Cannot parse key"));
    }

    #[test]
    fn test_parse_key_string_forms() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::plain(KeyCode::Char(' '))));
        assert_eq!(parse_key_string("F5"), Some(KeySpec::plain(KeyCode::F(5))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(
            parse_key_string("Shift+a"),
            Some(KeySpec::plain(KeyCode::Char('A')))
        );
        assert_eq!(parse_key_string("?"), Some(KeySpec::plain(KeyCode::Char('?'))));
        assert_eq!(parse_key_string("jk"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char('q'))), "q");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char('A'))), "Shift+a");
        assert_eq!(format_key(&KeySpec::ctrl('c')), "Ctrl+c");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Tab)), "Tab");
    }

    #[test]
    fn test_help_lists_context_and_global() {
        let reg = KeybindingRegistry::new();
        let archive = reg.bindings_for(Context::Archive);
        assert!(archive.iter().any(|(k, _)| k == "j"));
        assert!(archive.iter().any(|(k, _)| k == "q"));
        assert!(!archive.iter().any(|(k, _)| k == "Shift+a"));

        let unread = reg.bindings_for(Context::Unread);
        assert!(unread.iter().any(|(k, _)| k == "Shift+a"));
    }
}
