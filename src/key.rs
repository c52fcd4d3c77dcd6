//! Key bindings used by the terminal table host.
//!
//! A [`Binding`] groups one or more key codes under a single action and carries
//! help text for display. Components expose their bindings through the
//! [`KeyMap`] trait.

use bubbletea_rs::KeyMsg;
use crossterm::event::KeyCode;

/// Help text attached to a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short key label, e.g. `"↑/k"`.
    pub key: String,
    /// What the binding does.
    pub desc: String,
}

/// A set of keys that trigger the same action.
#[derive(Debug, Clone)]
pub struct Binding {
    keys: Vec<KeyCode>,
    help: Help,
    enabled: bool,
}

impl Binding {
    /// Creates an enabled binding for the given keys.
    ///
    /// ```rust
    /// use bubbletea_tableview::key::Binding;
    /// use crossterm::event::KeyCode;
    ///
    /// let up = Binding::new(vec![KeyCode::Up, KeyCode::Char('k')]).with_help("↑/k", "up");
    /// assert_eq!(up.keys().len(), 2);
    /// ```
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self {
            keys,
            help: Help::default(),
            enabled: true,
        }
    }

    /// Attaches help text.
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// Enables or disables the binding. Disabled bindings never match.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the binding is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Key codes in this binding.
    pub fn keys(&self) -> &[KeyCode] {
        &self.keys
    }

    /// Help text for this binding.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Returns true if `msg` is one of this binding's keys.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        self.enabled && self.keys.contains(&msg.key)
    }
}

/// Components that expose their bindings for help rendering.
pub trait KeyMap {
    /// The most important bindings, shown in a single line.
    fn short_help(&self) -> Vec<&Binding>;

    /// All bindings grouped into columns.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}
