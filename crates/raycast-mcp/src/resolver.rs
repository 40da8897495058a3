//! Command Resolver
//!
//! Pure mapping from a parsed tool call to a command descriptor. Every
//! table-driven action is a closed enum whose variants map to a payload in a
//! `match`, so a new variant cannot be added without a payload. Free text is
//! encoded here for its destination: URL-encoding for deeplinks, AppleScript
//! string escaping for scripts and shell quoting for shell commands.

use std::borrow::Cow;
use std::fmt;

use raycast_core::{Config, Service};
use tracing::debug;

use crate::command::CommandDescriptor;
use crate::error::DispatchError;
use crate::request::{AppAction, AuthCall, ClipboardCall, ExtensionCall, ShortcutCall, ToolCall};

// =============================================================================
// Static tables
// =============================================================================

/// Predefined shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    Calculator,
    ClipboardHistory,
    EmojiPicker,
    Snippets,
    FileSearch,
    SwitchWindows,
    Confetti,
    ToggleRaycast,
}

impl Shortcut {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calculator => "calculator",
            Self::ClipboardHistory => "clipboard-history",
            Self::EmojiPicker => "emoji-picker",
            Self::Snippets => "snippets",
            Self::FileSearch => "file-search",
            Self::SwitchWindows => "switch-windows",
            Self::Confetti => "confetti",
            Self::ToggleRaycast => "toggle-raycast",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.as_str() == s)
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Calculator,
            Self::ClipboardHistory,
            Self::EmojiPicker,
            Self::Snippets,
            Self::FileSearch,
            Self::SwitchWindows,
            Self::Confetti,
            Self::ToggleRaycast,
        ]
    }
}

/// Where a search is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchScope {
    #[default]
    Raycast,
    Files,
    Clipboard,
    Emoji,
    Snippets,
}

impl SearchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raycast => "raycast",
            Self::Files => "files",
            Self::Clipboard => "clipboard",
            Self::Emoji => "emoji",
            Self::Snippets => "snippets",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.as_str() == s)
    }

    pub fn all() -> &'static [Self] {
        &[Self::Raycast, Self::Files, Self::Clipboard, Self::Emoji, Self::Snippets]
    }

    fn command_path(&self) -> &'static str {
        match self {
            Self::Raycast => "extensions/raycast/raycast/search",
            Self::Files => "extensions/raycast/file-search/search-files",
            Self::Clipboard => "extensions/raycast/clipboard-history/clipboard-history",
            Self::Emoji => "extensions/raycast/emoji-symbols/search-emoji-symbols",
            Self::Snippets => "extensions/raycast/snippets/search-snippets",
        }
    }
}

/// System functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemFunction {
    LockScreen,
    Sleep,
    Restart,
    Shutdown,
    Logout,
    EmptyTrash,
    ToggleDarkMode,
    Mute,
    Unmute,
    EjectAll,
}

impl SystemFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LockScreen => "lock-screen",
            Self::Sleep => "sleep",
            Self::Restart => "restart",
            Self::Shutdown => "shutdown",
            Self::Logout => "logout",
            Self::EmptyTrash => "empty-trash",
            Self::ToggleDarkMode => "toggle-dark-mode",
            Self::Mute => "mute",
            Self::Unmute => "unmute",
            Self::EjectAll => "eject-all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.as_str() == s)
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::LockScreen,
            Self::Sleep,
            Self::Restart,
            Self::Shutdown,
            Self::Logout,
            Self::EmptyTrash,
            Self::ToggleDarkMode,
            Self::Mute,
            Self::Unmute,
            Self::EjectAll,
        ]
    }

    /// Label for the confirmation dialog; `None` for non-destructive functions
    pub fn destructive_label(&self) -> Option<&'static str> {
        match self {
            Self::Restart => Some("restart your Mac"),
            Self::Shutdown => Some("shut down your Mac"),
            Self::Logout => Some("log out of your account"),
            Self::EmptyTrash => Some("permanently empty the Trash"),
            _ => None,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.destructive_label().is_some()
    }
}

/// Window management layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowLayout {
    LeftHalf,
    RightHalf,
    TopHalf,
    BottomHalf,
    Maximize,
    AlmostMaximize,
    Center,
    ReasonableSize,
    NextDisplay,
    PreviousDisplay,
    Restore,
    ToggleFullscreen,
}

impl WindowLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftHalf => "left-half",
            Self::RightHalf => "right-half",
            Self::TopHalf => "top-half",
            Self::BottomHalf => "bottom-half",
            Self::Maximize => "maximize",
            Self::AlmostMaximize => "almost-maximize",
            Self::Center => "center",
            Self::ReasonableSize => "reasonable-size",
            Self::NextDisplay => "next-display",
            Self::PreviousDisplay => "previous-display",
            Self::Restore => "restore",
            Self::ToggleFullscreen => "toggle-fullscreen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.as_str() == s)
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::LeftHalf,
            Self::RightHalf,
            Self::TopHalf,
            Self::BottomHalf,
            Self::Maximize,
            Self::AlmostMaximize,
            Self::Center,
            Self::ReasonableSize,
            Self::NextDisplay,
            Self::PreviousDisplay,
            Self::Restore,
            Self::ToggleFullscreen,
        ]
    }
}

/// Extensions with a known entry command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownExtension {
    Calculator,
    ClipboardHistory,
    Emoji,
    FileSearch,
    Snippets,
    Calendar,
    FloatingNotes,
    Store,
}

impl KnownExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calculator => "calculator",
            Self::ClipboardHistory => "clipboard-history",
            Self::Emoji => "emoji",
            Self::FileSearch => "file-search",
            Self::Snippets => "snippets",
            Self::Calendar => "calendar",
            Self::FloatingNotes => "floating-notes",
            Self::Store => "store",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.as_str() == s)
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Calculator,
            Self::ClipboardHistory,
            Self::Emoji,
            Self::FileSearch,
            Self::Snippets,
            Self::Calendar,
            Self::FloatingNotes,
            Self::Store,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Calculator => "Calculator",
            Self::ClipboardHistory => "Clipboard History",
            Self::Emoji => "Emoji & Symbols",
            Self::FileSearch => "File Search",
            Self::Snippets => "Snippets",
            Self::Calendar => "My Schedule",
            Self::FloatingNotes => "Floating Notes",
            Self::Store => "Store",
        }
    }

    fn command_path(&self) -> &'static str {
        match self {
            Self::Calculator => "extensions/raycast/calculator/calculator",
            Self::ClipboardHistory => "extensions/raycast/clipboard-history/clipboard-history",
            Self::Emoji => "extensions/raycast/emoji-symbols/search-emoji-symbols",
            Self::FileSearch => "extensions/raycast/file-search/search-files",
            Self::Snippets => "extensions/raycast/snippets/search-snippets",
            Self::Calendar => "extensions/raycast/calendar/my-schedule",
            Self::FloatingNotes => "extensions/raycast/floating-notes/toggle-floating-notes-window",
            Self::Store => "extensions/raycast/raycast-store/store",
        }
    }
}

// =============================================================================
// Key combinations
// =============================================================================

/// Keyboard modifiers, declared in canonical rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Command,
    Control,
    Option,
    Shift,
}

impl Modifier {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "cmd" => Some(Self::Command),
            "ctrl" => Some(Self::Control),
            "alt" => Some(Self::Option),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Command => "cmd",
            Self::Control => "ctrl",
            Self::Option => "alt",
            Self::Shift => "shift",
        }
    }

    fn applescript(&self) -> &'static str {
        match self {
            Self::Command => "command down",
            Self::Control => "control down",
            Self::Option => "option down",
            Self::Shift => "shift down",
        }
    }
}

/// Keys without a printable character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Space,
    Return,
    Enter,
    Tab,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
}

impl NamedKey {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "space" => Some(Self::Space),
            "return" => Some(Self::Return),
            "enter" => Some(Self::Enter),
            "tab" => Some(Self::Tab),
            "escape" | "esc" => Some(Self::Escape),
            "delete" | "backspace" => Some(Self::Delete),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Return => "return",
            Self::Enter => "enter",
            Self::Tab => "tab",
            Self::Escape => "escape",
            Self::Delete => "delete",
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// macOS virtual key code
    fn key_code(&self) -> u16 {
        match self {
            Self::Space => 49,
            Self::Return => 36,
            Self::Enter => 76,
            Self::Tab => 48,
            Self::Escape => 53,
            Self::Delete => 51,
            Self::Up => 126,
            Self::Down => 125,
            Self::Left => 123,
            Self::Right => 124,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Named(NamedKey),
}

/// A parsed custom key combination such as `cmd+shift+c`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    modifiers: Vec<Modifier>,
    key: Key,
}

impl KeyCombo {
    /// Split on `+`, lower-case, and require exactly one non-modifier token
    pub fn parse(input: &str) -> Result<Self, DispatchError> {
        if input.trim().is_empty() {
            return Err(DispatchError::invalid("Key combination is empty"));
        }

        let mut modifiers = Vec::new();
        let mut keys = Vec::new();

        for raw in input.split('+') {
            let token = raw.trim().to_lowercase();
            if token.is_empty() {
                return Err(DispatchError::invalid(format!(
                    "Invalid key combination: {}",
                    input
                )));
            }
            match Modifier::from_token(&token) {
                Some(modifier) => modifiers.push(modifier),
                None => keys.push(token),
            }
        }

        let token = match keys.as_slice() {
            [] => {
                return Err(DispatchError::invalid(format!(
                    "Key combination has no key: {}",
                    input
                )))
            }
            [token] => token,
            _ => {
                return Err(DispatchError::invalid(format!(
                    "Key combination has more than one key: {}",
                    input
                )))
            }
        };

        let key = if let Some(named) = NamedKey::from_token(token) {
            Key::Named(named)
        } else {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return Err(DispatchError::invalid(format!("Unknown key: {}", token))),
            }
        };

        modifiers.sort();
        modifiers.dedup();

        Ok(Self { modifiers, key })
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// System Events script pressing this combination
    pub fn script(&self) -> String {
        let press = match self.key {
            Key::Char(c) => format!("keystroke {}", applescript_string(&c.to_string())),
            Key::Named(named) => format!("key code {}", named.key_code()),
        };

        let mut script = format!("tell application \"System Events\" to {}", press);
        if !self.modifiers.is_empty() {
            let using: Vec<&str> = self.modifiers.iter().map(Modifier::applescript).collect();
            script.push_str(&format!(" using {{{}}}", using.join(", ")));
        }
        script
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.token())?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{}", c),
            Key::Named(named) => write!(f, "{}", named.token()),
        }
    }
}

// =============================================================================
// Encoding helpers
// =============================================================================

/// Quote a string for use inside an AppleScript string literal
pub fn applescript_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('\0', "");
    format!("\"{}\"", escaped)
}

/// Quote a string as a single POSIX shell word
pub fn shell_quote(s: &str) -> String {
    shell_escape::unix::escape(Cow::Borrowed(s)).into_owned()
}

/// Reject extension ids that could escape the deeplink path
fn validate_extension_id(id: &str) -> Result<(), DispatchError> {
    if id.contains("..") || id.starts_with('/') || id.ends_with('/') {
        return Err(DispatchError::invalid(format!("Invalid extension id: {}", id)));
    }

    if let Some(c) = id
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '/' | '_' | '-' | '.'))
    {
        return Err(DispatchError::invalid(format!(
            "Invalid character '{}' in extension id: {}",
            c, id
        )));
    }

    Ok(())
}

// =============================================================================
// Resolver
// =============================================================================

/// Builds descriptors for tool calls
#[derive(Debug, Clone)]
pub struct Resolver {
    scheme: String,
    app_name: String,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Resolver {
    pub fn new(scheme: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            app_name: app_name.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.url_scheme, &config.app_name)
    }

    /// Application targeted when a call names none
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn deeplink(&self, path: &str) -> String {
        format!("{}://{}", self.scheme, path)
    }

    /// Resolve a call to its single invocation; `None` for calls answered without one
    pub fn resolve(&self, call: &ToolCall) -> Result<Option<CommandDescriptor>, DispatchError> {
        let descriptor = match call {
            ToolCall::Auth(AuthCall::Oauth(service)) => self.oauth(*service),
            ToolCall::Auth(_) => return Ok(None),
            ToolCall::Extensions(ExtensionCall::Open(id)) => self.extension(id)?,
            ToolCall::Extensions(ExtensionCall::Search(query)) => self.store_search(query),
            ToolCall::Extensions(ExtensionCall::Install(id)) => self.store_page(id)?,
            ToolCall::Extensions(_) | ToolCall::Workflows(_) => return Ok(None),
            ToolCall::Search { query, scope } => self.search(query, *scope),
            ToolCall::Shortcut(ShortcutCall::Named(shortcut)) => self.shortcut(*shortcut),
            ToolCall::Shortcut(ShortcutCall::Keys(combo)) => CommandDescriptor::script(combo.script()),
            ToolCall::System { function, .. } => self.system(*function),
            ToolCall::Clipboard(clipboard) => self.clipboard(clipboard),
            ToolCall::Window { layout } => self.window(*layout),
            ToolCall::App { action, app } => {
                let app = app.as_deref().unwrap_or(&self.app_name);
                match action {
                    AppAction::Activate => CommandDescriptor::app(app),
                    AppAction::Quit => CommandDescriptor::script(format!(
                        "tell application {} to quit",
                        applescript_string(app)
                    )),
                    AppAction::Status => return Ok(None),
                }
            }
        };

        debug!("Resolved {} -> {} {}", call.tool_name(), descriptor.kind, descriptor.payload);
        Ok(Some(descriptor))
    }

    pub fn shortcut(&self, shortcut: Shortcut) -> CommandDescriptor {
        let path = match shortcut {
            Shortcut::Calculator => KnownExtension::Calculator.command_path(),
            Shortcut::ClipboardHistory => KnownExtension::ClipboardHistory.command_path(),
            Shortcut::EmojiPicker => KnownExtension::Emoji.command_path(),
            Shortcut::Snippets => KnownExtension::Snippets.command_path(),
            Shortcut::FileSearch => KnownExtension::FileSearch.command_path(),
            Shortcut::SwitchWindows => "extensions/raycast/navigation/switch-windows",
            Shortcut::Confetti => "extensions/raycast/raycast/confetti",
            Shortcut::ToggleRaycast => return CommandDescriptor::app(&self.app_name),
        };
        CommandDescriptor::url(self.deeplink(path))
    }

    pub fn search(&self, query: &str, scope: SearchScope) -> CommandDescriptor {
        CommandDescriptor::url(format!(
            "{}?fallbackText={}",
            self.deeplink(scope.command_path()),
            urlencoding::encode(query)
        ))
    }

    pub fn system(&self, function: SystemFunction) -> CommandDescriptor {
        let descriptor = match function {
            SystemFunction::LockScreen => CommandDescriptor::script(
                "tell application \"System Events\" to keystroke \"q\" using {command down, control down}",
            ),
            SystemFunction::Sleep => CommandDescriptor::shell("pmset sleepnow"),
            SystemFunction::Restart => {
                CommandDescriptor::script("tell application \"System Events\" to restart")
            }
            SystemFunction::Shutdown => {
                CommandDescriptor::script("tell application \"System Events\" to shut down")
            }
            SystemFunction::Logout => {
                CommandDescriptor::script("tell application \"System Events\" to log out")
            }
            SystemFunction::EmptyTrash => {
                CommandDescriptor::script("tell application \"Finder\" to empty trash")
            }
            SystemFunction::ToggleDarkMode => CommandDescriptor::script(
                "tell application \"System Events\" to tell appearance preferences to set dark mode to not dark mode",
            ),
            SystemFunction::Mute => CommandDescriptor::script("set volume output muted true"),
            SystemFunction::Unmute => CommandDescriptor::script("set volume output muted false"),
            SystemFunction::EjectAll => CommandDescriptor::script(
                "tell application \"Finder\" to eject (every disk whose ejectable is true)",
            ),
        };

        match function.destructive_label() {
            Some(label) => descriptor.destructive(label),
            None => descriptor,
        }
    }

    pub fn window(&self, layout: WindowLayout) -> CommandDescriptor {
        CommandDescriptor::url(self.deeplink(&format!(
            "extensions/raycast/window-management/{}",
            layout.as_str()
        )))
    }

    pub fn clipboard(&self, call: &ClipboardCall) -> CommandDescriptor {
        match call {
            ClipboardCall::Copy(text) => {
                CommandDescriptor::shell(format!("printf '%s' {} | pbcopy", shell_quote(text)))
            }
            ClipboardCall::Read => CommandDescriptor::shell("pbpaste"),
            ClipboardCall::Clear => CommandDescriptor::shell("pbcopy < /dev/null"),
            ClipboardCall::History => self.shortcut(Shortcut::ClipboardHistory),
        }
    }

    /// Known extensions use their entry command, anything else the generic template
    pub fn extension(&self, id: &str) -> Result<CommandDescriptor, DispatchError> {
        if let Some(known) = KnownExtension::from_str(id) {
            return Ok(self.known_extension(known));
        }
        validate_extension_id(id)?;
        Ok(CommandDescriptor::url(self.deeplink(&format!("extensions/{}", id))))
    }

    pub fn known_extension(&self, extension: KnownExtension) -> CommandDescriptor {
        CommandDescriptor::url(self.deeplink(extension.command_path()))
    }

    pub fn store_search(&self, query: &str) -> CommandDescriptor {
        CommandDescriptor::url(format!(
            "{}?fallbackText={}",
            self.deeplink(KnownExtension::Store.command_path()),
            urlencoding::encode(query)
        ))
    }

    /// Store web page for an `author/name` extension id
    pub fn store_page(&self, id: &str) -> Result<CommandDescriptor, DispatchError> {
        validate_extension_id(id)?;
        match id.split_once('/') {
            Some((author, name)) if !author.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(CommandDescriptor::url(format!(
                    "https://www.raycast.com/{}/{}",
                    author, name
                )))
            }
            _ => Err(DispatchError::invalid(format!(
                "Extension id must be author/name to install: {}",
                id
            ))),
        }
    }

    pub fn oauth(&self, service: Service) -> CommandDescriptor {
        CommandDescriptor::url(service.token_url())
    }
}
