//! Chat command surface.
//!
//! Two aliases toggle the filter windows: with `c` or `config` the settings
//! window, otherwise the main window.

/// Registered commands and their help text.
pub const COMMANDS: [(&str, &str); 2] = [
    (
        "/betterpartyfinder",
        "Opens the main window. Use with \"c\" or \"config\" to open the settings.",
    ),
    ("/bpf", "Alias for /betterpartyfinder"),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
}

/// Visibility of the two windows a command can toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowState {
    pub main_visible: bool,
    pub settings_visible: bool,
}

/// Which window a command toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Main,
    Settings,
}

/// Handles `command` with its argument string and returns what was toggled.
pub fn handle_command(
    command: &str,
    args: &str,
    windows: &mut WindowState,
) -> Result<Toggled, CommandError> {
    if !COMMANDS.iter().any(|(name, _)| *name == command) {
        return Err(CommandError::Unknown(command.to_string()));
    }
    match args.trim() {
        "c" | "config" => {
            windows.settings_visible = !windows.settings_visible;
            Ok(Toggled::Settings)
        }
        _ => {
            windows.main_visible = !windows.main_visible;
            Ok(Toggled::Main)
        }
    }
}
