use std::path::{Path, PathBuf};

/// Environment variable the managed shell functions set so that gover renders
/// commands for the shell that is actually evaluating them, which may differ
/// from the login shell.
pub const SHELL_OVERRIDE_ENV: &str = "GOVER_SHELL";

/// Order tried on POSIX platforms when the login shell is unknown or missing.
const POSIX_FALLBACK: [ShellType; 3] = [ShellType::Zsh, ShellType::Bash, ShellType::Fish];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    /// The legacy Windows command interpreter (`cmd.exe`).
    Cmd,
}

impl ShellType {
    pub const ALL: [ShellType; 5] = [
        ShellType::Bash,
        ShellType::Zsh,
        ShellType::Fish,
        ShellType::PowerShell,
        ShellType::Cmd,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::Fish => "fish",
            Self::PowerShell => "powershell",
            Self::Cmd => "cmd",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Bash => "Bash",
            Self::Zsh => "Zsh",
            Self::Fish => "Fish",
            Self::PowerShell => "PowerShell",
            Self::Cmd => "Command Prompt",
        }
    }

    /// Map a shell name or executable basename (`zsh`, `pwsh.exe`, `-bash`) to
    /// a dialect.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('-').to_ascii_lowercase();
        let name = name.strip_suffix(".exe").unwrap_or(&name);
        match name {
            "bash" | "sh" => Some(Self::Bash),
            "zsh" => Some(Self::Zsh),
            "fish" => Some(Self::Fish),
            "powershell" | "pwsh" => Some(Self::PowerShell),
            "cmd" => Some(Self::Cmd),
            _ => None,
        }
    }

    /// Executables probed on `PATH`, in preference order.
    #[must_use]
    pub const fn executables(self) -> &'static [&'static str] {
        match self {
            Self::Bash => &["bash"],
            Self::Zsh => &["zsh"],
            Self::Fish => &["fish"],
            Self::PowerShell => &["pwsh", "powershell"],
            Self::Cmd => &["cmd"],
        }
    }

    #[must_use]
    pub fn is_available(self) -> bool {
        if self == Self::Cmd && cfg!(windows) {
            return true;
        }
        self.executables()
            .iter()
            .any(|exe| which::which(exe).is_ok())
    }

    /// Startup files in priority order; the first one is created when none
    /// exist yet.
    pub fn config_candidates(self, home: &Path, env: impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
        match self {
            Self::Bash => {
                if cfg!(target_os = "macos") {
                    vec![
                        home.join(".bash_profile"),
                        home.join(".bashrc"),
                        home.join(".profile"),
                    ]
                } else {
                    vec![
                        home.join(".bashrc"),
                        home.join(".bash_profile"),
                        home.join(".profile"),
                    ]
                }
            }
            Self::Zsh => {
                let mut paths = Vec::new();
                if let Some(zdotdir) = env("ZDOTDIR").filter(|dir| !dir.is_empty()) {
                    paths.push(PathBuf::from(zdotdir).join(".zshrc"));
                }
                paths.push(home.join(".zshrc"));
                paths
            }
            Self::Fish => {
                let mut paths = Vec::new();
                if let Some(xdg) = env("XDG_CONFIG_HOME").filter(|dir| !dir.is_empty()) {
                    paths.push(PathBuf::from(xdg).join("fish").join("config.fish"));
                }
                paths.push(home.join(".config").join("fish").join("config.fish"));
                paths
            }
            Self::PowerShell => {
                if cfg!(windows) {
                    let documents = home.join("Documents");
                    vec![
                        documents
                            .join("PowerShell")
                            .join("Microsoft.PowerShell_profile.ps1"),
                        documents
                            .join("WindowsPowerShell")
                            .join("Microsoft.PowerShell_profile.ps1"),
                    ]
                } else {
                    vec![
                        home.join(".config")
                            .join("powershell")
                            .join("Microsoft.PowerShell_profile.ps1"),
                    ]
                }
            }
            Self::Cmd => Vec::new(),
        }
    }

    /// First existing startup file, or the default location when none exists.
    /// `None` for dialects that have no startup file.
    #[must_use]
    pub fn config_file(self) -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let candidates = self.config_candidates(&home, |key| std::env::var(key).ok());
        select_config_file(candidates)
    }

    /// Detect the dialect of the shell that invoked gover.
    #[must_use]
    pub fn detect() -> Self {
        let override_shell = std::env::var(SHELL_OVERRIDE_ENV).ok();
        let login_shell = std::env::var("SHELL").ok();
        detect_with(
            cfg!(windows),
            override_shell.as_deref(),
            login_shell.as_deref(),
            ShellType::is_available,
        )
    }
}

impl std::fmt::Display for ShellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

fn select_config_file(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    if let Some(existing) = candidates.iter().find(|path| path.exists()) {
        return Some(existing.clone());
    }
    candidates.into_iter().next()
}

pub(crate) fn detect_with(
    windows: bool,
    override_shell: Option<&str>,
    login_shell: Option<&str>,
    available: impl Fn(ShellType) -> bool,
) -> ShellType {
    if let Some(shell) = override_shell.and_then(ShellType::from_name) {
        return shell;
    }

    if windows {
        if available(ShellType::PowerShell) {
            return ShellType::PowerShell;
        }
        return ShellType::Cmd;
    }

    let from_login = login_shell
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| Path::new(value.trim()).file_name())
        .and_then(|name| name.to_str())
        .and_then(ShellType::from_name);

    if let Some(shell) = from_login
        && available(shell)
    {
        return shell;
    }

    POSIX_FALLBACK
        .into_iter()
        .find(|shell| available(*shell))
        .unwrap_or(ShellType::Bash)
}
