//! Per-dialect rendering: path escaping, PATH commands and the managed block.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::detect::ShellType;
use crate::error::ShellError;
use crate::wrapper;

/// Text of the line that opens a managed block, after the comment token.
pub const START_MARKER: &str = "GOVER - Go version manager";
/// Text of the line that closes a managed block, after the comment token.
pub const END_MARKER: &str = "END GOVER";

// Applied in order. Backslash (or backtick) goes first so later replacements
// are not escaped twice.
const POSIX_ESCAPES: &[(&str, &str)] = &[
    ("\\", "\\\\"),
    ("\"", "\\\""),
    ("$", "\\$"),
    ("`", "\\`"),
    ("!", "\"'!'\""),
];
const FISH_ESCAPES: &[(&str, &str)] = &[("\\", "\\\\"), ("\"", "\\\""), ("$", "\\$")];
const POWERSHELL_ESCAPES: &[(&str, &str)] = &[("`", "``"), ("\"", "`\""), ("$", "`$")];
const CMD_ESCAPES: &[(&str, &str)] = &[("%", "%%")];

impl ShellType {
    #[must_use]
    pub const fn comment_token(self) -> &'static str {
        match self {
            Self::Cmd => "REM",
            Self::Bash | Self::Zsh | Self::Fish | Self::PowerShell => "#",
        }
    }

    #[must_use]
    pub const fn line_ending(self) -> &'static str {
        match self {
            Self::PowerShell | Self::Cmd => "\r\n",
            Self::Bash | Self::Zsh | Self::Fish => "\n",
        }
    }

    #[must_use]
    pub fn start_marker_line(self) -> String {
        format!("{} {START_MARKER}", self.comment_token())
    }

    #[must_use]
    pub fn end_marker_line(self) -> String {
        format!("{} {END_MARKER}", self.comment_token())
    }

    const fn escape_table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Bash | Self::Zsh => POSIX_ESCAPES,
            Self::Fish => FISH_ESCAPES,
            Self::PowerShell => POWERSHELL_ESCAPES,
            Self::Cmd => CMD_ESCAPES,
        }
    }

    /// Escape `value` for interpolation inside this dialect's double quotes.
    #[must_use]
    pub fn escape(self, value: &str) -> String {
        self.escape_table()
            .iter()
            .fold(value.to_string(), |acc, (from, to)| acc.replace(from, to))
    }

    /// One statement that prepends `path` to `PATH`.
    #[must_use]
    pub fn path_command(self, path: &Path) -> String {
        let escaped = self.escape(&path.to_string_lossy());
        match self {
            Self::Bash | Self::Zsh => format!("export PATH=\"{escaped}:$PATH\""),
            Self::Fish => format!("set -gx PATH \"{escaped}\" $PATH"),
            Self::PowerShell => format!(
                "$env:PATH = \"{escaped}\" + [System.IO.Path]::PathSeparator + $env:PATH"
            ),
            Self::Cmd => format!("SET \"PATH={escaped};%PATH%\""),
        }
    }

    /// The managed block, one entry per line, markers included.
    #[must_use]
    pub fn setup_commands(self, bin_path: &Path) -> Vec<String> {
        if self == Self::Cmd {
            return wrapper::render_cmd_wrapper_lines(bin_path);
        }

        let mut lines = vec![self.start_marker_line(), self.path_command(bin_path)];
        let function: &[&str] = match self {
            Self::Bash | Self::Zsh => &[
                "gover() {",
                "  if [ \"$1\" = \"use\" ]; then",
                "    local gover_output",
                "    gover_output=\"$(GOVER_SHELL={shell} command gover \"$@\")\" || return $?",
                "    if [ -n \"$gover_output\" ]; then",
                "      eval \"$gover_output\"",
                "    fi",
                "  else",
                "    command gover \"$@\"",
                "  fi",
                "}",
            ],
            Self::Fish => &[
                "function gover",
                "    if test (count $argv) -gt 0; and test \"$argv[1]\" = use",
                "        set -l gover_output (GOVER_SHELL={shell} command gover $argv | string collect); or return $status",
                "        if test -n \"$gover_output\"",
                "            eval $gover_output",
                "        end",
                "    else",
                "        command gover $argv",
                "    end",
                "end",
            ],
            Self::PowerShell => &[
                "function gover {",
                "    $goverExe = Get-Command -Name gover -CommandType Application -ErrorAction Stop | Select-Object -First 1",
                "    if ($args.Count -gt 0 -and $args[0] -eq 'use') {",
                "        $env:GOVER_SHELL = '{shell}'",
                "        $goverOutput = & $goverExe @args",
                "        Remove-Item Env:GOVER_SHELL -ErrorAction SilentlyContinue",
                "        if ($LASTEXITCODE -eq 0 -and $goverOutput) {",
                "            $goverOutput | Out-String | Invoke-Expression",
                "        }",
                "    } else {",
                "        & $goverExe @args",
                "    }",
                "}",
            ],
            Self::Cmd => &[],
        };
        lines.extend(
            function
                .iter()
                .map(|line| line.replace("{shell}", self.name())),
        );
        lines.push(self.end_marker_line());
        lines
    }

    /// Validate `path`, then write the PATH command to `out` for the calling
    /// shell to evaluate and a human-readable note to `err`.
    ///
    /// # Errors
    /// Returns an error for an empty path, a path with a `..` segment, a path
    /// that does not exist or is not a directory, or when writing fails.
    pub fn execute_path_command<W: Write, E: Write>(
        self,
        path: &Path,
        out: &mut W,
        err: &mut E,
    ) -> Result<(), ShellError> {
        let canonical = validate_bin_dir(path)?;
        log::debug!(
            "Emitting {} PATH command for {} (canonical {})",
            self.name(),
            path.display(),
            canonical.display()
        );

        writeln!(out, "{}", self.path_command(path)).map_err(ShellError::Output)?;
        out.flush().map_err(ShellError::Output)?;

        writeln!(
            err,
            "gover: {} now resolves go from {}",
            self.display_name(),
            path.display()
        )
        .map_err(ShellError::Output)?;
        writeln!(
            err,
            "gover: if this shell did not change, evaluate the output or run `gover init --shell {}` once",
            self.name()
        )
        .map_err(ShellError::Output)?;
        Ok(())
    }
}

fn validate_bin_dir(path: &Path) -> Result<PathBuf, ShellError> {
    if path.as_os_str().is_empty() {
        return Err(ShellError::EmptyPath);
    }
    if path
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(ShellError::PathTraversal {
            path: path.to_path_buf(),
        });
    }

    let canonical = match std::fs::canonicalize(path) {
        Ok(canonical) => canonical,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(ShellError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(error) => return Err(ShellError::io("failed to resolve", path, error)),
    };

    if !canonical.is_dir() {
        return Err(ShellError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(canonical)
}
