use crate::detect::ShellType;
use crate::error::ShellError;
use crate::shells::{END_MARKER, START_MARKER};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// Blank runs at least this long collapse to a single blank line.
const COLLAPSED_BLANK_RUN: usize = 3;

/// A shell startup file loaded into memory for block edits.
pub struct ShellConfig {
    pub shell_type: ShellType,
    pub config_path: PathBuf,
    pub content: String,
}

impl ShellConfig {
    pub fn load(shell_type: ShellType, config_path: PathBuf) -> Result<Self, ShellError> {
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(error) => return Err(ShellError::io("failed to read", &config_path, error)),
        };

        Ok(Self {
            shell_type,
            config_path,
            content,
        })
    }

    /// Whether any line carries the start marker.
    #[must_use]
    pub fn has_init(&self) -> bool {
        self.content
            .lines()
            .any(|line| is_marker_line(line, self.shell_type, START_MARKER))
    }

    /// Content with every managed block removed and the result trimmed. Runs
    /// of three or more blank lines collapse to one, but only when a block
    /// was actually cut out.
    pub fn remove_managed_blocks(&self) -> Result<String, ShellError> {
        let mut kept = String::with_capacity(self.content.len());
        let mut removed = false;
        let mut lines = self.content.split_inclusive('\n').enumerate();

        while let Some((index, line)) = lines.next() {
            if !is_marker_line(line, self.shell_type, START_MARKER) {
                kept.push_str(line);
                continue;
            }

            let closed = lines
                .by_ref()
                .any(|(_, inner)| is_marker_line(inner, self.shell_type, END_MARKER));
            if !closed {
                return Err(ShellError::UnterminatedBlock {
                    path: self.config_path.clone(),
                    line: index + 1,
                    end_marker: self.shell_type.end_marker_line(),
                });
            }
            removed = true;
        }

        if removed {
            Ok(collapse_blank_runs(&kept).trim().to_string())
        } else {
            Ok(kept.trim().to_string())
        }
    }

    /// Replace any managed block with `block_lines`, appended after one blank
    /// line.
    pub fn add_init(&self, block_lines: &[String]) -> Result<ShellConfigEdit, ShellError> {
        let had_block = self.has_init();
        let base = if had_block {
            self.remove_managed_blocks()?
        } else {
            self.content.trim().to_string()
        };
        let newline = self.shell_type.line_ending();
        let block = block_lines.join(newline);

        let modified = if base.is_empty() {
            format!("{block}{newline}")
        } else {
            format!("{base}{newline}{newline}{block}{newline}")
        };

        let mut changes = Vec::new();
        if had_block {
            changes.push("Remove existing gover block".to_string());
        }
        changes.push(format!(
            "Add gover block ({} lines) to {}",
            block_lines.len(),
            self.config_path.display()
        ));

        Ok(ShellConfigEdit {
            original: self.content.clone(),
            modified,
            changes,
        })
    }

    /// Remove every managed block. No changes when none is present.
    pub fn remove_init(&self) -> Result<ShellConfigEdit, ShellError> {
        if !self.has_init() {
            return Ok(ShellConfigEdit {
                original: self.content.clone(),
                modified: self.content.clone(),
                changes: Vec::new(),
            });
        }

        let base = self.remove_managed_blocks()?;
        let modified = if base.is_empty() {
            base
        } else {
            format!("{base}{}", self.shell_type.line_ending())
        };

        Ok(ShellConfigEdit {
            original: self.content.clone(),
            modified,
            changes: vec![format!(
                "Remove gover block from {}",
                self.config_path.display()
            )],
        })
    }

    /// Write the edit back. A symlinked profile stays a link; its target gets
    /// the new content.
    pub fn apply_edit(&mut self, edit: &ShellConfigEdit) -> Result<(), ShellError> {
        gover_platform::write_atomic(&self.config_path, edit.modified.as_bytes())
            .map_err(|error| ShellError::io("failed to write", &self.config_path, error))?;
        self.content.clone_from(&edit.modified);
        Ok(())
    }
}

pub struct ShellConfigEdit {
    pub original: String,
    pub modified: String,
    pub changes: Vec<String>,
}

impl ShellConfigEdit {
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    #[must_use]
    pub fn diff_preview(&self) -> String {
        if !self.has_changes() {
            return "No changes needed.".to_string();
        }

        let mut preview = String::new();

        for change in &self.changes {
            let _ = writeln!(preview, "+ {change}");
        }

        preview
    }
}

/// Matches `marker` with or without the dialect's comment token, ignoring
/// surrounding whitespace. `REM` is compared case-insensitively.
fn is_marker_line(line: &str, shell: ShellType, marker: &str) -> bool {
    let line = line.trim();
    if line == marker {
        return true;
    }

    let token = shell.comment_token();
    line.get(..token.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(token))
        .and_then(|_| line.get(token.len()..))
        .is_some_and(|rest| rest.trim_start() == marker)
}

fn collapse_blank_runs(content: &str) -> String {
    let mut collapsed = String::with_capacity(content.len());
    let mut blank_run = Vec::new();

    for line in content.split_inclusive('\n') {
        if line.trim().is_empty() {
            blank_run.push(line);
            continue;
        }
        push_blank_run(&mut collapsed, &mut blank_run);
        collapsed.push_str(line);
    }
    push_blank_run(&mut collapsed, &mut blank_run);

    collapsed
}

fn push_blank_run(out: &mut String, run: &mut Vec<&str>) {
    if run.len() >= COLLAPSED_BLANK_RUN {
        out.push_str(run[0]);
    } else {
        run.iter().for_each(|line| out.push_str(line));
    }
    run.clear();
}
