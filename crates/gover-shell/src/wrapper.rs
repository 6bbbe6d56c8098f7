//! Batch wrapper used in place of a startup file for `cmd.exe`.

use std::path::Path;

use crate::detect::ShellType;

/// File name of the wrapper written into the managed bin directory.
pub const CMD_WRAPPER_NAME: &str = "gover.cmd";

const CMD_WRAPPER_TEMPLATE: &str = r#"@ECHO OFF
{{START}}
REM Managed bin directory: {{BIN_DIR}}
SET "GOVER_SHELL=cmd"
IF /I NOT "%~1"=="use" (
  gover.exe %*
  EXIT /B
)
FOR /F "usebackq delims=" %%L IN (`gover.exe %*`) DO CALL %%L
IF NOT EXIST "{{BIN_DIR}}\go.exe" ECHO gover: no system default yet, run "gover use <version> --system" 1>&2
EXIT /B
{{END}}"#;

/// Wrapper lines with the bin directory percent-escaped, markers included.
pub(crate) fn render_cmd_wrapper_lines(bin_path: &Path) -> Vec<String> {
    let bin_dir = ShellType::Cmd.escape(&bin_path.to_string_lossy());
    CMD_WRAPPER_TEMPLATE
        .replace("{{START}}", &ShellType::Cmd.start_marker_line())
        .replace("{{END}}", &ShellType::Cmd.end_marker_line())
        .replace("{{BIN_DIR}}", &bin_dir)
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn wrapper_is_framed_by_rem_markers() {
        let lines = render_cmd_wrapper_lines(Path::new("C:\\Users\\dev\\gover\\bin"));

        assert_eq!(lines[0], "@ECHO OFF");
        assert_eq!(lines[1], "REM GOVER - Go version manager");
        assert_eq!(lines.last().map(String::as_str), Some("REM END GOVER"));
    }

    #[test]
    fn wrapper_escapes_percent_in_bin_dir() {
        let lines = render_cmd_wrapper_lines(Path::new("C:\\100%\\bin"));

        assert!(lines.contains(&"REM Managed bin directory: C:\\100%%\\bin".to_string()));
        assert!(
            lines
                .iter()
                .any(|line| line.contains("\"C:\\100%%\\bin\\go.exe\""))
        );
        assert!(lines.iter().all(|line| !line.contains("{{")));
    }

    #[test]
    fn wrapper_only_evaluates_output_of_use() {
        let lines = render_cmd_wrapper_lines(Path::new("C:\\bin"));
        let text = lines.join("\n");

        assert!(text.contains("SET \"GOVER_SHELL=cmd\""));
        assert!(text.contains("IF /I NOT \"%~1\"==\"use\""));
        assert!(text.contains("DO CALL %%L"));
    }
}
