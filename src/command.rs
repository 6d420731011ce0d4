//! Command compiler: option state to PyInstaller argv
//!
//! Flags are emitted in a fixed order so the printed command is stable and
//! reproducible. The result is always a token list; [`preview`] joins it for
//! display only.

use std::path::Path;

use crate::constants::{pyinstaller, PATH_LIST_SEPARATOR};
use crate::error::ValidationError;
use crate::options::OptionState;

/// Compile the argument list using the default tool name
pub fn compile(state: &OptionState) -> Result<Vec<String>, ValidationError> {
    compile_with_tool(state, pyinstaller::TOOL)
}

/// Compile the argument list, invoking `tool` as argv[0]
pub fn compile_with_tool(state: &OptionState, tool: &str) -> Result<Vec<String>, ValidationError> {
    if state.script_path.is_empty() {
        return Err(ValidationError::MissingScript);
    }

    let mut args = vec![tool.to_string(), pyinstaller::NO_CONFIRM.to_string()];

    if state.one_file {
        args.push(pyinstaller::ONE_FILE.to_string());
    }
    if state.no_console {
        args.push(pyinstaller::WINDOWED.to_string());
    }

    args.push(pyinstaller::NPROC.to_string());
    args.push(state.core_count.to_string());

    if !state.icon_path.is_empty() {
        args.push(pyinstaller::ICON.to_string());
        args.push(state.icon_path.clone());
    }

    let output_dir = effective_output_dir(state);
    let output_dir = Path::new(&output_dir);
    args.push(pyinstaller::DIST_PATH.to_string());
    args.push(output_dir.join(pyinstaller::DIST_DIR).to_string_lossy().into_owned());
    args.push(pyinstaller::WORK_PATH.to_string());
    args.push(output_dir.join(pyinstaller::BUILD_DIR).to_string_lossy().into_owned());
    args.push(pyinstaller::SPEC_PATH.to_string());
    args.push(output_dir.to_string_lossy().into_owned());

    for file in &state.included_files {
        args.push(pyinstaller::ADD_DATA.to_string());
        args.push(format!("{file}{PATH_LIST_SEPARATOR}{}", pyinstaller::BUNDLE_ROOT));
    }

    for folder in &state.included_folders {
        args.push(pyinstaller::ADD_DATA.to_string());
        args.push(format!("{folder}{PATH_LIST_SEPARATOR}{}", folder_name(folder)));
    }

    for module in &state.included_modules {
        args.push(pyinstaller::HIDDEN_IMPORT.to_string());
        args.push(module.clone());
    }

    args.push(state.script_path.clone());
    Ok(args)
}

/// Output directory, or the script's containing directory when unset
pub fn effective_output_dir(state: &OptionState) -> String {
    if !state.output_dir.is_empty() {
        return state.output_dir.clone();
    }
    Path::new(&state.script_path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// Folders land in a same-named subdirectory; a bare root maps to the bundle root.
fn folder_name(folder: &str) -> String {
    Path::new(folder)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| pyinstaller::BUNDLE_ROOT.to_string())
}

/// Join tokens into one human-readable command line
///
/// Quoting follows the host shell conventions. The result is for display
/// only and is never executed.
pub fn preview(args: &[String]) -> String {
    args.iter()
        .map(|arg| quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(not(windows))]
fn quote(arg: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c);
    if !arg.is_empty() && arg.chars().all(safe) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r#"'"'"'"#))
}

// Same rules as the MS C runtime argument parser.
#[cfg(windows)]
fn quote(arg: &str) -> String {
    let needs_quotes = arg.is_empty() || arg.contains([' ', '\t']);
    let mut out = String::with_capacity(arg.len() + 2);
    if needs_quotes {
        out.push('"');
    }

    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.push_str(&"\\".repeat(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.push_str(&"\\".repeat(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }

    if needs_quotes {
        out.push_str(&"\\".repeat(backslashes * 2));
        out.push('"');
    } else {
        out.push_str(&"\\".repeat(backslashes));
    }
    out
}
