//! Application-wide constants
//!
//! Flag spellings, default values and file names used throughout the
//! application, kept in one place.

/// PyInstaller command-line flags
pub mod pyinstaller {
    /// Executable name looked up on PATH
    pub const TOOL: &str = "pyinstaller";

    /// Replace output directories without asking
    pub const NO_CONFIRM: &str = "--noconfirm";

    /// Bundle everything into a single executable
    pub const ONE_FILE: &str = "--onefile";

    /// Suppress the console window of the built program
    pub const WINDOWED: &str = "--windowed";

    /// Number of worker processes
    pub const NPROC: &str = "--nproc";

    pub const ICON: &str = "--icon";
    pub const DIST_PATH: &str = "--distpath";
    pub const WORK_PATH: &str = "--workpath";
    pub const SPEC_PATH: &str = "--specpath";
    pub const ADD_DATA: &str = "--add-data";
    pub const HIDDEN_IMPORT: &str = "--hidden-import";

    /// Subdirectory of the output directory receiving the bundle
    pub const DIST_DIR: &str = "dist";

    /// Subdirectory of the output directory receiving intermediate files
    pub const BUILD_DIR: &str = "build";

    /// Destination of included files inside the bundle (bundle root)
    pub const BUNDLE_ROOT: &str = ".";
}

/// PATH-list separator, reused by PyInstaller to split `--add-data` values
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Build supervision constants
pub mod build {
    /// Exit code reported when the tool could not be launched at all
    pub const LAUNCH_FAILURE_CODE: i32 = 1;

    /// Exit code reported when the process ended without one (killed by a signal)
    pub const NO_EXIT_CODE: i32 = -1;

    /// Exit code of a headless build stopped with Ctrl-C
    pub const CANCELLED_EXIT_CODE: i32 = 130;

    /// How often the worker polls for exit once output has closed
    pub const REAP_POLL_MS: u64 = 50;

    /// How often the headless runner checks for Ctrl-C
    pub const INTERRUPT_POLL_MS: u64 = 100;

    /// Elapsed time refresh period
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
    pub const MIN_TICK_INTERVAL_MS: u64 = 100;
    pub const MAX_TICK_INTERVAL_MS: u64 = 10_000;

    /// `CREATE_NO_WINDOW` process creation flag
    #[cfg(windows)]
    pub const CREATE_NO_WINDOW: u32 = 0x0800_0000;
}

/// Configuration and profile file locations
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "py-builder";

    /// Application settings file name
    pub const FILENAME: &str = "settings.json";

    /// Conventional extension of saved profiles
    pub const PROFILE_EXTENSION: &str = "mpb";

    /// Environment overrides
    pub const ENV_TOOL: &str = "PY_BUILDER_TOOL";
    pub const ENV_TICK_MS: &str = "PY_BUILDER_TICK_MS";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
}

/// Default icon bootstrap
pub mod icon {
    /// File written next to the working directory when absent
    pub const DEFAULT_FILENAME: &str = "icon.ico";

    /// Edge length of the generated square icon
    pub const SIZE: u32 = 32;
}
