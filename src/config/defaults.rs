//! Default configuration values

/// Project configuration file, looked up at the project root
pub const CONFIG_FILE: &str = "kiln.toml";

/// Environment variable overriding the configured compiler
pub const COMPILER_ENV: &str = "KILN_COMPILER";

/// Compiler driver used when none is configured
pub const DEFAULT_COMPILER: &str = "g++";

/// Language standard passed as `-std=`
pub const DEFAULT_STANDARD: &str = "c++20";

/// Output directory created when neither `out` nor `build` exists
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Name of the linked executable
pub const DEFAULT_EXECUTABLE: &str = "main";
