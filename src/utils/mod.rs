mod detect_software;
mod exec;
mod paths;

pub use detect_software::check_bwa;
pub use detect_software::check_cmake;
pub use detect_software::check_make;
pub use detect_software::check_minimap2;
pub use detect_software::check_samtools;

pub use exec::command_to_string;
pub use exec::run_tool_checked;

pub use paths::to_absolute_path;
