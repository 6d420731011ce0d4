pub mod inclusion_lists;
pub mod log_panel;
pub mod options_form;
pub mod version_info;
