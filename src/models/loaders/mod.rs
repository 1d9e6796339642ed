pub mod toml_loader;

pub use toml_loader::load_instructor_job;
