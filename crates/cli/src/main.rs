//! Command-line interface for the `skillbridge` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its core functionality to the library half of the crate.

fn main() -> anyhow::Result<()> {
    skillbridge::run()
}
