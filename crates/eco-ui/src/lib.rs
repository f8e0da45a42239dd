//! Shared UI chrome for the dashboard: theme, menu bar, status bar.

pub mod shell;
pub mod theme;

pub use shell::{AppShell, ShellConfig, ShellResponse};
pub use theme::{apply_theme, Theme};
