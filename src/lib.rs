//! Promise-based modal orchestration for terminal applications

pub mod cli;
pub mod config;
pub mod modal;
pub mod tui;

pub use config::Config;
pub use modal::{ModalContext, ModalError, ModalHandle, ModalId, ModalProvider, ModalResult};
