//! Error types for the widget layer.

use thiserror::Error;

use crate::host::InteropError;

/// Errors surfaced by widget operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A core failure: conversion, configuration or a delegated load.
    #[error(transparent)]
    Core(#[from] horizon_forms_core::Error),

    /// A UI host call failed outside the keyboard-navigation paths.
    #[error(transparent)]
    Interop(#[from] InteropError),
}

/// Result type for widget operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The core error, if this is one.
    pub fn as_core(&self) -> Option<&horizon_forms_core::Error> {
        match self {
            Self::Core(err) => Some(err),
            Self::Interop(_) => None,
        }
    }
}
