//! Boot and wiring errors.

use persona_types::error::PersonaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error(transparent)]
    Persona(#[from] PersonaError),

    /// A component could not be brought up; the message names which.
    #[error("Boot failed: {0}")]
    BootFailed(String),
}

pub type KernelResult<T> = Result<T, KernelError>;
