//! Confirmation port
//!
//! Shows a loaded file to the operator and asks whether it may be processed.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::contract_source_port::ParsedUnit;
use crate::error::ApplicationError;

/// Port for operator confirmation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfirmationPort: Send + Sync {
    /// Display the rows of `unit` and return the operator's answer
    async fn confirm(&self, unit: &ParsedUnit) -> Result<bool, ApplicationError>;
}
