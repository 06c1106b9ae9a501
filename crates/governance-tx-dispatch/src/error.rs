use crate::{error_message::display_message, ErrorValue, InstructionBatch};
use solana_sdk::{signature::Signature, signer::SignerError};
use thiserror::Error;

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that can occur around a batch dispatch
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Wallet not connected!")]
    WalletNotConnected,

    #[error("Signing failed: {0}")]
    Signing(#[from] SignerError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A failure surfaced by the sign-and-confirm primitive.
///
/// `not_processed` holds the batches the primitive never got through, in
/// submission order. Re-dispatching exactly those is the retry affordance.
#[derive(Error, Debug, Clone)]
#[error("Transaction submission failed: {}", display_message(.error))]
pub struct SubmissionError {
    pub error: ErrorValue,
    pub txid: Option<Signature>,
    pub not_processed: Vec<InstructionBatch>,
}

impl SubmissionError {
    pub fn new(error: impl Into<ErrorValue>, not_processed: Vec<InstructionBatch>) -> Self {
        Self {
            error: error.into(),
            txid: None,
            not_processed,
        }
    }

    pub fn with_txid(mut self, txid: Signature) -> Self {
        self.txid = Some(txid);
        self
    }

    /// Human-readable message for the error panel
    pub fn message(&self) -> Option<String> {
        crate::error_message(&self.error)
    }
}
