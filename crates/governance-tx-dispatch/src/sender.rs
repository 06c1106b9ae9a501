use crate::{CallbackBundle, DispatchConfig, InstructionBatch, TimeoutStrategy, WalletSigner};
use futures::future::BoxFuture;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::Arc;

/// Everything the sign-and-confirm primitive is called with
#[derive(Clone)]
pub struct SendRequest {
    pub connection: Arc<RpcClient>,
    pub wallet: Arc<dyn WalletSigner>,
    pub transaction_instructions: Vec<InstructionBatch>,
    pub timeout_strategy: TimeoutStrategy,
    pub callbacks: CallbackBundle,
    pub config: DispatchConfig,
    pub confirm_level: CommitmentConfig,
}

/// External routine that signs, sends and confirms instruction batches.
///
/// It owns batching, retry, confirmation polling and partial-failure handling.
/// Failures are reported through `request.callbacks.on_error` with the
/// batches it did not get to.
pub trait SignAndConfirm: Send + Sync + 'static {
    type Output: Send + 'static;

    fn sign_and_confirm(&self, request: SendRequest) -> BoxFuture<'_, Self::Output>;
}
