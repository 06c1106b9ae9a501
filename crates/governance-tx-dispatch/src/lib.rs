/*!
# Governance Transaction Dispatch

Batch submission of wallet transactions with UI progress reporting, account
cache invalidation, and a retry affordance on failure. Signing, sending,
confirmation polling and retry backoff belong to the wrapped
[`SignAndConfirm`] implementation; this crate supplies configuration defaults,
callback composition, and signer attachment around it.

## Quick Start

```rust,no_run
use governance_tx_dispatch::{
    attach_signers, InstructionBatch, RpcClient, SignAndConfirm, StaleAccountSet,
    TracingProgressUi, TransactionBatchDispatcher, DispatchRequest,
};
use solana_sdk::{instruction::Instruction, signature::Keypair};
use std::sync::Arc;

# async fn example<S: SignAndConfirm>(sender: Arc<S>) {
let dispatcher = TransactionBatchDispatcher::new(
    sender,
    Arc::new(TracingProgressUi::new()),
    Arc::new(StaleAccountSet::new()),
);

let instructions: Vec<Instruction> = vec![/* your instructions */];
let batch = InstructionBatch::sequential(attach_signers(&instructions, &[], None));

let connection = Arc::new(RpcClient::new("https://api.devnet.solana.com".to_string()));
let request = DispatchRequest::new(connection, Arc::new(Keypair::new()), vec![batch]);
let _output = dispatcher.dispatch(request).await;
# }
```

## Batch Ceiling

A request containing any [`SequenceType::Sequential`] batch is capped at 20
transactions per physical batch, everything else at 30. Caller overrides
always win:

```rust
use governance_tx_dispatch::{DispatchConfig, DispatchConfigOverrides};

let overrides = DispatchConfigOverrides::from_json_str(r#"{"autoRetry": true}"#).unwrap();
let config = DispatchConfig::for_batches(&[]).merged(&overrides);
assert!(config.auto_retry);
assert_eq!(config.max_txes_in_batch, 30);
```
*/

mod batch;
mod callbacks;
mod config;
mod dispatcher;
mod error;
mod error_message;
mod sender;
mod ui;
mod wallet;

pub use batch::{
    attach_signers, InstructionBatch, InstructionSetWithSigners, SequenceType, TimeoutStrategy,
};
pub use callbacks::{
    BatchSignHook, CallbackBundle, CallbackChain, ConfirmationHook, DispatchCallbacks, ErrorHook,
    RetryAction, RetryOutput,
};
pub use config::{
    max_txes_in_batch, DispatchConfig, DispatchConfigOverrides, DEFAULT_MAX_TXES_IN_BATCH,
    SEQUENTIAL_MAX_TXES_IN_BATCH,
};
pub use dispatcher::{confirm_level, DispatchRequest, TransactionBatchDispatcher};
pub use error::{DispatchError, DispatchResult, SubmissionError};
pub use error_message::{error_message, ErrorValue, OpaqueError};
pub use sender::{SendRequest, SignAndConfirm};
pub use ui::{InstructionAccountCache, StaleAccountSet, TracingProgressUi, TransactionProgressUi};
pub use wallet::{wallet_public_key, WalletSigner};

// Re-export key Solana types for convenience
pub use solana_client::nonblocking::rpc_client::RpcClient;
pub use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
};
