use crate::{
    CallbackBundle, CallbackChain, DispatchCallbacks, DispatchConfig, DispatchConfigOverrides,
    InstructionAccountCache, InstructionBatch, RetryAction, RetryOutput, SendRequest,
    SignAndConfirm, SubmissionError, TimeoutStrategy, TransactionProgressUi, WalletSigner,
};
use futures::future::BoxFuture;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// A batch-submission request as the UI issues it
#[derive(Clone)]
pub struct DispatchRequest {
    pub connection: Arc<RpcClient>,
    pub wallet: Arc<dyn WalletSigner>,
    pub transaction_instructions: Vec<InstructionBatch>,
    pub timeout_strategy: TimeoutStrategy,
    pub callbacks: DispatchCallbacks,
    pub config: DispatchConfigOverrides,
}

impl DispatchRequest {
    pub fn new(
        connection: Arc<RpcClient>,
        wallet: Arc<dyn WalletSigner>,
        transaction_instructions: Vec<InstructionBatch>,
    ) -> Self {
        Self {
            connection,
            wallet,
            transaction_instructions,
            timeout_strategy: TimeoutStrategy::default(),
            callbacks: DispatchCallbacks::default(),
            config: DispatchConfigOverrides::default(),
        }
    }

    pub fn with_timeout_strategy(mut self, timeout_strategy: TimeoutStrategy) -> Self {
        self.timeout_strategy = timeout_strategy;
        self
    }

    pub fn with_callbacks(mut self, callbacks: DispatchCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_config(mut self, config: DispatchConfigOverrides) -> Self {
        self.config = config;
        self
    }

    /// Same request, restricted to the given batches
    pub fn with_instructions(&self, transaction_instructions: Vec<InstructionBatch>) -> Self {
        Self {
            transaction_instructions,
            ..self.clone()
        }
    }
}

/// Wraps a sign-and-confirm primitive with UI progress, cache invalidation and retry
pub struct TransactionBatchDispatcher<S> {
    sender: Arc<S>,
    ui: Arc<dyn TransactionProgressUi>,
    account_cache: Arc<dyn InstructionAccountCache>,
}

impl<S> Clone for TransactionBatchDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
            ui: Arc::clone(&self.ui),
            account_cache: Arc::clone(&self.account_cache),
        }
    }
}

/// Non-owning handle to a dispatcher's parts.
///
/// Retry actions end up stored inside the UI, so they must not keep the UI
/// (or anything else the dispatcher owns) alive.
struct WeakDispatcher<S> {
    sender: Weak<S>,
    ui: Weak<dyn TransactionProgressUi>,
    account_cache: Weak<dyn InstructionAccountCache>,
}

impl<S> WeakDispatcher<S> {
    fn upgrade(&self) -> Option<TransactionBatchDispatcher<S>> {
        Some(TransactionBatchDispatcher {
            sender: self.sender.upgrade()?,
            ui: self.ui.upgrade()?,
            account_cache: self.account_cache.upgrade()?,
        })
    }
}

/// Consistency level requested for every dispatch
// TODO: derive from the connection's commitment once callers configure it per cluster
pub fn confirm_level() -> CommitmentConfig {
    CommitmentConfig::confirmed()
}

impl<S: SignAndConfirm> TransactionBatchDispatcher<S> {
    pub fn new(
        sender: Arc<S>,
        ui: Arc<dyn TransactionProgressUi>,
        account_cache: Arc<dyn InstructionAccountCache>,
    ) -> Self {
        Self {
            sender,
            ui,
            account_cache,
        }
    }

    /// Submit the request through the primitive and return its result untouched
    pub fn dispatch(&self, request: DispatchRequest) -> BoxFuture<'_, S::Output> {
        let config =
            DispatchConfig::for_batches(&request.transaction_instructions).merged(&request.config);

        if config.log_flow_info {
            info!(
                "Dispatching {} batches ({} instructions, max {} txes per batch)",
                request.transaction_instructions.len(),
                request
                    .transaction_instructions
                    .iter()
                    .map(|b| b.instructions_set.len())
                    .sum::<usize>(),
                config.max_txes_in_batch
            );
        }

        let callbacks = self.compose_callbacks(&request);

        self.sender.sign_and_confirm(SendRequest {
            connection: request.connection,
            wallet: request.wallet,
            transaction_instructions: request.transaction_instructions,
            timeout_strategy: request.timeout_strategy,
            callbacks,
            config,
            confirm_level: confirm_level(),
        })
    }

    /// Caller hook first, then the UI effect, for each hook point
    fn compose_callbacks(&self, request: &DispatchRequest) -> CallbackBundle {
        let hooks = &request.callbacks;

        let mut after_batch_sign = CallbackChain::new();
        if let Some(hook) = hooks.after_batch_sign.clone() {
            after_batch_sign.push(move |count: &usize| hook(*count));
        }
        let ui = Arc::clone(&self.ui);
        after_batch_sign.push(move |count: &usize| ui.show_transactions_process(*count));

        let mut after_all_tx_confirmed = CallbackChain::new();
        if let Some(hook) = hooks.after_all_tx_confirmed.clone() {
            after_all_tx_confirmed.push(move |_: &()| hook());
        }
        let ui = Arc::clone(&self.ui);
        after_all_tx_confirmed.push(move |_: &()| ui.close_transaction_process());

        let mut after_every_tx_confirmation = CallbackChain::new();
        if let Some(hook) = hooks.after_every_tx_confirmation.clone() {
            after_every_tx_confirmation.push(move |_: &()| hook());
        }
        let ui = Arc::clone(&self.ui);
        after_every_tx_confirmation.push(move |_: &()| ui.increment_processed_transactions());
        // The primitive does not say which transaction confirmed, so every
        // instruction of the original request is invalidated each time.
        let cache = Arc::clone(&self.account_cache);
        let submitted = request.transaction_instructions.clone();
        after_every_tx_confirmation.push(move |_: &()| {
            for ix in submitted.iter().flat_map(|b| b.instructions()) {
                cache.invalidate_instruction_accounts(ix);
            }
        });

        let mut on_error = CallbackChain::new();
        if let Some(hook) = hooks.on_error.clone() {
            let original = request.clone();
            on_error.push(move |err: &SubmissionError| hook(err, &original));
        }
        let dispatcher = self.clone();
        let original = request.clone();
        on_error.push(move |err: &SubmissionError| {
            debug!(
                "Offering retry for {} unprocessed batches",
                err.not_processed.len()
            );
            let retry = dispatcher.retry_action(original.with_instructions(err.not_processed.clone()));
            dispatcher
                .ui
                .show_transaction_error(retry, err.message(), err.txid);
        });

        CallbackBundle {
            after_batch_sign,
            after_all_tx_confirmed,
            after_every_tx_confirmation,
            on_error,
        }
    }

    fn downgrade(&self) -> WeakDispatcher<S> {
        WeakDispatcher {
            sender: Arc::downgrade(&self.sender),
            ui: Arc::downgrade(&self.ui),
            account_cache: Arc::downgrade(&self.account_cache),
        }
    }

    fn retry_action(&self, request: DispatchRequest) -> RetryAction {
        let handle = self.downgrade();
        RetryAction::new(move || {
            Box::pin(async move {
                let Some(dispatcher) = handle.upgrade() else {
                    warn!(
                        "Dispatcher dropped; retry of {} batches abandoned",
                        request.transaction_instructions.len()
                    );
                    return None;
                };
                info!(
                    "Retrying {} unprocessed batches",
                    request.transaction_instructions.len()
                );
                let output = dispatcher.dispatch(request).await;
                Some(Box::new(output) as RetryOutput)
            })
        })
    }
}
