use crate::{DispatchRequest, SubmissionError};
use futures::future::BoxFuture;
use std::{any::Any, fmt, sync::Arc};

type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// An ordered list of side effects run one after another
pub struct CallbackChain<A: ?Sized> {
    steps: Vec<Callback<A>>,
}

impl<A: ?Sized> CallbackChain<A> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push<F>(&mut self, f: F)
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.steps.push(Arc::new(f));
    }

    pub fn then<F>(mut self, f: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.push(f);
        self
    }

    pub fn invoke(&self, arg: &A) {
        for step in &self.steps {
            step(arg);
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<A: ?Sized> Default for CallbackChain<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> Clone for CallbackChain<A> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
        }
    }
}

impl<A: ?Sized> fmt::Debug for CallbackChain<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallbackChain({} steps)", self.steps.len())
    }
}

/// The hooks the sign-and-confirm primitive drives during a dispatch
#[derive(Debug, Clone, Default)]
pub struct CallbackBundle {
    /// Called with the number of transactions just signed
    pub after_batch_sign: CallbackChain<usize>,
    pub after_all_tx_confirmed: CallbackChain<()>,
    pub after_every_tx_confirmation: CallbackChain<()>,
    pub on_error: CallbackChain<SubmissionError>,
}

pub type BatchSignHook = Arc<dyn Fn(usize) + Send + Sync>;
pub type ConfirmationHook = Arc<dyn Fn() + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(&SubmissionError, &DispatchRequest) + Send + Sync>;

/// Caller-supplied hooks; each runs before the matching UI effect
#[derive(Clone, Default)]
pub struct DispatchCallbacks {
    pub after_batch_sign: Option<BatchSignHook>,
    pub after_all_tx_confirmed: Option<ConfirmationHook>,
    pub after_every_tx_confirmation: Option<ConfirmationHook>,
    /// Receives the failure and the request that produced it
    pub on_error: Option<ErrorHook>,
}

impl fmt::Debug for DispatchCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchCallbacks")
            .field("after_batch_sign", &self.after_batch_sign.is_some())
            .field("after_all_tx_confirmed", &self.after_all_tx_confirmed.is_some())
            .field(
                "after_every_tx_confirmation",
                &self.after_every_tx_confirmation.is_some(),
            )
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Output of a retried dispatch, erased so the UI surface stays non-generic
pub type RetryOutput = Box<dyn Any + Send>;

/// Re-dispatch offered by the error panel. Runs at most once.
///
/// Resolves to the sign-and-confirm primitive's output, or `None` when the
/// dispatcher's parts were dropped before the retry ran.
pub struct RetryAction {
    run: Box<dyn FnOnce() -> BoxFuture<'static, Option<RetryOutput>> + Send>,
}

impl RetryAction {
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, Option<RetryOutput>> + Send + 'static,
    {
        Self { run: Box::new(run) }
    }

    pub fn retry(self) -> BoxFuture<'static, Option<RetryOutput>> {
        (self.run)()
    }

    /// Run the retry and recover the primitive's output as `T`
    pub async fn retry_as<T: 'static>(self) -> Option<T> {
        self.retry()
            .await
            .and_then(|output| output.downcast::<T>().ok())
            .map(|output| *output)
    }
}

impl fmt::Debug for RetryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RetryAction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_chain_runs_in_push_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (log.clone(), log.clone());
        let chain = CallbackChain::<usize>::new()
            .then(move |n| a.lock().unwrap().push(format!("first {n}")))
            .then(move |n| b.lock().unwrap().push(format!("second {n}")));

        chain.invoke(&3);

        assert_eq!(chain.len(), 2);
        assert_eq!(*log.lock().unwrap(), vec!["first 3", "second 3"]);
    }

    #[test]
    fn test_empty_chain_is_noop() {
        let chain = CallbackChain::<()>::default();
        assert!(chain.is_empty());
        chain.invoke(&());
    }

    #[test]
    fn test_retry_action_returns_output() {
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        let action = RetryAction::new(move || {
            Box::pin(async move {
                *counter.lock().unwrap() += 1;
                Some(Box::new(7u32) as RetryOutput)
            })
        });

        let output = tokio_test::block_on(action.retry_as::<u32>());
        assert_eq!(output, Some(7));
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_retry_output_type_mismatch() {
        let action = RetryAction::new(|| Box::pin(async { Some(Box::new(7u32) as RetryOutput) }));
        assert_eq!(tokio_test::block_on(action.retry_as::<String>()), None);
    }
}
