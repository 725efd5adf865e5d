use super::PromiseAdapter;

/// Adapter for resolvers returning futures driven by an asynchronous runtime.
///
/// Promises made through this adapter are awaited, not [waited][PromiseAdapter::wait] on:
/// `wait` always fails with [`PromiseError::Unsupported`][super::PromiseError::Unsupported].
/// Sibling fields are joined with [`futures::future::join_all`],
/// so their futures make progress concurrently within one task.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuturesPromiseAdapter;

impl PromiseAdapter for FuturesPromiseAdapter {}
