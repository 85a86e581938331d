// Copyright 2024-2025 Irreducible Inc.

use std::sync::OnceLock;

use crate::env::usize_env_var;

/// Environment variable fixing the size of the global pool used by parallel trace expansion.
pub const THREADS_ENV_NAME: &str = "CORSET_THREADS";

/// Sizes the global rayon pool from `CORSET_THREADS`, once per process.
///
/// A single thread runs waves on the calling thread. Leaving the variable unset keeps rayon's
/// own sizing (which honours `RAYON_NUM_THREADS`). The pool can only be built once, so the error
/// of a pool built elsewhere is returned on every call.
pub fn adjust_thread_pool() -> &'static Result<(), rayon::ThreadPoolBuildError> {
	static ONCE_GUARD: OnceLock<Result<(), rayon::ThreadPoolBuildError>> = OnceLock::new();

	ONCE_GUARD.get_or_init(|| match usize_env_var(THREADS_ENV_NAME) {
		Some(0) | None => Ok(()),
		Some(1) => rayon::ThreadPoolBuilder::new()
			.num_threads(1)
			.use_current_thread()
			.build_global(),
		Some(threads) => rayon::ThreadPoolBuilder::new()
			.num_threads(threads)
			.thread_name(|index| format!("corset-expand-{index}"))
			.build_global(),
	})
}
