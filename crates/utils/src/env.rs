// Copyright 2024-2025 Irreducible Inc.

/// Read boolean flag from the environment variable.
pub fn boolean_env_flag_set(flag: &str) -> bool {
	match std::env::var(flag) {
		Ok(val) => ["1", "on", "ON", "true", "TRUE", "yes", "YES"].contains(&val.as_str()),
		Err(_) => false,
	}
}

/// Read an unsigned integer from the environment variable.
///
/// Returns `None` if the variable is unset or does not parse.
pub fn usize_env_var(var: &str) -> Option<usize> {
	std::env::var(var).ok()?.trim().parse().ok()
}
