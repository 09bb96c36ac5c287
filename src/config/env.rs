//! Environment variable configuration
//!
//! Variables are read once, before a run starts.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "TAPDRIVE";

/// Configuration read from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Harness nesting level from TAPDRIVE_LEVEL
    pub level: Option<usize>,
    /// Randomization seed from TAPDRIVE_RAND_ORDER
    pub seed: Option<i64>,
    /// Leak check switch from TAPDRIVE_DEBUG_MEMORY
    pub debug_memory: Option<String>,
    /// Log level from TAPDRIVE_LOG
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            level: get_env("LEVEL").map(|v| parse_int(&v).max(0) as usize),
            seed: get_env("RAND_ORDER").map(|v| parse_int(&v)),
            debug_memory: get_env("DEBUG_MEMORY"),
            log_level: get_env("LOG"),
        }
    }

    /// Leak checking stays on unless TAPDRIVE_DEBUG_MEMORY is "0" or empty
    pub fn leak_check_enabled(&self) -> bool {
        match self.debug_memory.as_deref() {
            None => true,
            Some(v) => v != "0" && !v.is_empty(),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.level.is_some()
            || self.seed.is_some()
            || self.debug_memory.is_some()
            || self.log_level.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_LEVEL:        {:?}", ENV_PREFIX, self.level);
        println!("  {}_RAND_ORDER:   {:?}", ENV_PREFIX, self.seed);
        println!("  {}_DEBUG_MEMORY: {:?}", ENV_PREFIX, self.debug_memory);
        println!("  {}_LOG:          {:?}", ENV_PREFIX, self.log_level);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Leading signed integer of `value`, 0 when there is none
fn parse_int(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().unwrap_or(0)
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    /// Create a new environment builder
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set harness level
    pub fn level(mut self, level: impl ToString) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_LEVEL"), level.to_string()));
        self
    }

    /// Set randomization seed
    pub fn seed(mut self, seed: impl ToString) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_RAND_ORDER"), seed.to_string()));
        self
    }

    /// Set leak check switch
    pub fn debug_memory(mut self, value: impl Into<String>) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_DEBUG_MEMORY"), value.into()));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all TAPDRIVE environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_LEVEL          Harness nesting level (indents output by 4 per level)");
    println!("  {ENV_PREFIX}_RAND_ORDER     Randomize test order with this seed (<= 0 picks one)");
    println!("  {ENV_PREFIX}_DEBUG_MEMORY   Set to 0 to disable leak checking");
    println!("  {ENV_PREFIX}_LOG            Log level (trace, debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_RAND_ORDER=0");
    println!("  tapdrive selftest");
}
