//! Market constants. All currency values are in base units; there is no
//! fractional token or currency unit.

/// Default curve slope: price units added per unit of supply.
pub const DEFAULT_SLOPE: u128 = 2;

/// Default price floor. Zero reproduces the no-floor curve `price(x) = slope * x`.
pub const DEFAULT_BASE_PRICE: u128 = 0;

/// Default cooldown after a purchase, in seconds. Zero never blocks a sale.
pub const DEFAULT_COOLDOWN_SECS: u64 = 0;

/// Length of a holder address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Prefix used when rendering addresses as text.
pub const ADDRESS_PREFIX: &str = "0x";

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "RAMP";

/// Default configuration file name, resolved under the user config directory.
pub const CONFIG_FILE_NAME: &str = "ramp.toml";
