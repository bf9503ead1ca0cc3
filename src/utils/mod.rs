//! Utility functions for the staking analytics service.
//!
//! - [`conversion`] - Fixed-point amount scaling and decimal rounding
//! - [`week`] - Calendar week truncation used as the bucketing key

mod conversion;
mod week;

// ============================================
// Common Constants
// ============================================

/// On-chain AXL amounts are stored at 6-decimal fixed-point scale.
pub const AXL_DECIMALS: u8 = 6;

/// Display symbol for the native token.
pub const AXL_SYMBOL: &str = "AXL";

// ============================================
// Re-exports
// ============================================

pub use conversion::{round_to, scaled_round};
pub use week::week_start;
