//! # remora-printer
//!
//! ESC/POS receipt encoding for the Remora print bridge.
//!
//! ## Scope
//!
//! This crate handles HOW a receipt becomes printer bytes:
//! - ESC/POS command building ([`EscPos`])
//! - segmented command streams ([`CommandStream`]) so individual control
//!   codes stay assertable
//! - the fixed receipt layout ([`encode_receipt`])
//!
//! WHERE the bytes go (connection, dispatch) lives in `remora-client`.
//!
//! ## Example
//!
//! ```
//! use remora_printer::{EscPos, CutMode};
//!
//! let mut b = EscPos::new(32);
//! b.center();
//! b.line("KITCHEN");
//! b.left();
//! b.line_lr("Table", "12");
//! b.cut(CutMode::Full);
//! let stream = b.finish();
//! assert!(!stream.is_empty());
//! ```

mod escpos;
mod receipt;

pub use escpos::{CommandStream, CutMode, DrawerPulse, EscPos};
pub use receipt::{encode_receipt, encode_receipt_at, LineItem, Receipt, ReceiptOptions};
