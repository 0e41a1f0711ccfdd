//! Receipt encoding.
//!
//! Turns a logical receipt into an ESC/POS command stream in a fixed order:
//! initialize, centered header, left-aligned item lines, separator, total,
//! centered footer, timestamp, cut, optional drawer kick, feed.

use chrono::{DateTime, Local};
use tracing::debug;

use crate::escpos::{CommandStream, CutMode, DrawerPulse, EscPos};

/// One itemized receipt line: name and a pre-formatted amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub amount: String,
}

impl LineItem {
    pub fn new(name: impl Into<String>, amount: impl Into<String>) -> Self {
        Self { name: name.into(), amount: amount.into() }
    }
}

/// A logical receipt, independent of printer encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub header: String,
    pub items: Vec<LineItem>,
    /// Pre-formatted total amount (e.g. "$25.50").
    pub total: String,
    pub footer: String,
}

/// Encoding options for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptOptions {
    /// Paper width in characters (32 for 58mm, 48 for 80mm).
    pub width: usize,
    pub cut: CutMode,
    /// Kick the cash drawer after cutting, with this pulse timing.
    pub drawer: Option<DrawerPulse>,
    /// Lines to feed after the cut.
    pub feed_lines: u8,
}

impl Default for ReceiptOptions {
    fn default() -> Self {
        Self {
            width: 32,
            cut: CutMode::Full,
            drawer: None,
            feed_lines: 3,
        }
    }
}

/// Encode a receipt with the current local time on the timestamp line.
pub fn encode_receipt(receipt: &Receipt, options: &ReceiptOptions) -> CommandStream {
    encode_receipt_at(receipt, options, Local::now())
}

/// Encode a receipt with an explicit timestamp.
///
/// Deterministic: identical inputs produce identical output. The only
/// non-deterministic part of [`encode_receipt`] is the timestamp it passes
/// here.
pub fn encode_receipt_at(
    receipt: &Receipt,
    options: &ReceiptOptions,
    at: DateTime<Local>,
) -> CommandStream {
    let mut b = EscPos::new(options.width);

    b.center();
    b.line(&receipt.header);
    b.newline();

    b.left();
    for item in &receipt.items {
        b.line_lr(&item.name, &item.amount);
    }
    b.sep_single();
    b.line_lr("TOTAL", &receipt.total);
    b.newline();

    b.center();
    b.line(&receipt.footer);
    b.line(&at.format("%Y-%m-%d %H:%M:%S").to_string());
    b.newline();

    b.cut(options.cut);
    if let Some(pulse) = options.drawer {
        b.drawer_kick(pulse);
    }
    b.feed(options.feed_lines);

    let stream = b.finish();
    debug!(
        segments = stream.len(),
        bytes = stream.concat().len(),
        "receipt encoded"
    );
    stream
}
