//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data. Output is a
//! [`CommandStream`]: an ordered sequence of control and text segments that
//! concatenates to the flat byte stream a printer consumes. Keeping the
//! segments separate lets tests assert on individual control codes
//! independent of surrounding text.

// Exact printer-facing byte values. These are an external interface
// contract; do not change them independent of printer capability.
const INIT: &[u8] = &[0x1B, 0x40];
const ALIGN_CENTER: &[u8] = &[0x1B, 0x61, 0x01];
const ALIGN_LEFT: &[u8] = &[0x1B, 0x61, 0x00];
const ALIGN_RIGHT: &[u8] = &[0x1B, 0x61, 0x02];
const CUT_FULL: &[u8] = &[0x1D, 0x56, 0x41, 0x00];
const CUT_PARTIAL: &[u8] = &[0x1D, 0x56, 0x01];

/// An ordered sequence of printer-control segments.
///
/// Semantically one flat byte stream once concatenated, but modeled as a
/// sequence of fragments: control codes and text stay separate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStream {
    segments: Vec<Vec<u8>>,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a control code segment.
    pub fn push_control(&mut self, bytes: &[u8]) {
        self.segments.push(bytes.to_vec());
    }

    /// Append a text segment.
    pub fn push_text(&mut self, text: &str) {
        self.segments.push(text.as_bytes().to_vec());
    }

    /// The individual segments, in emission order.
    pub fn segments(&self) -> &[Vec<u8>] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenate all segments into the flat printer byte stream.
    pub fn concat(&self) -> Vec<u8> {
        self.segments.concat()
    }

    /// Position of the first segment equal to `bytes`, if any.
    pub fn position_of(&self, bytes: &[u8]) -> Option<usize> {
        self.segments.iter().position(|s| s == bytes)
    }

    /// Convert to the daemon's wire form: one string per segment, each byte
    /// mapped 1:1 to a char (latin-1 style) so concatenation daemon-side is
    /// byte-exact.
    pub fn wire_fragments(&self) -> Vec<String> {
        self.segments
            .iter()
            .map(|seg| seg.iter().map(|&b| char::from(b)).collect())
            .collect()
    }
}

/// Paper cut variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutMode {
    /// Full cut (GS V 0x41 0x00)
    #[default]
    Full,
    /// Partial cut, leaves a small connection (GS V 0x01)
    Partial,
}

impl CutMode {
    pub(crate) fn bytes(self) -> &'static [u8] {
        match self {
            CutMode::Full => CUT_FULL,
            CutMode::Partial => CUT_PARTIAL,
        }
    }
}

/// Cash drawer kick pulse timing (ESC p 0x00 on off)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawerPulse {
    pub on: u8,
    pub off: u8,
}

impl Default for DrawerPulse {
    fn default() -> Self {
        Self { on: 25, off: 250 }
    }
}

/// ESC/POS command builder
///
/// Starts with a printer initialize; call [`finish`](EscPos::finish) to take
/// the accumulated stream.
pub struct EscPos {
    stream: CommandStream,
    width: usize,
}

impl EscPos {
    /// Create a new builder with the specified paper width in characters
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize) -> Self {
        let mut stream = CommandStream::new();
        stream.push_control(INIT);
        Self { stream, width }
    }

    /// Get the configured paper width
    pub fn width(&self) -> usize {
        self.width
    }

    // === Text Output ===

    /// Write raw text
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.stream.push_text(s);
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.stream.push_text(&format!("{s}\n"));
        self
    }

    /// Write an empty line
    pub fn newline(&mut self) -> &mut Self {
        self.stream.push_text("\n");
        self
    }

    /// Print and feed n lines (ESC d n)
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.stream.push_control(&[0x1B, 0x64, lines]);
        self
    }

    // === Alignment ===

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.stream.push_control(ALIGN_CENTER);
        self
    }

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.stream.push_control(ALIGN_LEFT);
        self
    }

    /// Align text to right
    pub fn right(&mut self) -> &mut Self {
        self.stream.push_control(ALIGN_RIGHT);
        self
    }

    // === Separators ===

    /// Print a line of '-' characters
    pub fn sep_single(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    /// Print a line of '=' characters
    pub fn sep_double(&mut self) -> &mut Self {
        self.line(&"=".repeat(self.width))
    }

    // === Layout Helpers ===

    /// Print left and right text on the same line
    ///
    /// Left text is left-aligned, right text is right-aligned, with spaces
    /// filling the gap. Widths are plain character counts; currency lines
    /// are fixed-width ASCII, not locale-aware.
    pub fn line_lr(&mut self, left: &str, right: &str) -> &mut Self {
        let lw = left.chars().count();
        let rw = right.chars().count();

        if lw + rw >= self.width {
            // Too long, just print with a space
            self.line(&format!("{left} {right}"))
        } else {
            let spaces = self.width - lw - rw;
            self.line(&format!("{left}{}{right}", " ".repeat(spaces)))
        }
    }

    // === Paper Control ===

    /// Cut paper
    pub fn cut(&mut self, mode: CutMode) -> &mut Self {
        self.stream.push_control(mode.bytes());
        self
    }

    // === Cash Drawer ===

    /// Open cash drawer pin 2 with the given pulse timing (ESC p 0x00 t1 t2)
    pub fn drawer_kick(&mut self, pulse: DrawerPulse) -> &mut Self {
        self.stream.push_control(&[0x1B, 0x70, 0x00, pulse.on, pulse.off]);
        self
    }

    // === Raw Commands ===

    /// Write raw bytes directly
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.stream.push_control(bytes);
        self
    }

    // === Build ===

    /// Take the accumulated command stream
    pub fn finish(self) -> CommandStream {
        self.stream
    }
}

impl Default for EscPos {
    fn default() -> Self {
        Self::new(48)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_starts_with_initialize() {
        let stream = EscPos::new(32).finish();
        assert_eq!(stream.segments()[0], INIT);
    }

    #[test]
    fn alignment_codes() {
        let mut b = EscPos::new(32);
        b.center().left().right();
        let stream = b.finish();
        assert_eq!(stream.segments()[1], ALIGN_CENTER);
        assert_eq!(stream.segments()[2], ALIGN_LEFT);
        assert_eq!(stream.segments()[3], ALIGN_RIGHT);
    }

    #[test]
    fn cut_variants() {
        let mut b = EscPos::new(32);
        b.cut(CutMode::Full).cut(CutMode::Partial);
        let stream = b.finish();
        assert_eq!(stream.segments()[1], &[0x1D, 0x56, 0x41, 0x00]);
        assert_eq!(stream.segments()[2], &[0x1D, 0x56, 0x01]);
    }

    #[test]
    fn feed_embeds_line_count() {
        let mut b = EscPos::new(32);
        b.feed(3);
        assert_eq!(b.finish().segments()[1], &[0x1B, 0x64, 0x03]);
    }

    #[test]
    fn drawer_kick_pulse_timing() {
        let mut b = EscPos::new(32);
        b.drawer_kick(DrawerPulse { on: 50, off: 200 });
        assert_eq!(b.finish().segments()[1], &[0x1B, 0x70, 0x00, 50, 200]);
    }

    #[test]
    fn line_lr_pads_to_width() {
        let mut b = EscPos::new(20);
        b.line_lr("Item 1", "$10.00");
        let stream = b.finish();
        assert_eq!(
            String::from_utf8(stream.segments()[1].clone()).unwrap(),
            "Item 1        $10.00\n"
        );
    }

    #[test]
    fn line_lr_overflow_degrades_to_single_space() {
        let mut b = EscPos::new(8);
        b.line_lr("Item 1", "$10.00");
        let stream = b.finish();
        assert_eq!(
            String::from_utf8(stream.segments()[1].clone()).unwrap(),
            "Item 1 $10.00\n"
        );
    }

    #[test]
    fn wire_fragments_are_byte_exact() {
        let mut b = EscPos::new(32);
        b.center().line("POS").cut(CutMode::Full);
        let stream = b.finish();

        let fragments = stream.wire_fragments();
        assert_eq!(fragments.len(), stream.len());

        // Concatenating daemon-side reproduces the flat stream exactly.
        let rebuilt: Vec<u8> = fragments
            .concat()
            .chars()
            .map(|c| u32::from(c) as u8)
            .collect();
        assert_eq!(rebuilt, stream.concat());
    }

    #[test]
    fn concat_flattens_in_order() {
        let mut b = EscPos::new(4);
        b.text("ab").text("cd");
        let stream = b.finish();
        let mut expected = INIT.to_vec();
        expected.extend_from_slice(b"abcd");
        assert_eq!(stream.concat(), expected);
    }
}
