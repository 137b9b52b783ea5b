/// `\ref{label}`, a reference to a custom label (or, failing that, an example).
pub struct LabelRef;

impl LabelRef {
    pub const OPEN: &'static [u8; 5] = b"\\ref{";
    pub const CLOSE: u8 = b'}';
}
