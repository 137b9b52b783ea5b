/// `(@label)` written in running text.
pub struct ExampleRef;

impl ExampleRef {
    pub const OPEN: &'static [u8; 2] = b"(@";
    pub const CLOSE: u8 = b')';

    pub fn is_label_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
    }
}
