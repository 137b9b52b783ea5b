/// `^text^`
pub struct Superscript;

impl Superscript {
    pub const DELIM: u8 = b'^';
}

/// `~text~`. A doubled `~~` is strikethrough and never a subscript.
pub struct Subscript;

impl Subscript {
    pub const DELIM: u8 = b'~';
}
