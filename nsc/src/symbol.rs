/// Smallest supported base.
pub const MIN_BASE: u32 = 2;
/// Largest supported base; every digit value below it has a symbol.
pub const MAX_BASE: u32 = 36;

/// Digit symbols in value order: `0`-`9`, then `A`-`Z`.
pub const SYMBOLS: &[u8; MAX_BASE as usize] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Map a wire byte to its digit value. Lowercase letters are not symbols.
pub fn value_of(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'Z' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Map a digit value (0..36) to its symbol byte.
pub fn symbol_of(digit: u8) -> u8 {
    debug_assert!((digit as u32) < MAX_BASE, "digit {} has no symbol", digit);
    SYMBOLS[digit as usize]
}

pub fn is_valid_base(base: u32) -> bool {
    (MIN_BASE..=MAX_BASE).contains(&base)
}
