//! Signed cursor tokens: minting, verification and keyset seek derivation.

pub(crate) mod codec;
mod error;
mod seek;
mod token;

#[cfg(test)]
mod tests;

pub use codec::{current_page_number, decode_cursor, encode_cursor};
pub use error::CursorDecodeError;
pub use seek::{KeysetSeek, SeekOp};
pub use token::{CursorPosition, FIRST_PAGE, MAX_CURSOR_TOKEN_LEN};
