//! Compact-token splitting and base64url section decoding
mod decode;
mod split;

pub use decode::decode_section;
pub(crate) use decode::{
    decode_json,
    string_or_absent,
};
pub use split::SplitToken;
