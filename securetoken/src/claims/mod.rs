mod firebase;
mod rfc7519;

pub use firebase::{
    FirebaseClaims,
    FirebaseInfo,
};
pub use rfc7519::{
    Aud,
    Exp,
    Iat,
    Iss,
    Sub,
};
