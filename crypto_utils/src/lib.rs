pub mod hash;
pub mod hmac;
pub mod scalar;
