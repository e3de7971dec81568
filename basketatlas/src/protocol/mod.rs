pub mod enums;
pub mod jsoncodec;
pub mod linecodec;
pub mod resulttoken;
pub mod traits;
