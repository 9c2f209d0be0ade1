pub mod iso20022;
pub mod mt;

pub use iso20022::IsoCodec;
pub use mt::MtCodec;
