pub mod binance;
pub mod bitget;
pub mod quidax;
pub mod util;

pub use binance::BinanceProvider;
pub use bitget::BitgetProvider;
pub use quidax::QuidaxProvider;
