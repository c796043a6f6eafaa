pub mod exchange_rates;
pub mod open_meteo;
pub mod restcountries;
pub mod util;

pub use exchange_rates::ExchangeRateProvider;
pub use open_meteo::OpenMeteoProvider;
pub use restcountries::RestCountriesProvider;
