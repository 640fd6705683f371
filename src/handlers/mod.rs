pub mod prices;
pub mod scrape;
pub mod trends;
