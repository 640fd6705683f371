pub mod price_scrape;
