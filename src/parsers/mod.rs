pub mod thingspeak;

pub use thingspeak::{parse_feed, parse_feed_file};
