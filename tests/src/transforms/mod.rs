mod blacklist;
mod literals;
mod number;
mod strategy;
