mod printer;
mod seed;
