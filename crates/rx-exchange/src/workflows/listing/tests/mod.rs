mod board;
mod common;
mod wizard;
