//! threadboard - a threaded discussion board in the terminal
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a config in the current directory
//! threadboard init
//!
//! # Register and sign in
//! threadboard signup alice@example.com
//!
//! # Start a thread and reply to it
//! threadboard post create --title "Hello" --description "First post"
//! threadboard comment add 1 "Welcome!"
//! threadboard post show 1
//! ```

mod commands;
mod render;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
