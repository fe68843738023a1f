extern crate env_logger;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

pub mod errors {
    error_chain! {
        foreign_links {
            Io(::std::io::Error);
        }
    }
}

pub mod data_layer;
pub mod logging;

pub use logging::init_logger;
pub use logging::output_error;
