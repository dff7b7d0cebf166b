use std::error::Error;

use cups_ipp::prelude::*;

pub fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let client = CupsClient::builder().build();

    for printer in client.get_printers()? {
        println!(
            "{}: {} {}",
            printer.name(),
            printer.uri(),
            printer.state_name()
        );
    }

    Ok(())
}
