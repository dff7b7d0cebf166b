use std::{env, error::Error, process::exit};

use cups_ipp::prelude::*;

pub fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<_> = env::args().collect();

    if args.len() < 3 {
        println!("Usage: {} printer filename [key=value ...]", args[0]);
        exit(1);
    }

    let mut job = Job::new(&args[2]).file(&args[2]);

    for arg in &args[3..] {
        if let Some((k, v)) = arg.split_once('=') {
            job = job.attribute(IppAttribute::from_option(k, v));
        }
    }

    let client = CupsClient::builder()
        .username(env::var("USER").unwrap_or_default())
        .build();

    let result = client.print(&args[1], &job)?;

    println!("status: {:04x}", result.status_code());
    if let Some(id) = result.job_id() {
        println!("job-id: {id}");
    }
    if let Some(message) = result.message() {
        println!("message: {message}");
    }

    Ok(())
}
