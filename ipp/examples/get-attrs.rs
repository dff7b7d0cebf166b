use std::{env, error::Error, process::exit};

use cups_ipp::prelude::*;

pub fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<_> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: {} uri [attrs]", args[0]);
        exit(1);
    }

    let uri: Uri = args[1].parse()?;
    let ids = RequestIdAllocator::new();

    let mut request = IppRequest::new(Operation::GetPrinterAttributes, &ids);
    request.add_operation_attribute(IppAttribute::printer_uri(&args[1]));
    if args.len() > 2 {
        let names = args[2..].iter().map(|a| IppValue::Text(a.clone())).collect();
        request.add_operation_attribute(IppAttribute::new(
            ValueTag::Keyword,
            IppAttribute::REQUESTED_ATTRIBUTES,
            IppValue::list(names)?,
        )?);
    }

    let client = IppClient::new();
    let response = client.send_request(&uri, &request)?.into_result()?;

    if let Some(group) = response.printer_attributes() {
        for attr in group.attributes() {
            println!("{}: {}", attr.name(), attr.value());
        }
    }

    Ok(())
}
