//!
//! Command-line utility to print documents and query CUPS printers and jobs
//!

#![allow(clippy::result_large_err)]

use std::{
    io::{self, Read},
    path::PathBuf,
    time::Duration,
};

use clap::Parser;
use log::debug;

use cups_ipp::prelude::*;

fn new_client(params: &CupsParams) -> CupsClient<IppClient> {
    let mut builder = CupsClient::builder()
        .host(&params.host)
        .port(params.port)
        .secure(params.secure)
        .timeout(Duration::from_secs(params.timeout));

    if let Some(ref user) = params.user {
        builder = builder.username(user);
    }
    if let Some(ref password) = params.password {
        builder = builder.password(password);
    }

    builder.build()
}

fn new_job(cmd: &PrintCmd) -> io::Result<Job> {
    let mut job = Job::new(cmd.job_name.as_deref().unwrap_or_default()).copies(cmd.copies);

    job = match cmd.file {
        Some(ref filename) => job.file(filename),
        None => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            job.content(data)
        }
    };

    for arg in &cmd.options {
        if let Some((k, v)) = arg.split_once('=') {
            job = job.attribute(IppAttribute::from_option(k, v));
        }
    }
    Ok(job)
}

fn do_print(client: &CupsClient<IppClient>, cmd: PrintCmd) -> Result<(), IppError> {
    if !cmd.no_check_state {
        client.check_printer_ready(&cmd.printer)?;
    }

    let job = new_job(&cmd)?;
    let result = client.print(&cmd.printer, &job)?;

    if !result.is_successful() {
        return Err(IppError::StatusError(
            StatusCode::from_u16(result.status_code()).unwrap_or(StatusCode::UnknownStatusCode),
        ));
    }

    if let Some(id) = result.job_id() {
        println!("job-id: {id}");
    }
    if let Some(uri) = result.job_uri() {
        println!("job-uri: {uri}");
    }
    Ok(())
}

fn do_status(client: &CupsClient<IppClient>, cmd: StatusCmd) -> Result<(), IppError> {
    let printer = client.get_printer(&cmd.printer)?;
    println!("{printer}");

    let mut attributes = printer
        .attributes()
        .attributes()
        .iter()
        .filter(|a| cmd.attributes.is_empty() || cmd.attributes.iter().any(|n| n == a.name()))
        .collect::<Vec<_>>();

    attributes.sort_by(|a, b| a.name().cmp(b.name()));

    for a in attributes {
        println!("{}: {}", a.name(), a.value());
    }
    Ok(())
}

fn do_printers(client: &CupsClient<IppClient>) -> Result<(), IppError> {
    if let Some(default) = client.get_default_printer()? {
        debug!("Default printer: {}", default.name());
    }
    for printer in client.get_printers()? {
        println!("{printer}");
    }
    Ok(())
}

fn do_jobs(client: &CupsClient<IppClient>, cmd: JobsCmd) -> Result<(), IppError> {
    let which = if cmd.all { "all" } else { "not-completed" };
    let jobs = client.get_jobs(&cmd.printer, cmd.mine, which)?;

    for job in &jobs {
        let id = job.value(IppAttribute::JOB_ID).map(ToString::to_string).unwrap_or_default();
        let state = job
            .value(IppAttribute::JOB_STATE)
            .and_then(|v| v.as_integer())
            .and_then(|s| JobState::from_i32(*s))
            .map(|s| format!("{s:?}"))
            .unwrap_or_default();
        let name = job.value(IppAttribute::JOB_NAME).and_then(|v| v.as_str()).unwrap_or_default();
        println!("{id}\t{state}\t{name}");
    }
    Ok(())
}

fn do_cancel(client: &CupsClient<IppClient>, cmd: CancelCmd) -> Result<(), IppError> {
    if client.cancel_job(&cmd.printer, cmd.job_id)? {
        println!("Job {} canceled", cmd.job_id);
        Ok(())
    } else {
        Err(IppError::InvalidValue(format!("job {} could not be canceled", cmd.job_id)))
    }
}

#[derive(Parser)]
#[clap(about = "CUPS print utility", name = "cupsutil", rename_all = "kebab-case")]
struct CupsParams {
    #[clap(long = "host", global = true, default_value = "localhost", help = "CUPS server host")]
    host: String,

    #[clap(long = "port", short = 'p', global = true, default_value_t = 631, help = "CUPS server port")]
    port: u16,

    #[clap(long = "secure", short = 's', global = true, help = "Use IPPS (HTTPS)")]
    secure: bool,

    #[clap(
        long = "user",
        short = 'u',
        global = true,
        help = "User name to send as requesting-user-name attribute"
    )]
    user: Option<String>,

    #[clap(long = "password", global = true, help = "Password for HTTP basic authentication")]
    password: Option<String>,

    #[clap(
        long = "timeout",
        short = 't',
        global = true,
        default_value_t = 30,
        help = "Request timeout in seconds"
    )]
    timeout: u64,

    #[clap(subcommand)]
    command: CupsCommand,
}

#[derive(Parser)]
enum CupsCommand {
    #[clap(name = "print", about = "Print file to a CUPS printer")]
    Print(PrintCmd),
    #[clap(name = "status", about = "Get status of a CUPS printer")]
    Status(StatusCmd),
    #[clap(name = "printers", about = "List printers")]
    Printers,
    #[clap(name = "jobs", about = "List jobs of a printer")]
    Jobs(JobsCmd),
    #[clap(name = "cancel", about = "Cancel a job")]
    Cancel(CancelCmd),
}

#[derive(Parser, Clone)]
#[clap(rename_all = "kebab-case")]
struct PrintCmd {
    #[clap(help = "Printer name")]
    printer: String,

    #[clap(
        long = "no-check-state",
        short = 'n',
        help = "Do not check printer state before printing"
    )]
    no_check_state: bool,

    #[clap(
        long = "file",
        short = 'f',
        help = "Input file name to print [default: standard input]"
    )]
    file: Option<PathBuf>,

    #[clap(long = "job-name", short = 'j', help = "Job name to send as job-name attribute")]
    job_name: Option<String>,

    #[clap(long = "copies", short = 'c', default_value_t = 1, help = "Number of copies")]
    copies: i32,

    #[clap(long = "option", short = 'o', help = "Extra IPP job attributes in key=value format")]
    options: Vec<String>,
}

#[derive(Parser, Clone)]
#[clap(rename_all = "kebab-case")]
struct StatusCmd {
    #[clap(help = "Printer name")]
    printer: String,

    #[clap(long = "attribute", short = 'a', help = "Attributes to show, default is to show all")]
    attributes: Vec<String>,
}

#[derive(Parser, Clone)]
#[clap(rename_all = "kebab-case")]
struct JobsCmd {
    #[clap(help = "Printer name")]
    printer: String,

    #[clap(long = "all", help = "Include completed jobs")]
    all: bool,

    #[clap(long = "mine", help = "Only jobs of the requesting user")]
    mine: bool,
}

#[derive(Parser, Clone)]
#[clap(rename_all = "kebab-case")]
struct CancelCmd {
    #[clap(help = "Printer name")]
    printer: String,

    #[clap(help = "Job id")]
    job_id: i32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let params = CupsParams::parse();
    let client = new_client(&params);

    match params.command {
        CupsCommand::Print(ref cmd) => do_print(&client, cmd.clone())?,
        CupsCommand::Status(ref cmd) => do_status(&client, cmd.clone())?,
        CupsCommand::Printers => do_printers(&client)?,
        CupsCommand::Jobs(ref cmd) => do_jobs(&client, cmd.clone())?,
        CupsCommand::Cancel(ref cmd) => do_cancel(&client, cmd.clone())?,
    }
    Ok(())
}
