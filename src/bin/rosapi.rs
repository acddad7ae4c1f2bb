use std::{
    error::Error,
    io::{self, Write},
    time::Duration,
};

use clap::{Parser, Subcommand};
use rosapi::{
    Command, ReplyRow, Request, Session, SessionConfig, SessionError,
    cli::{prompt, write_json, write_rows},
    command::parse_attribute,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Device address
    #[arg(long, env = "ROUTEROS_HOST", default_value = "192.168.88.1")]
    host: String,
    /// Login name
    #[arg(long, env = "ROUTEROS_USER", default_value = "admin")]
    user: String,
    /// Login password
    #[arg(long, env = "ROUTEROS_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,
    /// API port [default: 8728, or 8729 with --tls]
    #[arg(long, env = "ROUTEROS_PORT")]
    port: Option<u16>,
    /// Connect with TLS (certificates are not verified)
    #[arg(long, env = "ROUTEROS_USE_SSL")]
    tls: bool,
    /// Connect, read and write timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
    /// Print rows as JSON
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Run any API command, e.g. `run /ip/address/print -q interface=ether1`
    Run {
        /// Command path
        command: String,
        /// Attribute as key=value
        #[arg(short, long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,
        /// Query filter predicate, without the leading '?'
        #[arg(short, long = "query")]
        queries: Vec<String>,
    },
    /// List interfaces (name, type, state)
    Interfaces,
    /// Show CPU, memory, uptime and firmware version
    Resources,
    /// List DHCP server leases
    Leases,
    /// Interactive prompt over a single session
    Repl,
}

impl Action {
    /// The one-shot request for this action; `None` for the interactive prompt.
    fn request(self) -> Result<Option<Request>, Box<dyn Error>> {
        let request = match self {
            Action::Run {
                command,
                attributes,
                queries,
            } => {
                let request = attributes
                    .into_iter()
                    .fold(Request::new(command)?, |r, (k, v)| r.with_attribute(k, v));
                queries.into_iter().fold(request, |r, q| r.with_filter(q))
            }
            Action::Interfaces => Request::new("/interface/print")?
                .with_attribute(".proplist", ".id,name,type,disabled,running,mtu"),
            Action::Resources => Request::new("/system/resource/print")?,
            Action::Leases => Request::new("/ip/dhcp-server/lease/print")?
                .with_attribute(".proplist", "address,mac-address,host-name,status,bound-to"),
            Action::Repl => return Ok(None),
        };
        Ok(Some(request))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = SessionConfig::new(cli.host, cli.user, cli.password)
        .with_tls(cli.tls)
        .with_timeout(Duration::from_secs(cli.timeout));
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }

    let mut session = Session::new(config);

    let Some(request) = cli.action.request()? else {
        session.connect()?;
        let res = repl(&mut session, cli.json);
        session.disconnect();
        return res;
    };

    session.connect()?;
    let res = session.call(&request);
    session.disconnect();

    print_rows(&res?, cli.json)?;
    Ok(())
}

fn repl(session: &mut Session, json: bool) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let stdout = io::stdout();

    loop {
        let cmd = match prompt(stdin.lock(), stdout.lock())? {
            None => break,
            Some(Ok(cmd)) => cmd,
            Some(Err(e)) => {
                eprintln!("error: {e}");
                continue;
            }
        };

        let request = match cmd {
            Command::Exit => break,
            Command::Call(request) => request,
        };

        match session.call(&request) {
            Ok(rows) => print_rows(&rows, json)?,
            Err(e @ SessionError::Command { .. }) => eprintln!("{e}"),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn print_rows(rows: &[ReplyRow], json: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    if json {
        write_json(&mut stdout, rows)
    } else {
        write_rows(&mut stdout, rows)?;
        stdout.flush()
    }
}
