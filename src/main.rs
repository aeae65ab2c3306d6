use clap::{Arg, ArgAction, ArgMatches, Command};
use log::error;
use std::path::PathBuf;
use std::process;

use urban_client::auth::user_interface::{
    format_notification, handle_list, handle_login, handle_logout, handle_open, handle_raw,
    handle_register, handle_set_active, handle_show, handle_whoami, CliResult,
};
use urban_client::auth::AccountRole;
use urban_client::config::{ClientConfig, StorageBackend};
use urban_client::http::Method;
use urban_client::resources::Resource;
use urban_client::utils::io::parse_flag;
use urban_client::utils::logging::initialize_logging;
use urban_client::UrbanClient;

fn cli() -> Command {
    Command::new("urban")
        .about("Command-line client for the Urban fleet and orders backend")
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a JSON configuration file")
                .value_name("FILE")
                .global(true),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Base URL of the API, e.g. http://localhost:8080/api")
                .value_name("URL")
                .global(true),
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .help("Keep the session in memory only")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("login")
                .about("Log in and store the session")
                .arg(Arg::new("username").long("username").short('u'))
                .arg(Arg::new("password").long("password").short('p')),
        )
        .subcommand(Command::new("logout").about("Clear the stored session"))
        .subcommand(
            Command::new("register")
                .about("Create a new account")
                .arg(Arg::new("username").long("username").short('u'))
                .arg(Arg::new("password").long("password").short('p'))
                .arg(
                    Arg::new("role")
                        .long("role")
                        .help("ADMIN, CONDUCTOR or CLIENTE")
                        .default_value("CLIENTE"),
                )
                .arg(
                    Arg::new("linked-id")
                        .long("linked-id")
                        .help("Driver or customer id to link the account to")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(Command::new("whoami").about("Show the stored session"))
        .subcommand(
            Command::new("open")
                .about("Navigate to a screen, e.g. /pedidos")
                .arg(Arg::new("path").required(true)),
        )
        .subcommand(raw_command("get", "Send a GET request", false))
        .subcommand(raw_command("post", "Send a POST request", true))
        .subcommand(raw_command("put", "Send a PUT request", true))
        .subcommand(raw_command("patch", "Send a PATCH request", true))
        .subcommand(
            Command::new("list")
                .about("List all records of a resource")
                .arg(Arg::new("resource").required(true)),
        )
        .subcommand(
            Command::new("show")
                .about("Show one record")
                .arg(Arg::new("resource").required(true))
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("set-active")
                .about("Activate or deactivate a record")
                .arg(Arg::new("resource").required(true))
                .arg(Arg::new("id").required(true))
                .arg(Arg::new("active").required(true)),
        )
}

fn raw_command(name: &'static str, about: &'static str, with_body: bool) -> Command {
    let command = Command::new(name)
        .about(about)
        .arg(Arg::new("path").required(true).help("API path, e.g. /v1/pedidos/todos"));
    if with_body {
        command.arg(Arg::new("body").help("JSON request body"))
    } else {
        command
    }
}

fn load_config(matches: &ArgMatches) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let path = matches.get_one::<String>("config").map(PathBuf::from);
    let mut config = ClientConfig::load(path.as_deref())?;
    if let Some(url) = matches.get_one::<String>("api-url") {
        config.api_base_url = url.clone();
        config.validate()?;
    }
    if matches.get_flag("ephemeral") {
        config.storage = StorageBackend::Memory;
    }
    Ok(config)
}

fn parse_resource(matches: &ArgMatches) -> Result<Resource, Box<dyn std::error::Error>> {
    let name = matches.get_one::<String>("resource").cloned().unwrap_or_default();
    Ok(name.parse::<Resource>()?)
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.get_one::<String>(name).map(String::as_str).unwrap_or_default()
}

async fn run(client: &UrbanClient, matches: &ArgMatches) -> CliResult {
    match matches.subcommand() {
        Some(("login", sub)) => {
            handle_login(
                client,
                sub.get_one::<String>("username").cloned(),
                sub.get_one::<String>("password").cloned(),
            )
            .await
        }
        Some(("logout", _)) => handle_logout(client),
        Some(("register", sub)) => {
            let role: AccountRole = required(sub, "role").parse()?;
            handle_register(
                client,
                sub.get_one::<String>("username").cloned(),
                sub.get_one::<String>("password").cloned(),
                role,
                sub.get_one::<u64>("linked-id").copied(),
            )
            .await
        }
        Some(("whoami", _)) => handle_whoami(client),
        Some(("open", sub)) => handle_open(client, required(sub, "path")),
        Some((verb @ ("get" | "post" | "put" | "patch"), sub)) => {
            let method = match verb {
                "get" => Method::Get,
                "post" => Method::Post,
                "put" => Method::Put,
                _ => Method::Patch,
            };
            let body = sub
                .try_get_one::<String>("body")
                .ok()
                .flatten()
                .map(String::as_str);
            handle_raw(client, method, required(sub, "path"), body).await
        }
        Some(("list", sub)) => handle_list(client, parse_resource(sub)?).await,
        Some(("show", sub)) => handle_show(client, parse_resource(sub)?, required(sub, "id")).await,
        Some(("set-active", sub)) => {
            let active = parse_flag(required(sub, "active"))
                .ok_or("active must be true or false")?;
            handle_set_active(client, parse_resource(sub)?, required(sub, "id"), active).await
        }
        _ => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = initialize_logging() {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let matches = cli().get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(2);
        }
    };

    let client = match UrbanClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not start the client: {}", e);
            process::exit(2);
        }
    };

    let result = run(&client, &matches).await;

    // Render the banner the way the app shell shows the latest notification
    if let Some(banner) = format_notification(&client.session().latest_message()) {
        println!("{}", banner);
    }

    if let Err(e) = result {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
