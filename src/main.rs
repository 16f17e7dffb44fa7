use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use chatline::config::{
    AuthField, ClientConfig, DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_RECONNECT_DELAY_MAX_MS,
    ReconnectPolicy, TimestampStyle, default_cookie_file, derive_endpoint, parse_auth_field, parse_log_level,
    parse_timestamp_style,
};
use chatline::context::{ChatContext, Dispatch};
use chatline::error::ClientError;
use chatline::net::api::{ApiClient, SignupForm};
use chatline::net::socket::{ConnectOptions, Connection};
use chatline::prompt::Prompt;
use chatline::services::session::{
    self, Bootstrap, Surface, guard_login, login_error_text, signup_error_text, submit_login, submit_signup,
};
use chatline::state::credentials::CookieFileStore;
use chatline::terminal::TerminalView;
use clap::{Args, Parser, Subcommand};
use tokio::io::{BufReader, Stdin};

#[derive(Parser, Debug)]
#[command(name = "chatline", about = "Terminal chat client")]
struct Cli {
    /// HTTP origin of the chat server (login, signup, validate).
    #[arg(long, env = "CHATLINE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Websocket URL; derived from --base-url when absent.
    #[arg(long, env = "CHATLINE_ENDPOINT")]
    endpoint: Option<String>,

    /// Port to substitute into the derived websocket URL.
    #[arg(long, env = "CHATLINE_SOCKET_PORT")]
    socket_port: Option<u16>,

    /// `auth-object` (handshake frame) or `query` (`?session=`).
    #[arg(long, env = "CHATLINE_AUTH_FIELD", default_value = "auth-object", value_parser = parse_auth_field)]
    auth_field: AuthField,

    #[arg(long, env = "CHATLINE_COOKIE_FILE")]
    cookie_file: Option<PathBuf>,

    /// `full` or `time`.
    #[arg(long, env = "CHATLINE_TIMESTAMPS", default_value = "full", value_parser = parse_timestamp_style)]
    timestamps: TimestampStyle,

    #[arg(long, env = "CHATLINE_RECONNECT_DELAY_MAX_MS", default_value_t = DEFAULT_RECONNECT_DELAY_MAX_MS)]
    reconnect_delay_max_ms: u64,

    /// Check the stored token with the server before connecting.
    #[arg(long, env = "CHATLINE_VALIDATE")]
    validate: bool,

    #[arg(long, env = "CHATLINE_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    http_timeout_secs: u64,

    #[arg(long, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the chat (default).
    Chat,
    Login(LoginArgs),
    Signup,
    Logout,
}

#[derive(Args, Debug, Default)]
struct LoginArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long, env = "CHATLINE_PASSWORD")]
    password: Option<String>,
}

type StdinPrompt = Prompt<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(std::env::var("CHATLINE_LOG").ok().as_deref()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let ansi = !cli.no_color && io::stdout().is_terminal();
    tracing::debug!(endpoint = %config.endpoint, auth_field = ?config.auth_field, "config loaded");

    let mut login_args = LoginArgs::default();
    let mut surface = match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => Surface::Chat,
        Command::Login(args) => {
            login_args = args;
            Surface::Login
        }
        Command::Signup => Surface::Signup,
        Command::Logout => {
            session::logout(&mut CookieFileStore::new(&config.cookie_file))?;
            println!("Logged out.");
            return Ok(());
        }
    };

    let mut prompt = Prompt::stdin();
    loop {
        let next = match surface {
            Surface::Login => run_login(&config, &mut prompt, &mut login_args).await?,
            Surface::Signup => run_signup(&config, &mut prompt).await?,
            Surface::Chat => run_chat(&config, &mut prompt, ansi).await?,
        };
        match next {
            Some(next) => surface = next,
            None => return Ok(()),
        }
    }
}

fn build_config(cli: &Cli) -> Result<ClientConfig, ClientError> {
    let cookie_file = match &cli.cookie_file {
        Some(path) => path.clone(),
        None => default_cookie_file()?,
    };
    let mut config = ClientConfig::with_cookie_file(&cli.base_url, cookie_file)?;
    config.endpoint = match &cli.endpoint {
        Some(endpoint) => endpoint.clone(),
        None => derive_endpoint(&config.base_url, cli.socket_port)?,
    };
    config.auth_field = cli.auth_field;
    config.timestamp_style = cli.timestamps;
    config.validate_on_start = cli.validate;
    config.http_timeout = Duration::from_secs(cli.http_timeout_secs);
    config.reconnect = ReconnectPolicy::capped_at(cli.reconnect_delay_max_ms)?;
    Ok(config)
}

// =============================================================================
// SURFACES
// =============================================================================

async fn run_login(
    config: &ClientConfig,
    prompt: &mut StdinPrompt,
    preset: &mut LoginArgs,
) -> Result<Option<Surface>, ClientError> {
    let mut store = CookieFileStore::new(&config.cookie_file);
    if let Some(next) = guard_login(&store)? {
        return Ok(Some(next));
    }
    let api = ApiClient::new(config)?;

    loop {
        let username = match preset.username.take() {
            Some(username) => username,
            None => {
                let Some(line) = prompt.ask("Username (or /signup): ").await? else {
                    return Ok(None);
                };
                line.trim().to_owned()
            }
        };
        if username == "/signup" {
            return Ok(Some(Surface::Signup));
        }
        if username.is_empty() {
            continue;
        }

        let password = match preset.password.take() {
            Some(password) => password,
            None => {
                let Some(line) = prompt.ask_secret("Password: ").await? else {
                    return Ok(None);
                };
                line
            }
        };

        match submit_login(&api, &mut store, &username, &password).await {
            Ok(next) => return Ok(Some(next)),
            Err(e) => println!("{}", login_error_text(&e)),
        }
    }
}

async fn run_signup(config: &ClientConfig, prompt: &mut StdinPrompt) -> Result<Option<Surface>, ClientError> {
    let api = ApiClient::new(config)?;

    loop {
        let Some(email) = prompt.ask("Email (or /login): ").await? else {
            return Ok(None);
        };
        let email = email.trim().to_owned();
        if email == "/login" {
            return Ok(Some(Surface::Login));
        }

        let Some(password) = prompt.ask_secret("Password: ").await? else {
            return Ok(None);
        };
        let mut fields = Vec::with_capacity(3);
        for label in ["Username: ", "Display name: ", "Date of birth (YYYY-MM-DD): "] {
            let Some(value) = prompt.ask(label).await? else {
                return Ok(None);
            };
            fields.push(value);
        }
        let [username, displayname, dob]: [String; 3] = fields
            .try_into()
            .map_err(|_| ClientError::MissingField("signup form"))?;
        let form = SignupForm {
            email,
            password,
            username: username.trim().to_owned(),
            displayname: displayname.trim().to_owned(),
            dob: dob.trim().to_owned(),
        };

        match submit_signup(&api, &form).await {
            Ok(next) => {
                println!("Account created. Log in to continue.");
                return Ok(Some(next));
            }
            Err(e) => println!("{}", signup_error_text(&e)),
        }
    }
}

async fn run_chat(config: &ClientConfig, prompt: &mut StdinPrompt, ansi: bool) -> Result<Option<Surface>, ClientError> {
    let mut store = CookieFileStore::new(&config.cookie_file);
    let outcome = if config.validate_on_start {
        let api = ApiClient::new(config)?;
        session::bootstrap_validated(&mut store, &api).await?
    } else {
        session::bootstrap(&store)?
    };
    let token = match outcome {
        Bootstrap::Redirect(next) => return Ok(Some(next)),
        Bootstrap::Proceed(token) => token,
    };

    let (connection, mut events) = Connection::spawn(ConnectOptions::from_config(config, &token))?;
    let mut ctx = ChatContext::new(connection, store, config.timestamp_style);
    let mut view = TerminalView::new(io::stdout(), ansi);
    println!("Connecting to {}. Type /help for commands.", config.endpoint);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    return Ok(None);
                };
                ctx.handle_event(event);
            }
            line = prompt.next_line() => {
                let Some(mut line) = line? else {
                    return Ok(None);
                };
                match ctx.submit(&mut line)? {
                    Dispatch::Redirect(next) => return Ok(Some(next)),
                    Dispatch::Dropped => println!("Not connected; message not sent."),
                    Dispatch::Ignored | Dispatch::Sent | Dispatch::Local => {}
                }
            }
        }
        view.sync(ctx.list())?;
    }
}
