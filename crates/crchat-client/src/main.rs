use std::path::Path;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crchat_client::client::{ChatClient, SignInOutcome, SignUpOutcome};
use crchat_client::command::UserCommand;
use crchat_client::config::ClientConfig;
use crchat_client::managers::{ConsoleStateManager, FileStateManager};
use crchat_client::poller::{ChatView, Poller};
use crchat_db::FileBackend;

const LAST_ACTIONS_TO_SUGGEST: usize = 10;

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = ClientConfig::from_env()?;
    init_logging(&config.log_path)?;

    let client = ChatClient::new(config.server_url.clone())?;
    let view = ChatView {
        console: ConsoleStateManager::open(FileBackend::new(&config.actions_cache))?,
        file: FileStateManager::open(
            FileBackend::new(&config.ui_path),
            FileBackend::new(&config.messages_cache),
        )?,
    };
    let poller = Poller::new(client.clone(), view);
    tokio::spawn(poller.clone().run(config.poll_interval, |line| println!("{}", line)));
    info!("Polling {} every {:?}", config.server_url, config.poll_interval);

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!(" - - - Comment-Reaction Chat - - -");
    println!("Enter 's' to SIGN UP and any other key to continue and SIGN IN");
    let Some(choice) = input.next_line().await? else {
        return Ok(());
    };
    if choice.trim() == "s" {
        println!("Please, SIGN UP.");
        if !sign_up(&client, &mut input).await? {
            return Ok(());
        }
    }

    println!("Please, SIGN IN.");
    if !sign_in(&client, &mut input).await? {
        return Ok(());
    }
    println!("Welcome to Comment-Reaction Chat!");

    if !suggest_last_actions(&poller, &mut input).await? {
        return Ok(());
    }

    println!("--- Now you can start typing ---");
    while let Some(line) = input.next_line().await? {
        let command = match UserCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}. Please, enter your command again.", e);
                continue;
            }
        };

        let sent = match command {
            UserCommand::Message(text) => client.send_message(&text).await,
            UserCommand::Comment { message_id, text } => client.send_comment(message_id, &text).await,
            UserCommand::React { message_id, kind } => client.send_reaction(message_id, kind).await,
        };
        if let Err(e) = sent {
            warn!("Command failed: {}", e);
            println!("Could not send: {}", e);
        }

        match poller.refresh().await {
            Ok(lines) => lines.iter().for_each(|line| println!("{}", line)),
            Err(e) => warn!("Chat update failed: {}", e),
        }
    }

    Ok(())
}

/// Returns `Ok(false)` if input ended before a sign-up succeeded.
async fn sign_up(client: &ChatClient, input: &mut Input) -> Result<bool> {
    loop {
        let Some((login, password)) = read_credentials(input).await? else {
            return Ok(false);
        };
        match client.sign_up(&login, &password).await {
            Ok(SignUpOutcome::Registered) => {
                println!("Sign up OK. Welcome to Comment-Reaction Chat, {}!", login);
                return Ok(true);
            }
            Ok(SignUpOutcome::LoginTaken) => {
                println!("Could not sign up: login {} is already used", login);
            }
            Err(e) => {
                warn!("Sign up failed: {}", e);
                println!("Could not sign up: {}", e);
            }
        }
    }
}

async fn sign_in(client: &ChatClient, input: &mut Input) -> Result<bool> {
    loop {
        let Some((login, password)) = read_credentials(input).await? else {
            return Ok(false);
        };
        match client.sign_in(&login, &password).await {
            Ok(SignInOutcome::Welcome(text)) => {
                info!("{}", text);
                println!("Sign in OK.");
                return Ok(true);
            }
            Ok(SignInOutcome::Rejected) => {
                println!("Could not sign in: incorrect login and password");
            }
            Err(e) => {
                warn!("Sign in failed: {}", e);
                println!("Could not sign in: {}", e);
            }
        }
    }
}

async fn read_credentials(input: &mut Input) -> Result<Option<(String, String)>> {
    println!("Enter login:");
    let Some(login) = input.next_line().await? else {
        return Ok(None);
    };
    println!("Enter password:");
    let Some(password) = input.next_line().await? else {
        return Ok(None);
    };
    Ok(Some((login, password)))
}

async fn suggest_last_actions(poller: &Poller, input: &mut Input) -> Result<bool> {
    loop {
        println!(
            "Load last {} actions? Enter 'y' for 'yes' and 'n' for 'no'",
            LAST_ACTIONS_TO_SUGGEST
        );
        let Some(answer) = input.next_line().await? else {
            return Ok(false);
        };
        match answer.trim() {
            "y" => {
                for line in poller.last_actions(LAST_ACTIONS_TO_SUGGEST).await? {
                    println!("{}", line);
                }
                return Ok(true);
            }
            "n" => return Ok(true),
            _ => {}
        }
    }
}

/// The console is the chat itself, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crchat=info,crchat_client=info,crchat_db=info".into()),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
